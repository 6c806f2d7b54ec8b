//! Single-writer dispatch loop for a capture session.

use flowdeck_engine::adapter::{StateVersion, StreamAdapter};
use flowdeck_engine::error::EngineError;
use flowdeck_engine::filter::FilterCompiler;
use flowdeck_engine::model::{Flow, LogEvent, LogLevel, flow_columns, level_filter};
use flowdeck_engine::sort::{SortRegistry, SortSpec};
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use crate::error::ClientError;
use crate::message::{Envelope, ResourceKind};

/// A user-issued action on the session.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Compile and activate a flow filter expression.
    SetFilter(String),
    /// Restore the accept-all flow filter.
    ClearFilter,
    /// Change the flow sort column and direction.
    SetSort {
        column: Option<String>,
        descending: bool,
    },
    /// Replace the flow selection with a single id, or clear it.
    Select(Option<String>),
    /// Move the flow selection relative to the anchor.
    SelectRelative(isize),
    /// Toggle a flow in or out of the multi-selection.
    ToggleSelect(String),
    /// Clear the flow selection.
    ClearSelection,
    /// Restrict the event log to the given levels.
    SetEventLevels(Vec<LogLevel>),
}

/// One input to the dispatch queue.
///
/// Stream messages, user commands, and transport transitions all enter
/// through the same queue, so no two mutations ever interleave.
#[derive(Debug, Clone)]
pub enum SessionInput {
    /// An inbound stream envelope.
    Message(Envelope),
    /// A user action.
    Command(SessionCommand),
    /// The transport came up; collections stay stale until their resets.
    TransportConnected,
    /// The transport went away.
    TransportDropped,
}

/// Version tokens for the session's collections, broadcast after every
/// applied input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionVersions {
    pub flows: StateVersion,
    pub events: StateVersion,
}

/// A capture session: the flows and event-log collections plus latched
/// backend snapshots, mutated only through [`Session::handle`].
///
/// Owning the adapters makes the session the single writer; embedders run
/// [`Session::run`] on one task and fan everything through its queue.
pub struct Session {
    flows: StreamAdapter<Flow>,
    events: StreamAdapter<LogEvent>,
    compiler: Box<dyn FilterCompiler<Flow> + Send>,
    settings: Value,
    backend_state: Value,
    versions: watch::Sender<SessionVersions>,
}

impl Session {
    /// Create a session around an external filter compiler. Returns the
    /// session and a receiver of version tokens for subscribers.
    pub fn new(
        compiler: Box<dyn FilterCompiler<Flow> + Send>,
    ) -> (Self, watch::Receiver<SessionVersions>) {
        let (versions, receiver) = watch::channel(SessionVersions::default());
        let session = Self {
            flows: StreamAdapter::new(flow_columns()),
            events: StreamAdapter::new(SortRegistry::new()),
            compiler,
            settings: Value::Null,
            backend_state: Value::Null,
            versions,
        };
        (session, receiver)
    }

    /// The synchronized flow collection.
    pub fn flows(&self) -> &StreamAdapter<Flow> {
        &self.flows
    }

    /// The synchronized event log.
    pub fn events(&self) -> &StreamAdapter<LogEvent> {
        &self.events
    }

    /// Latest backend settings snapshot.
    pub fn settings(&self) -> &Value {
        &self.settings
    }

    /// Latest backend state snapshot.
    pub fn backend_state(&self) -> &Value {
        &self.backend_state
    }

    /// Drain the input queue until it closes.
    ///
    /// Rejected inputs (bad filter expressions, desyncs) are logged and do
    /// not stop the loop; the session is returned when the queue closes.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<SessionInput>) -> Self {
        while let Some(input) = inputs.recv().await {
            if let Err(err) = self.handle(input) {
                log::warn!("session input rejected: {err}");
            }
        }
        self
    }

    /// Apply one input synchronously.
    ///
    /// Mutations happen store → view → selection inside the engine; the
    /// new version tokens are broadcast before this returns, including on
    /// the error paths that changed state (a desync clears a collection).
    pub fn handle(&mut self, input: SessionInput) -> Result<(), ClientError> {
        let result = match input {
            SessionInput::Message(envelope) => self.handle_message(envelope),
            SessionInput::Command(command) => self.handle_command(command),
            SessionInput::TransportConnected => {
                self.flows.transport_connected();
                self.events.transport_connected();
                Ok(())
            }
            SessionInput::TransportDropped => {
                self.flows.transport_dropped();
                self.events.transport_dropped();
                Ok(())
            }
        };
        self.publish();
        result
    }

    fn handle_message(&mut self, envelope: Envelope) -> Result<(), ClientError> {
        match envelope.resource {
            ResourceKind::Flows => {
                self.flows.apply(envelope.into_message()?)?;
            }
            ResourceKind::Events => {
                self.events.apply(envelope.into_message()?)?;
            }
            // Settings and backend state are plain latched snapshots; their
            // internals belong to other parts of the UI.
            ResourceKind::Settings => self.settings = envelope.data,
            ResourceKind::State => self.backend_state = envelope.data,
        }
        Ok(())
    }

    fn handle_command(&mut self, command: SessionCommand) -> Result<(), ClientError> {
        match command {
            SessionCommand::SetFilter(expr) => {
                let predicate = self.compiler.compile(&expr).map_err(EngineError::from)?;
                self.flows.set_filter(Some(predicate));
            }
            SessionCommand::ClearFilter => {
                self.flows.set_filter(None);
            }
            SessionCommand::SetSort { column, descending } => {
                self.flows.set_sort(SortSpec { column, descending });
            }
            SessionCommand::Select(id) => {
                self.flows.select(id.as_deref());
            }
            SessionCommand::SelectRelative(delta) => {
                self.flows.select_relative(delta);
            }
            SessionCommand::ToggleSelect(id) => {
                self.flows.toggle_select(&id);
            }
            SessionCommand::ClearSelection => {
                self.flows.clear_selection();
            }
            SessionCommand::SetEventLevels(levels) => {
                self.events.set_filter(Some(level_filter(&levels)));
            }
        }
        Ok(())
    }

    fn publish(&self) {
        self.versions.send_replace(SessionVersions {
            flows: self.flows.version(),
            events: self.events.version(),
        });
    }
}
