use std::sync::Arc;

use flowdeck_client::message::{Envelope, ResourceKind, StreamCmd};
use flowdeck_client::{ClientError, Session, SessionCommand, SessionInput};
use flowdeck_engine::adapter::SyncState;
use flowdeck_engine::error::EngineError;
use flowdeck_engine::filter::{FilterCompiler, FilterError, Predicate};
use flowdeck_engine::model::{Flow, LogLevel};
use serde_json::json;
use tokio::sync::mpsc;

/// A stand-in for the external filter-language compiler: understands only
/// `~u <needle>` (URL contains).
struct UrlCompiler;

impl FilterCompiler<Flow> for UrlCompiler {
    fn compile(&self, expr: &str) -> Result<Predicate<Flow>, FilterError> {
        match expr.strip_prefix("~u ") {
            Some(needle) => {
                let needle = needle.to_string();
                Ok(Arc::new(move |flow: &Flow| {
                    flow.request.pretty_url().contains(&needle)
                }))
            }
            None => Err(FilterError::new(expr, "unknown operator")),
        }
    }
}

fn flow_envelope(cmd: StreamCmd, id: &str, path: &str) -> Envelope {
    Envelope {
        resource: ResourceKind::Flows,
        cmd,
        data: json!({
            "id": id,
            "request": {
                "method": "GET",
                "scheme": "http",
                "host": "example.com",
                "port": 80,
                "path": path,
                "timestamp_start": 1.0,
            },
        }),
    }
}

fn live_session() -> (Session, tokio::sync::watch::Receiver<flowdeck_client::SessionVersions>) {
    let (mut session, versions) = Session::new(Box::new(UrlCompiler));
    session.handle(SessionInput::TransportConnected).unwrap();
    session
        .handle(SessionInput::Message(Envelope {
            resource: ResourceKind::Flows,
            cmd: StreamCmd::Reset,
            data: serde_json::Value::Null,
        }))
        .unwrap();
    (session, versions)
}

#[test]
fn test_filter_command_restricts_the_view() {
    let (mut session, _versions) = live_session();
    session
        .handle(SessionInput::Message(flow_envelope(
            StreamCmd::Add,
            "f1",
            "/first",
        )))
        .unwrap();
    session
        .handle(SessionInput::Message(flow_envelope(
            StreamCmd::Add,
            "f2",
            "/second",
        )))
        .unwrap();

    session
        .handle(SessionInput::Command(SessionCommand::SetFilter(
            "~u /second".into(),
        )))
        .unwrap();
    assert_eq!(session.flows().view().ids(), &["f2"]);
}

#[test]
fn test_invalid_filter_keeps_previous_predicate() {
    let (mut session, _versions) = live_session();
    session
        .handle(SessionInput::Message(flow_envelope(
            StreamCmd::Add,
            "f1",
            "/first",
        )))
        .unwrap();
    session
        .handle(SessionInput::Command(SessionCommand::SetFilter(
            "~u /first".into(),
        )))
        .unwrap();

    let err = session
        .handle(SessionInput::Command(SessionCommand::SetFilter(
            "bogus".into(),
        )))
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Engine(EngineError::InvalidFilter(_))
    ));
    // The earlier filter is still active.
    assert_eq!(session.flows().view().ids(), &["f1"]);
}

#[test]
fn test_selection_commands_flow_through() {
    let (mut session, _versions) = live_session();
    for id in ["1", "2", "3"] {
        session
            .handle(SessionInput::Message(flow_envelope(StreamCmd::Add, id, "/")))
            .unwrap();
    }

    session
        .handle(SessionInput::Command(SessionCommand::Select(Some(
            "2".into(),
        ))))
        .unwrap();
    session
        .handle(SessionInput::Command(SessionCommand::SelectRelative(1)))
        .unwrap();
    assert_eq!(session.flows().selection().selected(), vec!["3"]);
}

#[test]
fn test_transport_drop_goes_stale_until_reset() {
    let (mut session, _versions) = live_session();
    session
        .handle(SessionInput::Message(flow_envelope(
            StreamCmd::Add,
            "f1",
            "/",
        )))
        .unwrap();

    session.handle(SessionInput::TransportDropped).unwrap();
    assert_eq!(session.flows().state(), SyncState::Syncing);
    assert!(session.flows().view().is_empty());

    // A replayed add is discarded while stale; the snapshot wins.
    session
        .handle(SessionInput::Message(flow_envelope(
            StreamCmd::Add,
            "f1",
            "/",
        )))
        .unwrap();
    assert!(session.flows().store().is_empty());

    session
        .handle(SessionInput::Message(Envelope {
            resource: ResourceKind::Flows,
            cmd: StreamCmd::Reset,
            data: json!([]),
        }))
        .unwrap();
    assert_eq!(session.flows().state(), SyncState::Live);
}

#[test]
fn test_event_levels_filter_the_log() {
    let (mut session, _versions) = live_session();
    session
        .handle(SessionInput::Message(Envelope {
            resource: ResourceKind::Events,
            cmd: StreamCmd::Reset,
            data: json!([
                {"id": "e1", "level": "info", "message": "started"},
                {"id": "e2", "level": "debug", "message": "noise"},
            ]),
        }))
        .unwrap();

    session
        .handle(SessionInput::Command(SessionCommand::SetEventLevels(vec![
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ])))
        .unwrap();
    assert_eq!(session.events().view().ids(), &["e1"]);
}

#[test]
fn test_snapshots_are_latched() {
    let (mut session, _versions) = live_session();
    session
        .handle(SessionInput::Message(Envelope {
            resource: ResourceKind::Settings,
            cmd: StreamCmd::Update,
            data: json!({"intercept": "~u /login"}),
        }))
        .unwrap();
    assert_eq!(session.settings()["intercept"], "~u /login");
}

#[test]
fn test_versions_are_broadcast() {
    let (mut session, versions) = live_session();
    let before = *versions.borrow();
    session
        .handle(SessionInput::Message(flow_envelope(
            StreamCmd::Add,
            "f1",
            "/",
        )))
        .unwrap();
    let after = *versions.borrow();
    assert!(after.flows > before.flows);
    assert_eq!(after.events, before.events);
}

#[tokio::test]
async fn test_run_drains_the_queue_in_order() {
    let (session, versions) = live_session();
    let (tx, rx) = mpsc::channel(16);

    for input in [
        SessionInput::Message(flow_envelope(StreamCmd::Add, "f1", "/first")),
        SessionInput::Message(flow_envelope(StreamCmd::Add, "f2", "/second")),
        SessionInput::Command(SessionCommand::SetFilter("~u /second".into())),
        // Invalid input must not stop the loop.
        SessionInput::Command(SessionCommand::SetFilter("broken".into())),
        SessionInput::Command(SessionCommand::SelectRelative(1)),
    ] {
        tx.send(input).await.unwrap();
    }
    drop(tx);

    let session = session.run(rx).await;
    assert_eq!(session.flows().view().ids(), &["f2"]);
    assert_eq!(session.flows().selection().selected(), vec!["f2"]);
    assert!(versions.borrow().flows.value() > 0);
}
