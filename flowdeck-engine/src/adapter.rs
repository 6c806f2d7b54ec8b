//! Stream adapter: the single writer over store, view, and selection.

use crate::entity::Entity;
use crate::error::EngineError;
use crate::filter::Predicate;
use crate::selection::Selection;
use crate::sort::{SortRegistry, SortSpec};
use crate::store::{Store, StoreError};
use crate::view::View;

/// Connection-level lifecycle of the synchronized collection.
///
/// `Disconnected → Syncing → Live`, returning to `Syncing` on any
/// transport drop. While not `Live` the collection is stale: inbound
/// mutations other than `reset` are discarded, and the next `reset`
/// snapshot re-establishes `Live`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No transport has been attached yet.
    #[default]
    Disconnected,
    /// Transport is up but the collection has not been resynced.
    Syncing,
    /// The collection mirrors the stream.
    Live,
}

/// One inbound collection mutation.
#[derive(Debug, Clone)]
pub enum StreamMessage<T> {
    /// A new entity appeared.
    Add(T),
    /// An existing entity changed.
    Update(T),
    /// An entity was removed, by id.
    Remove(String),
    /// Full snapshot replacing the collection.
    Reset(Vec<T>),
}

/// Monotonic token identifying a state generation.
///
/// Bumped on every successful mutation; subscribers compare tokens to
/// decide whether derived data (virtual window, rendered rows) needs
/// recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct StateVersion(u64);

impl StateVersion {
    /// The raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Drives a `(Store, View, Selection)` triple from a message stream.
///
/// This is the reducer of the engine: stream messages and user actions are
/// its only inputs, applied store → view → selection within one call, so
/// readers between calls always observe a fully consistent snapshot.
/// Ownership makes it single-writer; no locks are involved.
pub struct StreamAdapter<T: Entity> {
    store: Store<T>,
    view: View<T>,
    selection: Selection,
    registry: SortRegistry<T>,
    state: SyncState,
    version: StateVersion,
}

impl<T: Entity> StreamAdapter<T> {
    /// Create a disconnected adapter with the given sort registry.
    pub fn new(registry: SortRegistry<T>) -> Self {
        Self {
            store: Store::new(),
            view: View::new(),
            selection: Selection::new(),
            registry,
            state: SyncState::Disconnected,
            version: StateVersion::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Check whether the collection mirrors the stream.
    pub fn is_live(&self) -> bool {
        self.state == SyncState::Live
    }

    /// Token of the latest applied mutation.
    pub fn version(&self) -> StateVersion {
        self.version
    }

    /// The synchronized store.
    pub fn store(&self) -> &Store<T> {
        &self.store
    }

    /// The filtered, sorted projection.
    pub fn view(&self) -> &View<T> {
        &self.view
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    // -------------------------------------------------------------------------
    // Transport lifecycle
    // -------------------------------------------------------------------------

    /// The transport came up; the collection stays stale until `reset`.
    pub fn transport_connected(&mut self) -> StateVersion {
        self.state = SyncState::Syncing;
        self.bump()
    }

    /// The transport dropped. All three structures are cleared and the
    /// collection is stale until the next `reset`.
    pub fn transport_dropped(&mut self) -> StateVersion {
        log::debug!("transport dropped, collection stale until resync");
        self.clear_all();
        self.state = SyncState::Syncing;
        self.bump()
    }

    // -------------------------------------------------------------------------
    // Stream messages
    // -------------------------------------------------------------------------

    /// Apply one inbound mutation.
    ///
    /// `reset` is honored in every state and transitions to `Live`; other
    /// messages are discarded unless `Live`. A duplicate `add` is applied
    /// as an update for resilience against replays around a resync. A
    /// reference to an unknown id forces `Syncing` and surfaces
    /// [`EngineError::Desync`] so the embedder requests a fresh snapshot.
    pub fn apply(&mut self, message: StreamMessage<T>) -> Result<StateVersion, EngineError> {
        match message {
            StreamMessage::Reset(entities) => {
                self.store.reset(entities);
                self.view.recompute(&self.store);
                self.selection.clear();
                self.state = SyncState::Live;
                Ok(self.bump())
            }
            _ if self.state != SyncState::Live => {
                log::debug!("discarding stream message while not live");
                Ok(self.version)
            }
            StreamMessage::Add(entity) => {
                let id = entity.id();
                if self.store.contains(&id) {
                    log::warn!("duplicate add for {id:?}, applying as update");
                    return self.apply_update(entity);
                }
                match self.store.add(entity) {
                    Ok(()) => {
                        self.view.on_add(&self.store, &id);
                        Ok(self.bump())
                    }
                    Err(err) => Err(self.desync(err)),
                }
            }
            StreamMessage::Update(patch) => self.apply_update(patch),
            StreamMessage::Remove(id) => {
                if let Err(err) = self.store.remove(&id) {
                    return Err(self.desync(err));
                }
                let former_pos = self.view.on_remove(&id);
                self.selection.on_removed(&self.view, &id, former_pos);
                Ok(self.bump())
            }
        }
    }

    fn apply_update(&mut self, patch: T) -> Result<StateVersion, EngineError> {
        let id = patch.id();
        if let Err(err) = self.store.update(patch) {
            return Err(self.desync(err));
        }
        self.view.on_update(&self.store, &id);
        if !self.view.contains(&id) {
            // Membership flipped out from under the selection.
            self.selection.prune(&self.view);
        }
        Ok(self.bump())
    }

    // -------------------------------------------------------------------------
    // User actions
    // -------------------------------------------------------------------------

    /// Replace the filter predicate (`None` restores accept-all).
    pub fn set_filter(&mut self, predicate: Option<Predicate<T>>) -> StateVersion {
        self.view.set_filter(&self.store, predicate);
        self.selection.prune(&self.view);
        self.bump()
    }

    /// Change the active sort. Membership and selection are unaffected.
    pub fn set_sort(&mut self, spec: SortSpec) -> StateVersion {
        self.view.set_sort(&self.store, &self.registry, spec);
        self.bump()
    }

    /// Replace the selection with a single id, or clear it.
    ///
    /// Selecting an id outside the view is ignored: selection is defined
    /// only over view members.
    pub fn select(&mut self, id: Option<&str>) -> StateVersion {
        if let Some(id) = id
            && !self.view.contains(id)
        {
            log::warn!("ignoring selection of {id:?}: not in view");
            return self.version;
        }
        self.selection.select(id);
        self.bump()
    }

    /// Move the anchor selection by `delta` view positions.
    pub fn select_relative(&mut self, delta: isize) -> StateVersion {
        self.selection.select_relative(&self.view, delta);
        self.bump()
    }

    /// Toggle an id in or out of the multi-selection.
    pub fn toggle_select(&mut self, id: &str) -> StateVersion {
        if !self.view.contains(id) {
            log::warn!("ignoring toggle of {id:?}: not in view");
            return self.version;
        }
        self.selection.toggle(id);
        self.bump()
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) -> StateVersion {
        self.selection.clear();
        self.bump()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn bump(&mut self) -> StateVersion {
        self.version = StateVersion(self.version.0 + 1);
        self.version
    }

    fn clear_all(&mut self) {
        self.store.clear();
        self.view.clear();
        self.selection.clear();
    }

    fn desync(&mut self, err: StoreError) -> EngineError {
        log::warn!("store rejected stream mutation ({err}), forcing resync");
        self.clear_all();
        self.state = SyncState::Syncing;
        self.bump();
        err.into()
    }
}
