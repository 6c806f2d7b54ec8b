//! Live collection engine for streamed capture sessions.
//!
//! Keeps a continuously mutated set of records (intercepted HTTP flows,
//! event-log lines) synchronized with a server-pushed message stream while
//! exposing a filtered, sorted, windowed projection to a renderer and a
//! multi-select cursor. All mutations are incremental: a stream event never
//! triggers a rescan of the full collection.
//!
//! The engine is synchronous and lock-free. A single writer owns the
//! [`adapter::StreamAdapter`] and applies stream messages and user actions
//! in arrival order; readers observe fully consistent post-mutation state
//! and use [`adapter::StateVersion`] tokens to decide when to recompute
//! derived data.

pub mod adapter;
pub mod entity;
pub mod error;
pub mod filter;
pub mod model;
pub mod selection;
pub mod sort;
pub mod store;
pub mod view;
pub mod window;

pub mod prelude {
    pub use crate::adapter::{StateVersion, StreamAdapter, StreamMessage, SyncState};
    pub use crate::entity::Entity;
    pub use crate::error::EngineError;
    pub use crate::filter::{FilterCompiler, FilterError, Predicate, accept_all};
    pub use crate::model::{Flow, LogEvent, LogLevel, flow_columns, level_filter};
    pub use crate::selection::Selection;
    pub use crate::sort::{Comparator, SortRegistry, SortSpec};
    pub use crate::store::{Store, StoreError};
    pub use crate::view::View;
    pub use crate::window::{self, WindowSlice};
}
