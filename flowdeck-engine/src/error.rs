//! Engine error taxonomy.

use thiserror::Error;

use crate::filter::FilterError;
use crate::store::StoreError;

/// Errors surfaced by collection mutations.
///
/// No variant is fatal. `Desync` means the local copy no longer matches
/// the stream; the adapter has already dropped back to syncing and the
/// embedder is expected to request a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The stream referenced ids inconsistently with the local copy.
    #[error("collection out of sync: {0}")]
    Desync(#[from] StoreError),

    /// The external compiler rejected a filter expression; the previous
    /// predicate stays active.
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),
}
