//! Named comparators for view ordering.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Comparator over two entities of the same collection.
///
/// Returns the ascending ordering; the view negates it when the active
/// sort is descending. Comparators must place entities lacking the
/// relevant field deterministically (see the flow columns for examples).
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// The active sort: a named column plus direction.
///
/// `column: None` means arrival order. Ties under the named comparator are
/// resolved by arrival order as well — stable, with no secondary key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column name resolved through the [`SortRegistry`].
    pub column: Option<String>,
    /// Negate the comparator result.
    #[serde(default)]
    pub descending: bool,
}

impl SortSpec {
    /// Sort by a named column.
    pub fn by(column: impl Into<String>, descending: bool) -> Self {
        Self {
            column: Some(column.into()),
            descending,
        }
    }

    /// Arrival order.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check whether this spec selects arrival order.
    pub fn is_none(&self) -> bool {
        self.column.is_none()
    }
}

/// Registry of named comparators, one per sortable column.
pub struct SortRegistry<T: Entity> {
    comparators: HashMap<String, Comparator<T>>,
}

impl<T: Entity> SortRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            comparators: HashMap::new(),
        }
    }

    /// Register a comparator under a column name, replacing any previous
    /// comparator for that name.
    pub fn register(&mut self, column: impl Into<String>, comparator: Comparator<T>) {
        self.comparators.insert(column.into(), comparator);
    }

    /// Resolve a column name.
    pub fn get(&self, column: &str) -> Option<Comparator<T>> {
        self.comparators.get(column).copied()
    }

    /// Registered column names, in no particular order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.comparators.keys().map(String::as_str)
    }
}

impl<T: Entity> Default for SortRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
