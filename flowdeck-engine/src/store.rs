//! Keyed, insertion-ordered entity storage.

use std::collections::HashMap;

use thiserror::Error;

use crate::entity::Entity;

/// Errors raised by [`Store`] mutations.
///
/// Both variants mean the local copy has drifted from the stream: the
/// stream promised an id we already have, or referenced one we never saw.
/// Callers are expected to treat either as a signal to resync rather than
/// swallow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An `add` carried an id that is already present.
    #[error("duplicate id {0:?}")]
    DuplicateId(String),
    /// An `update` or `remove` referenced an id that is not present.
    #[error("unknown id {0:?}")]
    NotFound(String),
}

/// Keyed, insertion-ordered collection with O(1) id lookup.
///
/// Maintains three structures in lockstep: `by_id` for lookup, `list` for
/// arrival order, and `list_index` for positional queries. The invariant
/// `list[list_index[id]] == id` holds for every stored id.
#[derive(Debug, Clone)]
pub struct Store<T: Entity> {
    by_id: HashMap<String, T>,
    list: Vec<String>,
    list_index: HashMap<String, usize>,
}

impl<T: Entity> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            list: Vec::new(),
            list_index: HashMap::new(),
        }
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Check whether an id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Look up an entity by id.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id)
    }

    /// Arrival position of an id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.list_index.get(id).copied()
    }

    /// All ids in arrival order.
    pub fn ids(&self) -> &[String] {
        &self.list
    }

    /// Iterate entities in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.list.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Append a new entity.
    ///
    /// Fails with [`StoreError::DuplicateId`] if the id is already present;
    /// the stored collection is left untouched in that case.
    pub fn add(&mut self, entity: T) -> Result<(), StoreError> {
        let id = entity.id();
        if self.by_id.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        self.list_index.insert(id.clone(), self.list.len());
        self.list.push(id.clone());
        self.by_id.insert(id, entity);
        Ok(())
    }

    /// Merge a patch into an existing entity, preserving arrival position.
    pub fn update(&mut self, patch: T) -> Result<(), StoreError> {
        let id = patch.id();
        match self.by_id.get_mut(&id) {
            Some(entity) => {
                entity.merge(patch);
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    /// Remove an entity, shifting every later arrival position down by one.
    ///
    /// O(n) in the tail length. Removal is rare relative to add/update in
    /// this workload, so the linear reindex is acceptable.
    pub fn remove(&mut self, id: &str) -> Result<T, StoreError> {
        let Some(entity) = self.by_id.remove(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        if let Some(pos) = self.list_index.remove(id) {
            self.list.remove(pos);
            for (offset, later) in self.list[pos..].iter().enumerate() {
                self.list_index.insert(later.clone(), pos + offset);
            }
        }
        Ok(entity)
    }

    /// Replace the whole collection atomically with a new ordered snapshot.
    ///
    /// Used on resync. If the snapshot repeats an id, the last occurrence
    /// wins, keeping the operation idempotent under replay.
    pub fn reset(&mut self, entities: Vec<T>) {
        self.by_id.clear();
        self.list.clear();
        self.list_index.clear();
        for entity in entities {
            let id = entity.id();
            if self.by_id.insert(id.clone(), entity).is_none() {
                self.list_index.insert(id.clone(), self.list.len());
                self.list.push(id);
            }
        }
    }

    /// Drop every entity.
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.list.clear();
        self.list_index.clear();
    }
}

impl<T: Entity> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}
