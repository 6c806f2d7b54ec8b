//! Filtered, sorted projection of a store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::Entity;
use crate::filter::{Predicate, accept_all};
use crate::sort::{Comparator, SortRegistry, SortSpec};
use crate::store::Store;

/// The filtered + sorted projection of a [`Store`].
///
/// `view` is the subsequence of the store's arrival list whose entities
/// satisfy the active predicate, ordered by the active comparator (arrival
/// order when none). `view_index` mirrors the store's positional index:
/// `view[view_index[id]] == id` for every member.
///
/// Maintenance is incremental. Stream events touch only the affected id
/// (binary insertion against the active ordering, tail reindex); the one
/// full O(n log n) recompute happens on a filter change, which is a user
/// action rather than stream volume.
pub struct View<T: Entity> {
    predicate: Predicate<T>,
    sort: SortSpec,
    cmp: Option<Comparator<T>>,
    view: Vec<String>,
    view_index: HashMap<String, usize>,
}

impl<T: Entity> View<T> {
    /// Create an empty view accepting everything, in arrival order.
    pub fn new() -> Self {
        Self {
            predicate: accept_all(),
            sort: SortSpec::none(),
            cmp: None,
            view: Vec::new(),
            view_index: HashMap::new(),
        }
    }

    /// Member ids in view order.
    pub fn ids(&self) -> &[String] {
        &self.view
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// Check whether the view has no members.
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Check whether an id is a member.
    pub fn contains(&self, id: &str) -> bool {
        self.view_index.contains_key(id)
    }

    /// View position of an id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.view_index.get(id).copied()
    }

    /// The active sort.
    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    // -------------------------------------------------------------------------
    // Incremental maintenance (driven by the stream adapter)
    // -------------------------------------------------------------------------

    /// React to an entity added to the store.
    pub fn on_add(&mut self, store: &Store<T>, id: &str) {
        let Some(entity) = store.get(id) else { return };
        if self.view_index.contains_key(id) || !(self.predicate)(entity) {
            return;
        }
        let pos = self.insertion_point(store, entity);
        self.view.insert(pos, id.to_string());
        self.reindex_from(pos);
    }

    /// React to an entity updated in place.
    ///
    /// Membership is re-evaluated; a surviving member is removed and
    /// re-inserted because its position may have moved under the active
    /// comparator.
    pub fn on_update(&mut self, store: &Store<T>, id: &str) {
        let Some(entity) = store.get(id) else { return };
        let passes = (self.predicate)(entity);
        let member = self.view_index.contains_key(id);
        match (member, passes) {
            (true, false) => {
                self.on_remove(id);
            }
            (false, true) => self.on_add(store, id),
            (true, true) => {
                if let Some(pos) = self.view_index.remove(id) {
                    self.view.remove(pos);
                    let new_pos = self.insertion_point(store, entity);
                    self.view.insert(new_pos, id.to_string());
                    self.reindex_from(pos.min(new_pos));
                }
            }
            (false, false) => {}
        }
    }

    /// React to an entity removed from the store.
    ///
    /// Returns the former view position if the id was a member.
    pub fn on_remove(&mut self, id: &str) -> Option<usize> {
        let pos = self.view_index.remove(id)?;
        self.view.remove(pos);
        self.reindex_from(pos);
        Some(pos)
    }

    // -------------------------------------------------------------------------
    // User-issued changes
    // -------------------------------------------------------------------------

    /// Replace the filter predicate (`None` restores accept-all) and
    /// recompute membership from scratch.
    pub fn set_filter(&mut self, store: &Store<T>, predicate: Option<Predicate<T>>) {
        self.predicate = predicate.unwrap_or_else(accept_all);
        self.recompute(store);
    }

    /// Change the active sort, reordering the current membership.
    ///
    /// Membership itself is untouched. An unknown column name falls back to
    /// arrival order.
    pub fn set_sort(&mut self, store: &Store<T>, registry: &SortRegistry<T>, spec: SortSpec) {
        self.cmp = match spec.column.as_deref() {
            None => None,
            Some(column) => match registry.get(column) {
                Some(cmp) => Some(cmp),
                None => {
                    log::warn!("unknown sort column {column:?}, falling back to arrival order");
                    None
                }
            },
        };
        self.sort = spec;
        self.sort_members(store);
    }

    /// Rebuild membership and order from the store.
    pub fn recompute(&mut self, store: &Store<T>) {
        let predicate = Arc::clone(&self.predicate);
        self.view = store
            .iter()
            .filter(|entity| predicate(entity))
            .map(Entity::id)
            .collect();
        self.sort_members(store);
    }

    /// Drop every member. The predicate and sort settings survive; they are
    /// user state, not stream state.
    pub fn clear(&mut self) {
        self.view.clear();
        self.view_index.clear();
    }

    // -------------------------------------------------------------------------
    // Ordering internals
    // -------------------------------------------------------------------------

    /// Binary-search the unique slot for an entity under the active
    /// ordering. The arrival-order tie-break makes the ordering total, so
    /// the slot is deterministic.
    fn insertion_point(&self, store: &Store<T>, entity: &T) -> usize {
        let id = entity.id();
        let cmp = self.cmp;
        let descending = self.sort.descending;
        let mut lo = 0;
        let mut hi = self.view.len();
        while lo < hi {
            let mid = usize::midpoint(lo, hi);
            let ord = Self::order_against(store, cmp, descending, entity, &id, &self.view[mid]);
            if ord == Ordering::Less {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }

    fn sort_members(&mut self, store: &Store<T>) {
        if self.cmp.is_some() {
            let cmp = self.cmp;
            let descending = self.sort.descending;
            let mut members = std::mem::take(&mut self.view);
            members.sort_by(|a, b| Self::order_ids(store, cmp, descending, a, b));
            self.view = members;
        }
        self.view_index.clear();
        for (pos, id) in self.view.iter().enumerate() {
            self.view_index.insert(id.clone(), pos);
        }
    }

    fn reindex_from(&mut self, start: usize) {
        for (offset, id) in self.view[start..].iter().enumerate() {
            self.view_index.insert(id.clone(), start + offset);
        }
    }

    fn order_against(
        store: &Store<T>,
        cmp: Option<Comparator<T>>,
        descending: bool,
        a: &T,
        a_id: &str,
        b_id: &str,
    ) -> Ordering {
        let Some(b) = store.get(b_id) else {
            return Ordering::Less;
        };
        let primary = match cmp {
            Some(compare) => {
                let ord = compare(a, b);
                if descending { ord.reverse() } else { ord }
            }
            None => Ordering::Equal,
        };
        primary.then_with(|| Self::arrival_order(store, a_id, b_id))
    }

    fn order_ids(
        store: &Store<T>,
        cmp: Option<Comparator<T>>,
        descending: bool,
        a_id: &str,
        b_id: &str,
    ) -> Ordering {
        let (Some(a), Some(b)) = (store.get(a_id), store.get(b_id)) else {
            return Ordering::Equal;
        };
        let primary = match cmp {
            Some(compare) => {
                let ord = compare(a, b);
                if descending { ord.reverse() } else { ord }
            }
            None => Ordering::Equal,
        };
        primary.then_with(|| Self::arrival_order(store, a_id, b_id))
    }

    /// Ties never reverse: arrival order applies regardless of direction.
    fn arrival_order(store: &Store<T>, a_id: &str, b_id: &str) -> Ordering {
        let a = store.index_of(a_id).unwrap_or(usize::MAX);
        let b = store.index_of(b_id).unwrap_or(usize::MAX);
        a.cmp(&b)
    }
}

impl<T: Entity> Default for View<T> {
    fn default() -> Self {
        Self::new()
    }
}
