//! Selection tracking over a view.

use std::collections::HashSet;

use crate::entity::Entity;
use crate::view::View;

/// Id-based selection restricted to current view membership.
///
/// Ids stay stable while entities mutate, so selection survives reorders
/// and in-place updates; ids that leave the view are pruned in the same
/// update cycle. Relative navigation always operates against the single
/// anchor id, independent of multi-select membership.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: HashSet<String>,
    anchor: Option<String>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// All selected ids, sorted for deterministic ordering.
    pub fn selected(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Check whether an id is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The anchor id for relative navigation.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Clear all selection.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    /// Replace the selection with a single id, or clear it.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected.clear();
        match id {
            Some(id) => {
                self.selected.insert(id.to_string());
                self.anchor = Some(id.to_string());
            }
            None => self.anchor = None,
        }
    }

    /// Toggle an id in or out of the selection (checkbox-style multi-select).
    /// The anchor moves to the toggled id either way.
    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        self.anchor = Some(id.to_string());
    }

    /// Move the anchor selection by `delta` view positions, clamping at the
    /// boundaries (no wrap-around).
    ///
    /// With no current anchor, a forward delta selects the first view
    /// element and a backward delta selects the last. Returns the newly
    /// selected id, or `None` on an empty view.
    pub fn select_relative<T: Entity>(&mut self, view: &View<T>, delta: isize) -> Option<String> {
        if view.is_empty() {
            self.clear();
            return None;
        }
        let target = match self.anchor.as_deref().and_then(|id| view.index_of(id)) {
            Some(pos) => {
                let last = view.len() as isize - 1;
                (pos as isize + delta).clamp(0, last) as usize
            }
            None if delta >= 0 => 0,
            None => view.len() - 1,
        };
        let id = view.ids()[target].clone();
        self.select(Some(&id));
        Some(id)
    }

    /// Reconcile after a removal that already reached the view.
    ///
    /// The removed id is pruned unconditionally. If it was the only
    /// selected id, the element now occupying its former view position is
    /// selected instead (or the new last element, or nothing if the view
    /// emptied).
    pub fn on_removed<T: Entity>(&mut self, view: &View<T>, id: &str, former_pos: Option<usize>) {
        let was_selected = self.selected.remove(id);
        if self.anchor.as_deref() == Some(id) {
            self.anchor = None;
        }
        if !was_selected || !self.selected.is_empty() {
            return;
        }
        let Some(pos) = former_pos else { return };
        if view.is_empty() {
            return;
        }
        let target = pos.min(view.len() - 1);
        let replacement = view.ids()[target].clone();
        self.select(Some(&replacement));
    }

    /// Drop every selected id that is no longer a view member. Returns the
    /// number of ids pruned.
    pub fn prune<T: Entity>(&mut self, view: &View<T>) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id| view.contains(id));
        if let Some(anchor) = self.anchor.as_deref()
            && !view.contains(anchor)
        {
            self.anchor = None;
        }
        before - self.selected.len()
    }
}
