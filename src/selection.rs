//! The set of spendings chosen for a bulk edit.

use std::collections::BTreeSet;

use crate::spending::SpendingId;

/// Tracks which of the visible spendings are selected.
///
/// The selected IDs are always a subset of the visible IDs. Replacing the
/// visible list with [Selection::set_visible] clears the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    visible: BTreeSet<SpendingId>,
    selected: BTreeSet<SpendingId>,
}

impl Selection {
    /// Create an empty selection over `visible`.
    pub fn new(visible: impl IntoIterator<Item = SpendingId>) -> Self {
        Self {
            visible: visible.into_iter().collect(),
            selected: BTreeSet::new(),
        }
    }

    /// Replace the visible spendings and clear the selection.
    pub fn set_visible(&mut self, visible: impl IntoIterator<Item = SpendingId>) {
        self.visible = visible.into_iter().collect();
        self.selected.clear();
    }

    /// Select `id` if it is unselected, otherwise deselect it.
    ///
    /// IDs that are not visible are ignored. Returns whether `id` is selected
    /// afterwards.
    pub fn toggle(&mut self, id: &SpendingId) -> bool {
        if !self.visible.contains(id) {
            tracing::debug!("Ignoring toggle of spending {id} which is not visible");
            return false;
        }

        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Replace the selection with `ids`, dropping any that are not visible.
    pub fn set_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a SpendingId>) {
        self.selected = ids
            .into_iter()
            .filter(|id| self.visible.contains(*id))
            .cloned()
            .collect();
    }

    /// Select every visible spending.
    pub fn select_all_visible(&mut self) {
        self.selected = self.visible.clone();
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Whether `id` is selected.
    pub fn is_selected(&self, id: &SpendingId) -> bool {
        self.selected.contains(id)
    }

    /// The selected IDs in ascending order.
    pub fn selected_ids(&self) -> &BTreeSet<SpendingId> {
        &self.selected
    }

    /// Whether there is at least one visible spending and all of them are
    /// selected.
    pub fn is_all_selected(&self) -> bool {
        !self.visible.is_empty() && self.selected.len() == self.visible.len()
    }

    /// The number of selected spendings.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(test)]
mod selection_tests {
    use std::collections::BTreeSet;

    use crate::{selection::Selection, spending::SpendingId};

    fn ids(raw: &[&str]) -> Vec<SpendingId> {
        raw.iter().map(|id| SpendingId::new(*id)).collect()
    }

    #[test]
    fn toggle_selects_then_deselects() {
        let mut selection = Selection::new(ids(&["a", "b"]));
        let a = SpendingId::new("a");

        assert!(selection.toggle(&a));
        assert!(selection.is_selected(&a));
        assert!(!selection.toggle(&a));
        assert!(!selection.is_selected(&a));
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_ignores_ids_that_are_not_visible() {
        let mut selection = Selection::new(ids(&["a"]));

        assert!(!selection.toggle(&SpendingId::new("z")));
        assert!(selection.is_empty());
    }

    #[test]
    fn set_all_keeps_only_visible_ids() {
        let mut selection = Selection::new(ids(&["a", "b", "c"]));
        selection.toggle(&SpendingId::new("c"));

        selection.set_all(&ids(&["a", "b", "x"]));

        assert_eq!(
            selection.selected_ids(),
            &BTreeSet::from_iter(ids(&["a", "b"]))
        );
    }

    #[test]
    fn select_all_visible_and_clear() {
        let mut selection = Selection::new(ids(&["a", "b"]));

        selection.select_all_visible();
        assert!(selection.is_all_selected());
        assert_eq!(selection.len(), 2);

        selection.clear();
        assert!(selection.is_empty());
        assert!(!selection.is_all_selected());
    }

    #[test]
    fn empty_list_is_never_all_selected() {
        let mut selection = Selection::default();

        selection.select_all_visible();

        assert!(!selection.is_all_selected());
    }

    #[test]
    fn replacing_visible_list_clears_selection() {
        let mut selection = Selection::new(ids(&["a", "b"]));
        selection.select_all_visible();

        selection.set_visible(ids(&["a", "b", "c"]));

        assert!(selection.is_empty());
        assert!(!selection.is_selected(&SpendingId::new("a")));
    }
}
