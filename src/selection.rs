//! Row selection state.
//!
//! Selection is addressed by [`ItemId`] so it survives re-sorting, paging
//! and refetching. Besides explicit ids the state can be put into an "all
//! selected" mode, which covers every row of a remote data set without
//! enumerating ids the client has never loaded; rows deselected while in
//! that mode are tracked as exclusions.

use crate::error::{Result, TableError};
use crate::value::ItemId;
use std::collections::HashSet;

/// Tri-state of the bulk-select checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkSelectState {
    /// Every row is selected.
    Checked,
    /// No row is selected.
    Unchecked,
    /// Some but not all rows are selected.
    Indeterminate,
}

impl BulkSelectState {
    /// Checkbox value: `Some(true)`, `Some(false)`, or `None` for indeterminate.
    pub fn as_checkbox(&self) -> Option<bool> {
        match self {
            BulkSelectState::Checked => Some(true),
            BulkSelectState::Unchecked => Some(false),
            BulkSelectState::Indeterminate => None,
        }
    }
}

/// Selected rows of one table.
///
/// # Examples
///
/// ```rust
/// use table_controls::selection::{BulkSelectState, SelectionState};
///
/// let mut selection = SelectionState::new();
/// selection.select_page(["1", "2"]);
/// assert_eq!(selection.bulk_select_state(5), BulkSelectState::Indeterminate);
///
/// selection.select_page(["3", "4", "5"]);
/// assert_eq!(selection.bulk_select_state(5), BulkSelectState::Checked);
///
/// // Remote table: 500 rows exist, only one page is loaded.
/// selection.select_all(Some(500)).unwrap();
/// selection.toggle("42");
/// assert_eq!(selection.selected_count(500), 499);
/// assert!(!selection.is_selected("42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: HashSet<ItemId>,
    all_selected: bool,
    excluded: HashSet<ItemId>,
}

impl SelectionState {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the row is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        if self.all_selected {
            !self.excluded.contains(id)
        } else {
            self.selected.contains(id)
        }
    }

    /// Returns true while in "all selected" mode.
    pub fn is_all_marked(&self) -> bool {
        self.all_selected
    }

    /// Explicitly selected ids, sorted. Empty in "all selected" mode.
    pub fn selected_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Ids deselected while in "all selected" mode, sorted.
    pub fn excluded_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<_> = self.excluded.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of selected rows out of `total_items`.
    pub fn selected_count(&self, total_items: usize) -> usize {
        if self.all_selected {
            total_items.saturating_sub(self.excluded.len())
        } else {
            self.selected.len()
        }
    }

    /// Returns true if every one of `total_items` rows is selected.
    pub fn are_all_selected(&self, total_items: usize) -> bool {
        total_items > 0 && self.selected_count(total_items) >= total_items
    }

    /// Checkbox tri-state for `total_items` rows.
    pub fn bulk_select_state(&self, total_items: usize) -> BulkSelectState {
        if self.selected_count(total_items) == 0 {
            BulkSelectState::Unchecked
        } else if self.are_all_selected(total_items) {
            BulkSelectState::Checked
        } else {
            BulkSelectState::Indeterminate
        }
    }

    /// Number of selected rows among `ids`.
    pub fn selected_count_among(&self, ids: &[ItemId]) -> usize {
        ids.iter().filter(|id| self.is_selected(id.as_str())).count()
    }

    /// Checkbox tri-state over exactly the rows in `ids`.
    ///
    /// Use this when every row that can be shown is loaded: selected ids
    /// hidden by a filter do not count towards the state.
    pub fn bulk_select_state_among(&self, ids: &[ItemId]) -> BulkSelectState {
        let selected = self.selected_count_among(ids);
        if selected == 0 {
            BulkSelectState::Unchecked
        } else if selected == ids.len() {
            BulkSelectState::Checked
        } else {
            BulkSelectState::Indeterminate
        }
    }

    /// Selects or deselects one row. Returns true if anything changed.
    pub fn select(&mut self, id: impl Into<ItemId>, is_selecting: bool) -> bool {
        let id = id.into();
        match (self.all_selected, is_selecting) {
            (true, true) => self.excluded.remove(&id),
            (true, false) => self.excluded.insert(id),
            (false, true) => self.selected.insert(id),
            (false, false) => self.selected.remove(&id),
        }
    }

    /// Flips one row. Returns the new selected state.
    pub fn toggle(&mut self, id: impl Into<ItemId>) -> bool {
        let id = id.into();
        let selecting = !self.is_selected(id.as_str());
        self.select(id, selecting);
        selecting
    }

    /// Selects or deselects several rows at once.
    pub fn select_multiple<I, S>(&mut self, ids: I, is_selecting: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        for id in ids {
            self.select(id, is_selecting);
        }
    }

    /// Clears the selection, including "all selected" mode.
    ///
    /// Returns the ids that were explicitly selected.
    pub fn select_none(&mut self) -> Vec<ItemId> {
        let mut removed: Vec<_> = self.selected.drain().collect();
        removed.sort();
        self.all_selected = false;
        self.excluded.clear();
        removed
    }

    /// Adds every row of the current page to the selection.
    ///
    /// Rows selected on other pages stay selected. Returns the newly
    /// selected ids.
    pub fn select_page<I, S>(&mut self, page_ids: I) -> Vec<ItemId>
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        let mut added = Vec::new();
        for id in page_ids {
            let id = id.into();
            if !self.is_selected(id.as_str()) {
                self.select(id.clone(), true);
                added.push(id);
            }
        }
        added
    }

    /// Selects every row of the data set.
    ///
    /// The total must be known: for remote tables that is the server-side
    /// total, which may exceed the rows loaded so far.
    pub fn select_all(&mut self, total_items: Option<usize>) -> Result<()> {
        let Some(total_items) = total_items else {
            log::warn!("select all requested before the total item count is known");
            return Err(TableError::TotalUnknown);
        };
        log::debug!("selecting all {total_items} items");
        self.selected.clear();
        self.excluded.clear();
        self.all_selected = true;
        Ok(())
    }

    /// Replaces the selection with exactly `ids`.
    pub fn set_selected<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        self.select_none();
        self.select_multiple(ids, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tri_state() {
        let mut state = SelectionState::new();
        assert_eq!(state.bulk_select_state(5), BulkSelectState::Unchecked);

        state.select_page(["1", "2"]);
        assert_eq!(state.bulk_select_state(5), BulkSelectState::Indeterminate);
        assert_eq!(state.bulk_select_state(5).as_checkbox(), None);

        state.select_page(["1", "2", "3", "4", "5"]);
        assert_eq!(state.bulk_select_state(5), BulkSelectState::Checked);
        assert_eq!(state.bulk_select_state(5).as_checkbox(), Some(true));
    }

    #[test]
    fn test_state_among_visible_ids_ignores_hidden_selection() {
        let mut state = SelectionState::new();
        state.select_page(["1", "2"]);
        let visible = [ItemId::from("4")];
        assert_eq!(state.selected_count_among(&visible), 0);
        assert_eq!(state.bulk_select_state_among(&visible), BulkSelectState::Unchecked);
        // Counting against the total alone would call this checked.
        assert_eq!(state.bulk_select_state(1), BulkSelectState::Checked);

        let visible = [ItemId::from("1"), ItemId::from("4")];
        assert_eq!(state.bulk_select_state_among(&visible), BulkSelectState::Indeterminate);
        assert_eq!(state.bulk_select_state_among(&[]), BulkSelectState::Unchecked);

        state.select_all(Some(10)).unwrap();
        state.toggle("4");
        assert_eq!(state.bulk_select_state_among(&[ItemId::from("1")]), BulkSelectState::Checked);
        assert_eq!(state.bulk_select_state_among(&visible), BulkSelectState::Indeterminate);
    }

    #[test]
    fn test_page_fully_selected_but_more_rows_remotely() {
        let mut state = SelectionState::new();
        state.select_page(["1", "2", "3", "4", "5"]);
        assert_eq!(state.bulk_select_state(20), BulkSelectState::Indeterminate);
        assert!(!state.are_all_selected(20));
    }

    #[test]
    fn test_select_page_unions_with_previous_pages() {
        let mut state = SelectionState::new();
        state.select_page([1u32, 2]);
        let added = state.select_page([2u32, 3]);
        assert_eq!(added, vec![ItemId::from("3")]);
        assert_eq!(
            state.selected_ids(),
            vec![ItemId::from("1"), ItemId::from("2"), ItemId::from("3")]
        );
    }

    #[test]
    fn test_select_all_requires_total() {
        let mut state = SelectionState::new();
        assert_eq!(state.select_all(None), Err(TableError::TotalUnknown));
        assert!(!state.is_all_marked());
    }

    #[test]
    fn test_select_all_with_exclusions() {
        let mut state = SelectionState::new();
        state.select_all(Some(100)).unwrap();
        assert!(state.is_selected("anything"));
        assert_eq!(state.bulk_select_state(100), BulkSelectState::Checked);

        assert!(!state.toggle("7"));
        assert_eq!(state.excluded_ids(), vec![ItemId::from("7")]);
        assert_eq!(state.selected_count(100), 99);
        assert_eq!(state.bulk_select_state(100), BulkSelectState::Indeterminate);

        assert!(state.toggle("7"));
        assert_eq!(state.bulk_select_state(100), BulkSelectState::Checked);
    }

    #[test]
    fn test_select_all_with_empty_data_is_unchecked() {
        let mut state = SelectionState::new();
        state.select_all(Some(0)).unwrap();
        assert_eq!(state.bulk_select_state(0), BulkSelectState::Unchecked);
    }

    #[test]
    fn test_select_none_clears_everything() {
        let mut state = SelectionState::new();
        state.select_page(["a", "b"]);
        assert_eq!(state.select_none(), vec![ItemId::from("a"), ItemId::from("b")]);

        state.select_all(Some(3)).unwrap();
        state.select("a", false);
        state.select_none();
        assert!(!state.is_all_marked());
        assert!(state.excluded_ids().is_empty());
        assert_eq!(state.selected_count(3), 0);
    }

    #[test]
    fn test_set_selected_replaces() {
        let mut state = SelectionState::new();
        state.select_page(["a", "b"]);
        state.set_selected(["c"]);
        assert_eq!(state.selected_ids(), vec![ItemId::from("c")]);
    }
}
