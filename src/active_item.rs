//! The active item: the one row whose details are open beside the table.

use crate::value::ItemId;

/// Tracks the row whose detail view is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveItemState {
    active_id: Option<ItemId>,
}

impl ActiveItemState {
    /// Creates a state with no active item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial active item (builder pattern).
    pub fn with_active_id(mut self, id: Option<ItemId>) -> Self {
        self.active_id = id;
        self
    }

    /// Id of the active row.
    pub fn active_id(&self) -> Option<&ItemId> {
        self.active_id.as_ref()
    }

    /// Returns true if `id` is the active row.
    pub fn is_active(&self, id: &str) -> bool {
        self.active_id.as_ref().is_some_and(|active| active.as_str() == id)
    }

    /// Makes `id` the active row.
    pub fn set_active(&mut self, id: impl Into<ItemId>) {
        self.active_id = Some(id.into());
    }

    /// Closes the detail view.
    pub fn clear(&mut self) {
        self.active_id = None;
    }

    /// Clears the active item if it is no longer among the loaded rows.
    ///
    /// Skipped while loading, when the loaded rows are stale. Returns true if
    /// the active item was cleared.
    pub fn clear_if_missing<'a, I>(&mut self, loaded_ids: I, is_loading: bool) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if is_loading {
            return false;
        }
        let Some(active) = &self.active_id else {
            return false;
        };
        if loaded_ids.into_iter().any(|id| id == active.as_str()) {
            return false;
        }
        log::debug!("active item `{active}` is no longer loaded, clearing it");
        self.active_id = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut state = ActiveItemState::new();
        assert!(state.active_id().is_none());
        state.set_active(3u32);
        assert!(state.is_active("3"));
        assert!(!state.is_active("4"));
        state.clear();
        assert!(!state.is_active("3"));
    }

    #[test]
    fn test_clear_if_missing() {
        let mut state = ActiveItemState::new().with_active_id(Some(ItemId::from("b")));
        assert!(!state.clear_if_missing(["a", "b"], false));
        assert!(!state.clear_if_missing(["a"], true));
        assert!(state.is_active("b"));
        assert!(state.clear_if_missing(["a"], false));
        assert!(state.active_id().is_none());
    }
}
