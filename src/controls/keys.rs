//! Keyboard bindings of the table controls.

use super::{TableAction, TableControlsConfig};
use crate::key::{self, Binding, KeyMap};
use bubbletea_rs::KeyMsg;

/// Key bindings for paging, selection and filter actions.
///
/// Bindings for disabled features are switched off by
/// [`TableKeyMap::for_config`], so they neither match nor show up in help.
///
/// ```rust
/// use table_controls::controls::{TableControlsConfig, TableKeyMap};
/// use table_controls::key::KeyMap;
///
/// let keymap = TableKeyMap::for_config(&TableControlsConfig::local("apps"));
/// assert_eq!(keymap.short_help().len(), 3); // prev, next, clear filters
/// ```
#[derive(Debug, Clone)]
pub struct TableKeyMap {
    /// Previous page. Default keys: PageUp, Left Arrow, 'h'.
    pub prev_page: Binding,
    /// Next page. Default keys: PageDown, Right Arrow, 'l'.
    pub next_page: Binding,
    /// Select every row of the current page. Default key: 'a'.
    pub select_page: Binding,
    /// Select every row of the data set. Default key: 'A'.
    pub select_all: Binding,
    /// Clear the selection. Default key: 'n'.
    pub select_none: Binding,
    /// Clear every filter. Default key: 'x'.
    pub clear_filters: Binding,
}

impl Default for TableKeyMap {
    fn default() -> Self {
        Self {
            prev_page: key::new_binding(vec![
                key::with_keys_str(&["pgup", "left", "h"]),
                key::with_help("←/h", "prev page"),
            ]),
            next_page: key::new_binding(vec![
                key::with_keys_str(&["pgdown", "right", "l"]),
                key::with_help("→/l", "next page"),
            ]),
            select_page: key::new_binding(vec![
                key::with_keys_str(&["a"]),
                key::with_help("a", "select page"),
            ]),
            select_all: key::new_binding(vec![
                key::with_keys_str(&["A"]),
                key::with_help("A", "select all"),
            ]),
            select_none: key::new_binding(vec![
                key::with_keys_str(&["n"]),
                key::with_help("n", "select none"),
            ]),
            clear_filters: key::new_binding(vec![
                key::with_keys_str(&["x"]),
                key::with_help("x", "clear filters"),
            ]),
        }
    }
}

impl TableKeyMap {
    /// Default bindings with those of disabled features switched off.
    pub fn for_config(config: &TableControlsConfig) -> Self {
        let mut keymap = Self::default();
        keymap.prev_page.set_enabled(config.pagination.is_enabled());
        keymap.next_page.set_enabled(config.pagination.is_enabled());
        keymap.select_page.set_enabled(config.selection);
        keymap.select_all.set_enabled(config.selection);
        keymap.select_none.set_enabled(config.selection);
        keymap.clear_filters.set_enabled(config.filter.is_enabled());
        keymap
    }

    /// The action bound to `msg`, if any.
    pub fn action_for(&self, msg: &KeyMsg) -> Option<TableAction> {
        let bindings = [
            (&self.prev_page, TableAction::PrevPage),
            (&self.next_page, TableAction::NextPage),
            (&self.select_page, TableAction::SelectPage),
            (&self.select_all, TableAction::SelectAll),
            (&self.select_none, TableAction::SelectNone),
            (&self.clear_filters, TableAction::ClearFilters),
        ];
        bindings
            .into_iter()
            .find(|(binding, _)| binding.matches(msg))
            .map(|(_, action)| action)
    }

    fn enabled(bindings: Vec<&Binding>) -> Vec<&Binding> {
        bindings.into_iter().filter(|b| b.enabled()).collect()
    }
}

impl KeyMap for TableKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        Self::enabled(vec![&self.prev_page, &self.next_page, &self.select_page, &self.clear_filters])
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            Self::enabled(vec![&self.prev_page, &self.next_page]),
            Self::enabled(vec![&self.select_page, &self.select_all, &self.select_none]),
            Self::enabled(vec![&self.clear_filters]),
        ]
        .into_iter()
        .filter(|column| !column.is_empty())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::FeatureMode;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(code: KeyCode) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_default_bindings_map_to_actions() {
        let keymap = TableKeyMap::default();
        assert_eq!(keymap.action_for(&press(KeyCode::Right)), Some(TableAction::NextPage));
        assert_eq!(keymap.action_for(&press(KeyCode::Char('h'))), Some(TableAction::PrevPage));
        assert_eq!(keymap.action_for(&press(KeyCode::Char('a'))), Some(TableAction::SelectPage));
        assert_eq!(
            keymap.action_for(&KeyMsg {
                key: KeyCode::Char('A'),
                modifiers: KeyModifiers::SHIFT
            }),
            Some(TableAction::SelectAll)
        );
        assert_eq!(keymap.action_for(&press(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_disabled_features_have_no_bindings() {
        let config = TableControlsConfig::new("t").with_pagination(FeatureMode::Remote);
        let keymap = TableKeyMap::for_config(&config);
        assert_eq!(keymap.action_for(&press(KeyCode::Char('a'))), None);
        assert_eq!(keymap.action_for(&press(KeyCode::Char('x'))), None);
        assert_eq!(keymap.action_for(&press(KeyCode::PageDown)), Some(TableAction::NextPage));
        assert_eq!(keymap.full_help().len(), 1);
    }
}
