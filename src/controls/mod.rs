//! The table controls composer.
//!
//! [`TableControls`] owns every sub-state of one table (filter, sort,
//! pagination, expansion, selection and active item) together with the rows
//! currently loaded, and answers the questions a renderer asks: which rows
//! are visible and in what order, what each header, row and cell should
//! show, and which request to send to the hub. Each feature is configured
//! independently as disabled, local or remote ([`FeatureMode`]), and the
//! renderer never has to branch on which one is in effect.
//!
//! ## State flow
//!
//! - All mutations go through [`TableControls::update`] with a
//!   [`TableAction`], or through [`TableControls::update_key`] for key
//!   messages.
//! - New rows arrive through [`TableControls::set_data`].
//! - After every mutation and every data change the page number is clamped
//!   to the last valid page, and an active item that is no longer loaded is
//!   cleared.
//! - [`TableControls::derived`] recomputes the visible rows on demand.
//!
//! ## Example
//!
//! ```rust
//! use table_controls::controls::{Column, DataSource, TableAction, TableControls, TableControlsConfig, TableDefinition};
//! use table_controls::filter::FilterCategory;
//! use table_controls::SortValue;
//!
//! #[derive(Debug, Clone)]
//! struct App { id: u32, name: String }
//!
//! let definition = TableDefinition::new(|app: &App| app.id)
//!     .with_column(Column::new("name", "Name").sortable().with_cell(|app: &App| app.name.clone()))
//!     .with_filter_category(FilterCategory::new("name", "Name").with_item_value(|app: &App| Some(app.name.clone())))
//!     .with_sort_value(|app: &App, _key: &str| Some(SortValue::from(app.name.as_str())));
//!
//! let mut table = TableControls::new(TableControlsConfig::local("apps").with_items_per_page(2), definition).unwrap();
//! table.set_data(DataSource::Local(vec![
//!     App { id: 1, name: "gamma".into() },
//!     App { id: 2, name: "alpha".into() },
//!     App { id: 3, name: "beta".into() },
//! ]));
//!
//! table.update(TableAction::ToggleSort("name".into())).unwrap();
//! let view = table.derived();
//! let names: Vec<&str> = view.current_page_items.iter().map(|app| app.name.as_str()).collect();
//! assert_eq!(names, vec!["alpha", "beta"]);
//! assert_eq!(view.page_count, 2);
//! ```

pub mod keys;
mod props;
mod types;
mod view;


pub use keys::TableKeyMap;
pub use props::{
    BulkSelectProps, CellProps, CompoundExpandProps, ExpandedContentProps, FilterChip, HeaderCellProps,
    PaginationProps, RowProps, SingleExpandProps, ToolbarProps,
};
pub use types::{CellFn, Column, DataSource, FeatureMode, TableAction, TableControlsConfig, TableDefinition};

use crate::active_item::ActiveItemState;
use crate::error::{Feature, Result, TableError};
use crate::expansion::ExpansionState;
use crate::filter::{filter_items, FilterState};
use crate::hub::{
    get_hub_request_params, serialize_request_params_for_hub, HubParamsInput, HubQuery, HubRequestParams,
};
use crate::pagination::{paginate_items, PaginationState, PaginationView};
use crate::persistence::TableStateSnapshot;
use crate::selection::{BulkSelectState, SelectionState};
use crate::sort::{sort_items, SortState};
use crate::value::ItemId;
use bubbletea_rs::{KeyMsg, Msg};

/// Rows of the current view, recomputed from the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView<'a, T> {
    /// Rows that pass local filtering.
    pub filtered_items: Vec<&'a T>,
    /// Filtered rows in local sort order.
    pub sorted_items: Vec<&'a T>,
    /// Rows of the current page.
    pub current_page_items: Vec<&'a T>,
    /// Rows across all pages: the filtered count locally, the server total
    /// for remote pagination.
    pub total_item_count: usize,
    /// Number of pages; 1 when pagination is disabled.
    pub page_count: usize,
}

/// State and derived views of one table.
pub struct TableControls<T> {
    config: TableControlsConfig,
    definition: TableDefinition<T>,
    filter_state: FilterState,
    sort_state: SortState,
    pagination_state: PaginationState,
    expansion_state: Option<ExpansionState>,
    selection_state: SelectionState,
    active_item_state: ActiveItemState,
    data: DataSource<T>,
    is_loading: bool,
    fetch_error: Option<String>,
    keymap: TableKeyMap,
    pagination_view: PaginationView,
}

impl<T: std::fmt::Debug> std::fmt::Debug for TableControls<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableControls")
            .field("config", &self.config)
            .field("filter_state", &self.filter_state)
            .field("sort_state", &self.sort_state)
            .field("pagination_state", &self.pagination_state)
            .field("expansion_state", &self.expansion_state)
            .field("selection_state", &self.selection_state)
            .field("active_item_state", &self.active_item_state)
            .field("data", &self.data)
            .field("is_loading", &self.is_loading)
            .field("fetch_error", &self.fetch_error)
            .finish_non_exhaustive()
    }
}

impl<T> TableControls<T> {
    /// Creates controls with no rows loaded.
    ///
    /// Fails if the initial page size is zero. An initial sort on a column
    /// that is not sortable is ignored.
    pub fn new(config: TableControlsConfig, definition: TableDefinition<T>) -> Result<Self> {
        let pagination_state = PaginationState::new().with_items_per_page(config.initial_items_per_page)?;
        let sortable = definition.columns().iter().filter(|c| c.sortable).map(|c| c.key.clone());
        let sort_state = SortState::new(sortable).with_initial_sort(config.initial_sort.clone());

        if config.sort.is_remote() {
            for key in sort_state.sortable_columns() {
                if !definition.hub_sort_fields().contains_key(key) {
                    log::warn!("{}: sortable column `{key}` has no hub sort field", config.table_name);
                }
            }
        }

        let keymap = TableKeyMap::for_config(&config);
        Ok(Self {
            expansion_state: config.expansion.map(ExpansionState::new),
            keymap,
            config,
            definition,
            filter_state: FilterState::new(),
            sort_state,
            pagination_state,
            selection_state: SelectionState::new(),
            active_item_state: ActiveItemState::new(),
            data: DataSource::default(),
            is_loading: false,
            fetch_error: None,
            pagination_view: PaginationView::default(),
        })
    }

    /// Replaces the key bindings (builder pattern).
    pub fn with_keymap(mut self, keymap: TableKeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Replaces the pagination line renderer (builder pattern).
    pub fn with_pagination_view(mut self, view: PaginationView) -> Self {
        self.pagination_view = view;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &TableControlsConfig {
        &self.config
    }

    /// The table definition.
    pub fn definition(&self) -> &TableDefinition<T> {
        &self.definition
    }

    /// Filter state.
    pub fn filter_state(&self) -> &FilterState {
        &self.filter_state
    }

    /// Sort state.
    pub fn sort_state(&self) -> &SortState {
        &self.sort_state
    }

    /// Pagination state.
    pub fn pagination_state(&self) -> &PaginationState {
        &self.pagination_state
    }

    /// Expansion state, `None` when expansion is disabled.
    pub fn expansion_state(&self) -> Option<&ExpansionState> {
        self.expansion_state.as_ref()
    }

    /// Selection state.
    pub fn selection_state(&self) -> &SelectionState {
        &self.selection_state
    }

    /// Active item state.
    pub fn active_item_state(&self) -> &ActiveItemState {
        &self.active_item_state
    }

    /// The loaded rows.
    pub fn data(&self) -> &DataSource<T> {
        &self.data
    }

    /// Whether a fetch is in flight, as reported by the caller.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The last fetch error, as reported by the caller.
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    /// Key bindings.
    pub fn keymap(&self) -> &TableKeyMap {
        &self.keymap
    }

    /// Returns true if filtering is enabled.
    pub fn is_filter_enabled(&self) -> bool {
        self.config.filter.is_enabled()
    }

    /// Returns true if sorting is enabled.
    pub fn is_sort_enabled(&self) -> bool {
        self.config.sort.is_enabled()
    }

    /// Returns true if pagination is enabled.
    pub fn is_pagination_enabled(&self) -> bool {
        self.config.pagination.is_enabled()
    }

    /// Returns true if rows expand.
    pub fn is_expansion_enabled(&self) -> bool {
        self.expansion_state.is_some()
    }

    /// Returns true if rows can be selected.
    pub fn is_selection_enabled(&self) -> bool {
        self.config.selection
    }

    /// Returns true if active item tracking is enabled.
    pub fn is_active_item_enabled(&self) -> bool {
        self.config.active_item
    }

    /// Replaces the loaded rows.
    pub fn set_data(&mut self, data: DataSource<T>) {
        self.data = data;
        self.refresh();
    }

    /// Records whether a fetch is in flight.
    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
        self.refresh();
    }

    /// Records the last fetch error.
    pub fn set_fetch_error(&mut self, error: Option<String>) {
        self.fetch_error = error;
    }

    fn require(&self, enabled: bool, feature: Feature) -> Result<()> {
        if enabled {
            Ok(())
        } else {
            log::warn!("{}: {feature} is disabled", self.config.table_name);
            Err(TableError::FeatureDisabled(feature))
        }
    }

    fn expansion_mut(&mut self) -> Result<&mut ExpansionState> {
        self.require(self.expansion_state.is_some(), Feature::Expansion)?;
        self.expansion_state
            .as_mut()
            .ok_or(TableError::FeatureDisabled(Feature::Expansion))
    }

    /// Applies one state change, then clamps the page and drops a stale
    /// active item.
    ///
    /// Fails without changing anything if the action targets a disabled
    /// feature or violates a precondition of the sub-state.
    pub fn update(&mut self, action: TableAction) -> Result<()> {
        log::debug!("{}: {action:?}", self.config.table_name);
        let result = self.apply(action);
        self.refresh();
        result
    }

    fn apply(&mut self, action: TableAction) -> Result<()> {
        match action {
            TableAction::SetFilterValues { key, values } => {
                self.require(self.is_filter_enabled(), Feature::Filter)?;
                self.filter_state.set_filter_values(key, values);
            }
            TableAction::RemoveFilterValue { key, value } => {
                self.require(self.is_filter_enabled(), Feature::Filter)?;
                self.filter_state.remove_value(&key, &value);
            }
            TableAction::ClearFilters => {
                self.require(self.is_filter_enabled(), Feature::Filter)?;
                self.filter_state.clear_all();
            }
            TableAction::ToggleSort(column_key) => {
                self.require(self.is_sort_enabled(), Feature::Sort)?;
                self.sort_state.toggle_column(&column_key)?;
            }
            TableAction::SetSort(sort) => {
                self.require(self.is_sort_enabled(), Feature::Sort)?;
                self.sort_state.set_active_sort(sort)?;
            }
            TableAction::SetPage(page_number) => {
                self.require(self.is_pagination_enabled(), Feature::Pagination)?;
                self.pagination_state.set_page_number(page_number);
            }
            TableAction::NextPage => {
                self.require(self.is_pagination_enabled(), Feature::Pagination)?;
                let total = self.effective_total();
                self.pagination_state.next_page(total);
            }
            TableAction::PrevPage => {
                self.require(self.is_pagination_enabled(), Feature::Pagination)?;
                self.pagination_state.prev_page();
            }
            TableAction::SetItemsPerPage(items_per_page) => {
                self.require(self.is_pagination_enabled(), Feature::Pagination)?;
                self.pagination_state.set_items_per_page(items_per_page)?;
            }
            TableAction::SetExpanded {
                item_id,
                is_expanding,
                column_key,
            } => {
                self.expansion_mut()?
                    .set_cell_expanded(item_id, is_expanding, column_key.as_deref())?;
            }
            TableAction::ToggleExpanded { item_id, column_key } => {
                self.expansion_mut()?.toggle_cell(item_id, column_key.as_deref())?;
            }
            TableAction::CollapseAll => {
                self.expansion_mut()?.collapse_all();
            }
            TableAction::SelectItem { item_id, is_selecting } => {
                self.require(self.is_selection_enabled(), Feature::Selection)?;
                self.selection_state.select(item_id, is_selecting);
            }
            TableAction::ToggleSelection(item_id) => {
                self.require(self.is_selection_enabled(), Feature::Selection)?;
                self.selection_state.toggle(item_id);
            }
            TableAction::SelectNone => {
                self.require(self.is_selection_enabled(), Feature::Selection)?;
                self.selection_state.select_none();
            }
            TableAction::SelectPage => {
                self.require(self.is_selection_enabled(), Feature::Selection)?;
                let page_ids = self.current_page_ids();
                self.selection_state.select_page(page_ids);
            }
            TableAction::SelectAll => {
                self.require(self.is_selection_enabled(), Feature::Selection)?;
                let total = self.selection_total();
                self.selection_state.select_all(total)?;
            }
            TableAction::SetActiveItem(item_id) => {
                self.require(self.is_active_item_enabled(), Feature::ActiveItem)?;
                self.active_item_state.set_active(item_id);
            }
            TableAction::ClearActiveItem => {
                self.require(self.is_active_item_enabled(), Feature::ActiveItem)?;
                self.active_item_state.clear();
            }
        }
        Ok(())
    }

    /// Maps a key message through the keymap and applies the matching
    /// action. Returns the applied action, or `None` if no binding matched.
    pub fn update_key(&mut self, msg: &Msg) -> Result<Option<TableAction>> {
        let Some(key_msg) = msg.downcast_ref::<KeyMsg>() else {
            return Ok(None);
        };
        let Some(action) = self.keymap.action_for(key_msg) else {
            return Ok(None);
        };
        self.update(action.clone())?;
        Ok(Some(action))
    }

    /// Runs the post-mutation invariants.
    fn refresh(&mut self) {
        if self.is_pagination_enabled() {
            let total = self.effective_total();
            self.pagination_state
                .correct_page(total, self.is_loading || !self.is_total_known());
        }
        if self.is_active_item_enabled() {
            let loaded: Vec<ItemId> = self.data.items().iter().map(|item| self.definition.item_id(item)).collect();
            self.active_item_state
                .clear_if_missing(loaded.iter().map(ItemId::as_str), self.is_loading);
        }
    }

    fn filtered(&self) -> Vec<&T> {
        let items = self.data.items();
        if self.config.filter.is_local() {
            filter_items(items, self.definition.filter_categories(), self.filter_state.filter_values())
        } else {
            items.iter().collect()
        }
    }

    /// Rows across all pages, the count pagination is measured against.
    fn effective_total(&self) -> usize {
        if self.config.pagination.is_remote() {
            self.data.total()
        } else {
            self.filtered().len()
        }
    }

    /// Whether the row total is known. A remote table learns it from its
    /// first [`DataSource::Remote`] result.
    pub fn is_total_known(&self) -> bool {
        !self.config.pagination.is_remote() || matches!(self.data, DataSource::Remote(_))
    }

    /// Total for "select all": unknown while a fetch is in flight or before
    /// the first remote result.
    fn selection_total(&self) -> Option<usize> {
        if self.is_loading || !self.is_total_known() {
            None
        } else {
            Some(self.effective_total())
        }
    }

    /// Bulk-select tri-state and number of selected rows.
    ///
    /// When every row is loaded (pagination is not remote) both are taken
    /// over the rows that pass the filter, so a selection hidden by a
    /// narrower filter does not count. Remote tables count against the
    /// server total.
    pub fn selection_summary(&self) -> (BulkSelectState, usize) {
        let view = self.derived();
        if self.config.pagination.is_remote() {
            let total = view.total_item_count;
            return (
                self.selection_state.bulk_select_state(total),
                self.selection_state.selected_count(total),
            );
        }
        let visible: Vec<ItemId> = view
            .filtered_items
            .iter()
            .map(|item| self.definition.item_id(item))
            .collect();
        (
            self.selection_state.bulk_select_state_among(&visible),
            self.selection_state.selected_count_among(&visible),
        )
    }

    fn current_page_ids(&self) -> Vec<ItemId> {
        self.derived()
            .current_page_items
            .into_iter()
            .map(|item| self.definition.item_id(item))
            .collect()
    }

    /// Computes the visible rows from the current state.
    ///
    /// Local features are applied in order filter, sort, paginate; remote
    /// features are assumed to be applied by the server already.
    pub fn derived(&self) -> DerivedView<'_, T> {
        let filtered_items = self.filtered();

        let sorted_items = if self.config.sort.is_local() {
            sort_items(
                filtered_items.iter().copied(),
                |item: &T, key: &str| self.definition.sort_value(item, key),
                self.sort_state.active_sort(),
            )
        } else {
            filtered_items.clone()
        };

        let total_item_count = self.effective_total();
        let (current_page_items, page_count) = match self.config.pagination {
            FeatureMode::Disabled => (sorted_items.clone(), 1),
            FeatureMode::Local => (
                paginate_items(&sorted_items, &self.pagination_state).to_vec(),
                self.pagination_state.page_count(total_item_count),
            ),
            FeatureMode::Remote => (
                sorted_items.clone(),
                self.pagination_state.page_count(total_item_count),
            ),
        };

        DerivedView {
            filtered_items,
            sorted_items,
            current_page_items,
            total_item_count,
            page_count,
        }
    }

    /// Request parameters for the hub, covering the remote features.
    pub fn hub_request_params(&self) -> Result<HubRequestParams> {
        get_hub_request_params(&HubParamsInput {
            filter_state: self.config.filter.is_remote().then_some(&self.filter_state),
            filter_categories: self.definition.filter_categories(),
            sort_state: self.config.sort.is_remote().then_some(&self.sort_state),
            pagination_state: self.config.pagination.is_remote().then_some(&self.pagination_state),
            hub_sort_field_keys: self.definition.hub_sort_fields(),
        })
    }

    /// [`hub_request_params`](Self::hub_request_params) encoded as query
    /// parameters.
    pub fn hub_query(&self) -> Result<HubQuery> {
        Ok(serialize_request_params_for_hub(&self.hub_request_params()?))
    }

    /// The persistable part of the state. Disabled features are left out.
    pub fn snapshot(&self) -> TableStateSnapshot {
        let mut snapshot = TableStateSnapshot::default();
        if self.is_filter_enabled() {
            snapshot.filter_values = self.filter_state.filter_values().clone();
        }
        if self.is_sort_enabled() {
            snapshot.active_sort = self.sort_state.active_sort().cloned();
        }
        if self.is_pagination_enabled() {
            snapshot.page_number = Some(self.pagination_state.page_number());
            snapshot.items_per_page = Some(self.pagination_state.items_per_page());
        }
        if let Some(expansion) = &self.expansion_state {
            snapshot.expanded_cells = expansion.expanded_cells().clone();
        }
        if self.is_active_item_enabled() {
            snapshot.active_item = self.active_item_state.active_id().cloned();
        }
        snapshot
    }

    /// Restores a snapshot. Parts for disabled features are ignored, as is
    /// a sort on a column that is not sortable.
    pub fn restore(&mut self, snapshot: TableStateSnapshot) -> Result<()> {
        let TableStateSnapshot {
            filter_values,
            active_sort,
            page_number,
            items_per_page,
            expanded_cells,
            active_item,
        } = snapshot;

        let mut pagination_state = self.pagination_state;
        if self.is_pagination_enabled() {
            if let Some(items_per_page) = items_per_page {
                pagination_state.set_items_per_page(items_per_page)?;
            }
            if let Some(page_number) = page_number {
                pagination_state.set_page_number(page_number);
            }
        }

        self.pagination_state = pagination_state;
        if self.is_filter_enabled() {
            self.filter_state = FilterState::new().with_filter_values(filter_values);
        }
        if self.is_sort_enabled() {
            if let Err(err) = self.sort_state.set_active_sort(active_sort) {
                log::warn!("{}: not restoring sort: {err}", self.config.table_name);
            }
        }
        if let Some(expansion) = self.expansion_state.take() {
            self.expansion_state = Some(ExpansionState::new(expansion.variant()).with_expanded_cells(expanded_cells));
        }
        if self.is_active_item_enabled() {
            self.active_item_state = ActiveItemState::new().with_active_id(active_item);
        }
        self.refresh();
        Ok(())
    }

    /// The snapshot as URL query parameters, using the configured prefix.
    pub fn to_url_params(&self) -> Result<Vec<(String, String)>> {
        self.snapshot()
            .to_url_params(self.config.persistence_key_prefix.as_deref())
    }

    /// Restores state from URL query parameters, using the configured prefix.
    pub fn restore_from_url_params<I, K, V>(&mut self, params: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let snapshot = TableStateSnapshot::from_url_params(self.config.persistence_key_prefix.as_deref(), params)?;
        self.restore(snapshot)
    }
}
