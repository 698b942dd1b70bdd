//! Configuration, table definition and actions for [`TableControls`](super::TableControls).

use crate::expansion::ExpansionVariant;
use crate::filter::FilterCategory;
use crate::hub::HubPaginatedResult;
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::sort::ActiveSort;
use crate::value::{ItemId, SortValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a feature's derivation happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureMode {
    /// The feature is off.
    #[default]
    Disabled,
    /// Derived in memory from the loaded items.
    Local,
    /// Sent to the hub as request parameters; the loaded items are already
    /// derived.
    Remote,
}

impl FeatureMode {
    /// Returns true unless disabled.
    pub fn is_enabled(self) -> bool {
        self != FeatureMode::Disabled
    }

    /// Returns true for local derivation.
    pub fn is_local(self) -> bool {
        self == FeatureMode::Local
    }

    /// Returns true for server-side derivation.
    pub fn is_remote(self) -> bool {
        self == FeatureMode::Remote
    }
}

/// Feature switches and initial values of one table.
///
/// Deserializes from JSON with every field optional:
///
/// ```rust
/// use table_controls::controls::{FeatureMode, TableControlsConfig};
/// use table_controls::expansion::ExpansionVariant;
///
/// let config: TableControlsConfig = serde_json::from_str(r#"{
///     "tableName": "applications",
///     "filter": "remote",
///     "sort": "remote",
///     "pagination": "remote",
///     "expansion": "compound",
///     "selection": true,
///     "initialItemsPerPage": 20
/// }"#).unwrap();
///
/// assert_eq!(config.pagination, FeatureMode::Remote);
/// assert_eq!(config.expansion, Some(ExpansionVariant::Compound));
/// assert!(!config.active_item);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableControlsConfig {
    /// Name used in log lines and element ids.
    pub table_name: String,
    /// Filtering mode.
    pub filter: FeatureMode,
    /// Sorting mode.
    pub sort: FeatureMode,
    /// Pagination mode.
    pub pagination: FeatureMode,
    /// Expansion variant, `None` when rows do not expand.
    pub expansion: Option<ExpansionVariant>,
    /// Row selection.
    pub selection: bool,
    /// Active item tracking.
    pub active_item: bool,
    /// Page size the table starts with.
    pub initial_items_per_page: usize,
    /// Sort the table starts with.
    pub initial_sort: Option<ActiveSort>,
    /// Prefix of persisted URL parameters.
    pub persistence_key_prefix: Option<String>,
}

impl Default for TableControlsConfig {
    fn default() -> Self {
        Self {
            table_name: "table".to_string(),
            filter: FeatureMode::Disabled,
            sort: FeatureMode::Disabled,
            pagination: FeatureMode::Disabled,
            expansion: None,
            selection: false,
            active_item: false,
            initial_items_per_page: DEFAULT_ITEMS_PER_PAGE,
            initial_sort: None,
            persistence_key_prefix: None,
        }
    }
}

impl TableControlsConfig {
    /// Creates a config with every feature disabled.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Filters, sorts and paginates in memory.
    pub fn local(table_name: impl Into<String>) -> Self {
        Self::new(table_name)
            .with_filter(FeatureMode::Local)
            .with_sort(FeatureMode::Local)
            .with_pagination(FeatureMode::Local)
    }

    /// Filters, sorts and paginates on the hub.
    pub fn remote(table_name: impl Into<String>) -> Self {
        Self::new(table_name)
            .with_filter(FeatureMode::Remote)
            .with_sort(FeatureMode::Remote)
            .with_pagination(FeatureMode::Remote)
    }

    /// Sets the filtering mode.
    pub fn with_filter(mut self, mode: FeatureMode) -> Self {
        self.filter = mode;
        self
    }

    /// Sets the sorting mode.
    pub fn with_sort(mut self, mode: FeatureMode) -> Self {
        self.sort = mode;
        self
    }

    /// Sets the pagination mode.
    pub fn with_pagination(mut self, mode: FeatureMode) -> Self {
        self.pagination = mode;
        self
    }

    /// Enables row expansion.
    pub fn with_expansion(mut self, variant: ExpansionVariant) -> Self {
        self.expansion = Some(variant);
        self
    }

    /// Enables or disables row selection.
    pub fn with_selection(mut self, enabled: bool) -> Self {
        self.selection = enabled;
        self
    }

    /// Enables or disables active item tracking.
    pub fn with_active_item(mut self, enabled: bool) -> Self {
        self.active_item = enabled;
        self
    }

    /// Sets the initial page size.
    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.initial_items_per_page = items_per_page;
        self
    }

    /// Sets the initial sort.
    pub fn with_initial_sort(mut self, sort: ActiveSort) -> Self {
        self.initial_sort = Some(sort);
        self
    }

    /// Sets the prefix of persisted URL parameters.
    pub fn with_persistence_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.persistence_key_prefix = Some(prefix.into());
        self
    }
}

/// Renders one cell of a column.
pub type CellFn<T> = Box<dyn Fn(&T) -> String>;

/// One data column.
pub struct Column<T> {
    /// Column key, used by sort, expansion and hub field mapping.
    pub key: String,
    /// Header text.
    pub title: String,
    /// Fixed width in terminal cells. `None` fits the content.
    pub width: Option<usize>,
    /// Whether the header toggles sorting.
    pub sortable: bool,
    /// Whether the cell toggles compound expansion.
    pub expandable: bool,
    cell: Option<CellFn<T>>,
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .field("expandable", &self.expandable)
            .finish_non_exhaustive()
    }
}

impl<T> Column<T> {
    /// Creates a plain column.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            width: None,
            sortable: false,
            expandable: false,
            cell: None,
        }
    }

    /// Sets a fixed width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Makes the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Makes the cell a compound expansion toggle.
    pub fn expandable(mut self) -> Self {
        self.expandable = true;
        self
    }

    /// Sets the cell renderer.
    pub fn with_cell<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + 'static,
    {
        self.cell = Some(Box::new(f));
        self
    }

    /// Cell text for `item`; empty without a renderer.
    pub fn cell_text(&self, item: &T) -> String {
        self.cell.as_ref().map(|f| f(item)).unwrap_or_default()
    }
}

type IdFn<T> = Box<dyn Fn(&T) -> ItemId>;
type SortValueFn<T> = Box<dyn Fn(&T, &str) -> Option<SortValue>>;

/// Static description of a table: row identity, columns, filter categories
/// and sort accessors.
pub struct TableDefinition<T> {
    id_of: IdFn<T>,
    columns: Vec<Column<T>>,
    filter_categories: Vec<FilterCategory<T>>,
    sort_value: Option<SortValueFn<T>>,
    hub_sort_fields: BTreeMap<String, String>,
}

impl<T> fmt::Debug for TableDefinition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDefinition")
            .field("columns", &self.columns)
            .field("filter_categories", &self.filter_categories)
            .field("hub_sort_fields", &self.hub_sort_fields)
            .finish_non_exhaustive()
    }
}

impl<T> TableDefinition<T> {
    /// Creates a definition with the row id accessor.
    pub fn new<F, I>(id_of: F) -> Self
    where
        F: Fn(&T) -> I + 'static,
        I: Into<ItemId>,
    {
        Self {
            id_of: Box::new(move |item| id_of(item).into()),
            columns: Vec::new(),
            filter_categories: Vec::new(),
            sort_value: None,
            hub_sort_fields: BTreeMap::new(),
        }
    }

    /// Appends a column.
    pub fn with_column(mut self, column: Column<T>) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a filter category.
    pub fn with_filter_category(mut self, category: FilterCategory<T>) -> Self {
        self.filter_categories.push(category);
        self
    }

    /// Sets the sort value accessor, called with an item and a column key.
    pub fn with_sort_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&T, &str) -> Option<SortValue> + 'static,
    {
        self.sort_value = Some(Box::new(f));
        self
    }

    /// Maps a column key to the hub field it sorts by.
    pub fn with_hub_sort_field(mut self, column_key: impl Into<String>, field: impl Into<String>) -> Self {
        self.hub_sort_fields.insert(column_key.into(), field.into());
        self
    }

    /// The data columns.
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Looks up a column by key.
    pub fn column(&self, key: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// The filter categories.
    pub fn filter_categories(&self) -> &[FilterCategory<T>] {
        &self.filter_categories
    }

    /// Column key to hub sort field.
    pub fn hub_sort_fields(&self) -> &BTreeMap<String, String> {
        &self.hub_sort_fields
    }

    /// Identity of `item`.
    pub fn item_id(&self, item: &T) -> ItemId {
        (self.id_of)(item)
    }

    /// Sort value of `item` for `column_key`.
    pub fn sort_value(&self, item: &T, column_key: &str) -> Option<SortValue> {
        self.sort_value.as_ref().and_then(|f| f(item, column_key))
    }
}

/// Rows handed to the table by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource<T> {
    /// Every row, derived in memory.
    Local(Vec<T>),
    /// One server-derived page and the server-side total.
    Remote(HubPaginatedResult<T>),
}

impl<T> Default for DataSource<T> {
    fn default() -> Self {
        DataSource::Local(Vec::new())
    }
}

impl<T> DataSource<T> {
    /// The loaded rows.
    pub fn items(&self) -> &[T] {
        match self {
            DataSource::Local(items) => items,
            DataSource::Remote(result) => &result.data,
        }
    }

    /// Total rows: the loaded count locally, the server total remotely.
    pub fn total(&self) -> usize {
        match self {
            DataSource::Local(items) => items.len(),
            DataSource::Remote(result) => result.total,
        }
    }
}

/// A state change dispatched through
/// [`TableControls::update`](super::TableControls::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    /// Replaces the values of one filter category.
    SetFilterValues {
        /// Category key.
        key: String,
        /// New values; empty clears the category.
        values: Vec<String>,
    },
    /// Removes one value (a filter chip) from a category.
    RemoveFilterValue {
        /// Category key.
        key: String,
        /// Value to remove.
        value: String,
    },
    /// Clears every filter.
    ClearFilters,
    /// Sorts by a column, or flips its direction.
    ToggleSort(String),
    /// Replaces the active sort.
    SetSort(Option<ActiveSort>),
    /// Jumps to a page.
    SetPage(usize),
    /// Moves to the next page.
    NextPage,
    /// Moves to the previous page.
    PrevPage,
    /// Changes the page size.
    SetItemsPerPage(usize),
    /// Expands or collapses a row or cell.
    SetExpanded {
        /// Row id.
        item_id: ItemId,
        /// Target state.
        is_expanding: bool,
        /// Column of a compound cell.
        column_key: Option<String>,
    },
    /// Flips a row or cell.
    ToggleExpanded {
        /// Row id.
        item_id: ItemId,
        /// Column of a compound cell.
        column_key: Option<String>,
    },
    /// Collapses every row.
    CollapseAll,
    /// Selects or deselects a row.
    SelectItem {
        /// Row id.
        item_id: ItemId,
        /// Target state.
        is_selecting: bool,
    },
    /// Flips a row's selection.
    ToggleSelection(ItemId),
    /// Clears the selection.
    SelectNone,
    /// Selects every row of the current page.
    SelectPage,
    /// Selects every row of the data set.
    SelectAll,
    /// Opens a row's detail view.
    SetActiveItem(ItemId),
    /// Closes the detail view.
    ClearActiveItem,
}
