//! Render props: what each header, row and cell of the table should show.

use super::{FeatureMode, TableControls};
use crate::error::{Result, TableError};
use crate::expansion::ExpansionVariant;
use crate::selection::BulkSelectState;
use crate::sort::SortDirection;
use crate::value::ItemId;

/// Props of one header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCellProps<'a> {
    /// Column key.
    pub column_key: &'a str,
    /// Header text.
    pub title: &'a str,
    /// Fixed width, if any.
    pub width: Option<usize>,
    /// Whether clicking the header toggles sorting.
    pub is_sortable: bool,
    /// Direction when this column is the active sort.
    pub sort_direction: Option<SortDirection>,
}

/// Props of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowProps {
    /// Row identity.
    pub item_id: ItemId,
    /// Position on the current page.
    pub row_index: usize,
    /// Whether the row is selected.
    pub is_selected: bool,
    /// Whether the row is the active item.
    pub is_active: bool,
    /// Whether the row (or one of its cells) is expanded.
    pub is_expanded: bool,
    /// Whether clicking the row opens its detail view.
    pub is_clickable: bool,
}

/// Compound expansion toggle of a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundExpandProps {
    /// Whether this cell's content is showing.
    pub is_expanded: bool,
    /// Position of the row on the current page.
    pub row_index: usize,
    /// Position of the column.
    pub column_index: usize,
}

/// Props of one data cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellProps<'a> {
    /// Column key.
    pub column_key: &'a str,
    /// Rendered text.
    pub text: String,
    /// Set when the cell toggles compound expansion.
    pub compound_expand: Option<CompoundExpandProps>,
}

/// Toggle in front of a single-expansion row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleExpandProps {
    /// Position of the row on the current page.
    pub row_index: usize,
    /// Whether the row is expanded.
    pub is_expanded: bool,
}

/// Container of expanded content below a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedContentProps {
    /// Element id, unique per table, row and column.
    pub id: String,
    /// Columns the content spans; every rendered column.
    pub col_span: usize,
    /// Expanded column of a compound row.
    pub column_key: Option<String>,
}

/// One active filter value, shown as a removable chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    /// Category key.
    pub category_key: String,
    /// Category title.
    pub category_title: String,
    /// The value.
    pub value: String,
}

/// Bulk-select checkbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSelectProps {
    /// Checkbox tri-state.
    pub state: BulkSelectState,
    /// Rows selected across all pages.
    pub selected_count: usize,
    /// Rows on the current page.
    pub page_item_count: usize,
    /// Rows across all pages.
    pub total_item_count: usize,
}

/// Pagination control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationProps {
    /// 1-indexed current page.
    pub page_number: usize,
    /// Page size.
    pub items_per_page: usize,
    /// Rows across all pages.
    pub total_item_count: usize,
    /// Number of pages.
    pub page_count: usize,
    /// Whether there is no previous page.
    pub is_first_page: bool,
    /// Whether there is no next page.
    pub is_last_page: bool,
}

/// Toolbar above the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarProps {
    /// Active filter values.
    pub filter_chips: Vec<FilterChip>,
    /// Bulk-select checkbox, when selection is enabled.
    pub bulk_select: Option<BulkSelectProps>,
    /// Pagination control, when pagination is enabled.
    pub pagination: Option<PaginationProps>,
}

impl<T> TableControls<T> {
    pub(super) fn single_expansion(&self) -> bool {
        self.expansion_state
            .as_ref()
            .is_some_and(|e| e.variant() == ExpansionVariant::Single)
    }

    /// Number of rendered columns: data columns plus the selection and
    /// single-expansion toggle columns.
    pub fn num_rendered_columns(&self) -> usize {
        self.definition.columns().len()
            + usize::from(self.is_selection_enabled())
            + usize::from(self.single_expansion())
    }

    /// Props of every data column header.
    pub fn header_cells(&self) -> Vec<HeaderCellProps<'_>> {
        let sort_enabled = self.is_sort_enabled();
        self.definition
            .columns()
            .iter()
            .map(|column| {
                let is_sortable = sort_enabled && self.sort_state.is_sortable(&column.key);
                HeaderCellProps {
                    column_key: &column.key,
                    title: &column.title,
                    width: column.width,
                    is_sortable,
                    sort_direction: if is_sortable {
                        self.sort_state.direction_for(&column.key)
                    } else {
                        None
                    },
                }
            })
            .collect()
    }

    /// Props of a row on the current page.
    pub fn row_props(&self, item: &T, row_index: usize) -> RowProps {
        let item_id = self.definition.item_id(item);
        let id = item_id.as_str();
        RowProps {
            is_selected: self.is_selection_enabled() && self.selection_state.is_selected(id),
            is_active: self.is_active_item_enabled() && self.active_item_state.is_active(id),
            is_expanded: self
                .expansion_state
                .as_ref()
                .is_some_and(|e| e.is_cell_expanded(id, None)),
            is_clickable: self.is_active_item_enabled(),
            row_index,
            item_id,
        }
    }

    /// Props of one data cell.
    pub fn cell_props<'a>(&'a self, item: &T, row_index: usize, column_key: &str) -> Result<CellProps<'a>> {
        let (column_index, column) = self
            .definition
            .columns()
            .iter()
            .enumerate()
            .find(|(_, c)| c.key == column_key)
            .ok_or_else(|| TableError::UnknownColumn(column_key.to_string()))?;

        let compound_expand = match &self.expansion_state {
            Some(expansion) if expansion.variant() == ExpansionVariant::Compound && column.expandable => {
                let item_id = self.definition.item_id(item);
                Some(CompoundExpandProps {
                    is_expanded: expansion.is_cell_expanded(item_id.as_str(), Some(column.key.as_str())),
                    row_index,
                    column_index,
                })
            }
            _ => None,
        };

        Ok(CellProps {
            column_key: &column.key,
            text: column.cell_text(item),
            compound_expand,
        })
    }

    /// Toggle of a single-expansion row; `None` unless the table uses
    /// single expansion.
    pub fn single_expand_props(&self, item: &T, row_index: usize) -> Option<SingleExpandProps> {
        let expansion = self.expansion_state.as_ref()?;
        if expansion.variant() != ExpansionVariant::Single {
            return None;
        }
        let item_id = self.definition.item_id(item);
        Some(SingleExpandProps {
            row_index,
            is_expanded: expansion.is_cell_expanded(item_id.as_str(), None),
        })
    }

    /// Container of the expanded content below a row; `None` when the row
    /// is not expanded.
    pub fn expanded_content_props(&self, item: &T) -> Option<ExpandedContentProps> {
        let expansion = self.expansion_state.as_ref()?;
        let item_id = self.definition.item_id(item);
        if !expansion.is_cell_expanded(item_id.as_str(), None) {
            return None;
        }
        let column_key = expansion.expanded_column(item_id.as_str()).map(str::to_string);
        let id = match &column_key {
            Some(column) => format!("expanded-{}-{}-{}", self.config.table_name, item_id, column),
            None => format!("expanded-{}-{}", self.config.table_name, item_id),
        };
        Some(ExpandedContentProps {
            id,
            col_span: self.num_rendered_columns(),
            column_key,
        })
    }

    /// Active filter chips in category order.
    pub fn filter_chips(&self) -> Vec<FilterChip> {
        if !self.is_filter_enabled() {
            return Vec::new();
        }
        self.definition
            .filter_categories()
            .iter()
            .flat_map(|category| {
                self.filter_state
                    .values_for(&category.key)
                    .iter()
                    .map(move |value| FilterChip {
                        category_key: category.key.clone(),
                        category_title: category.title.clone(),
                        value: value.clone(),
                    })
            })
            .collect()
    }

    /// Props of the toolbar: filter chips, bulk select and pagination.
    pub fn toolbar_props(&self) -> ToolbarProps {
        let view = self.derived();
        let total = view.total_item_count;

        let bulk_select = self.is_selection_enabled().then(|| {
            let (state, selected_count) = self.selection_summary();
            BulkSelectProps {
                state,
                selected_count,
                page_item_count: view.current_page_items.len(),
                total_item_count: total,
            }
        });

        let pagination = match self.config.pagination {
            FeatureMode::Disabled => None,
            FeatureMode::Local | FeatureMode::Remote => Some(PaginationProps {
                page_number: self.pagination_state.page_number(),
                items_per_page: self.pagination_state.items_per_page(),
                total_item_count: total,
                page_count: view.page_count,
                is_first_page: self.pagination_state.on_first_page(),
                is_last_page: self.pagination_state.on_last_page(total),
            }),
        };

        ToolbarProps {
            filter_chips: self.filter_chips(),
            bulk_select,
            pagination,
        }
    }
}
