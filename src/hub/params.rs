//! Table state to hub request parameters.

use super::{FilterOperator, HubFilter, HubFilterValue, HubPage, HubRequestParams, HubSort};
use crate::error::{Result, TableError};
use crate::filter::{FilterCategory, FilterState, FilterType, LogicOperator};
use crate::pagination::PaginationState;
use crate::sort::SortState;
use std::collections::BTreeMap;

/// Table state handed to [`get_hub_request_params`].
///
/// A `None` state means the feature is disabled or handled locally, and the
/// matching parameter is left out.
pub struct HubParamsInput<'a, T> {
    /// Active filters.
    pub filter_state: Option<&'a FilterState>,
    /// Filter categories, for server field names and filter kinds.
    pub filter_categories: &'a [FilterCategory<T>],
    /// Active sort.
    pub sort_state: Option<&'a SortState>,
    /// Current page.
    pub pagination_state: Option<&'a PaginationState>,
    /// Column key to hub sort field.
    pub hub_sort_field_keys: &'a BTreeMap<String, String>,
}

fn and_values(value: &HubFilterValue) -> Option<Vec<String>> {
    match value {
        HubFilterValue::String(s) => Some(vec![s.clone()]),
        HubFilterValue::Number(n) => Some(vec![n.to_string()]),
        HubFilterValue::List {
            operator: LogicOperator::And,
            list,
        } => Some(list.clone()),
        HubFilterValue::List {
            operator: LogicOperator::Or,
            list,
        } if list.len() == 1 => Some(list.clone()),
        HubFilterValue::List { .. } => None,
    }
}

/// Adds `new_filter`, merging it into an existing filter on the same field
/// and operator as an AND list when both can be expressed that way.
pub fn push_or_merge_and_filter(filters: &mut Vec<HubFilter>, new_filter: HubFilter) {
    let existing = filters
        .iter_mut()
        .find(|f| f.field == new_filter.field && f.operator == new_filter.operator);
    if let Some(existing) = existing {
        if let (Some(mut merged), Some(added)) = (and_values(&existing.value), and_values(&new_filter.value)) {
            merged.extend(added);
            existing.value = HubFilterValue::List {
                operator: LogicOperator::And,
                list: merged,
            };
            return;
        }
    }
    filters.push(new_filter);
}

fn category_filter<T>(category: &FilterCategory<T>, values: &[String]) -> Option<HubFilter> {
    let values = category.server_values(values);
    let first = values.first()?.clone();
    let field = category.server_field().to_string();
    let filter = match category.filter_type {
        FilterType::Search => HubFilter::new(field, FilterOperator::Like, first),
        FilterType::Select => HubFilter::new(field, FilterOperator::Equal, first),
        FilterType::NumSearch => {
            let value = match first.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => HubFilterValue::Number(number),
                _ => HubFilterValue::String(first),
            };
            HubFilter::new(field, FilterOperator::Equal, value)
        }
        FilterType::MultiSelect => HubFilter::new(
            field,
            FilterOperator::Equal,
            HubFilterValue::list(category.logic_operator, values),
        ),
    };
    Some(filter)
}

/// Builds hub request parameters from table state.
///
/// - filters: one per active category, using the category's server field;
///   search categories use `~`, select and number categories `=`, and
///   multi-select categories `=` with a value list. Empty results leave
///   `filters` out.
/// - sort: left out when no sort is active; the column key is translated
///   through `hub_sort_field_keys`.
/// - page: included whenever a pagination state is given.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use table_controls::filter::{FilterCategory, FilterState};
/// use table_controls::hub::{get_hub_request_params, HubParamsInput};
/// use table_controls::pagination::PaginationState;
/// use table_controls::sort::SortState;
///
/// let categories = vec![FilterCategory::<()>::new("name", "Name")];
/// let mut filter = FilterState::new();
/// filter.set_filter_values("name", vec!["app".into()]);
///
/// let mut sort = SortState::new(["name"]);
/// sort.toggle_column("name").unwrap();
///
/// let mut fields = BTreeMap::new();
/// fields.insert("name".to_string(), "name".to_string());
///
/// let pagination = PaginationState::new();
/// let params = get_hub_request_params(&HubParamsInput {
///     filter_state: Some(&filter),
///     filter_categories: &categories,
///     sort_state: Some(&sort),
///     pagination_state: Some(&pagination),
///     hub_sort_field_keys: &fields,
/// })
/// .unwrap();
///
/// assert_eq!(params.filters.unwrap().len(), 1);
/// assert_eq!(params.sort.unwrap().field, "name");
/// assert_eq!(params.page.unwrap().page_number, 1);
/// ```
pub fn get_hub_request_params<T>(input: &HubParamsInput<'_, T>) -> Result<HubRequestParams> {
    let mut params = HubRequestParams::default();

    if let Some(filter_state) = input.filter_state {
        let mut filters = Vec::new();
        for (key, values) in filter_state.filter_values() {
            let Some(category) = input.filter_categories.iter().find(|c| &c.key == key) else {
                log::trace!("no filter category for `{key}`, leaving it out of the request");
                continue;
            };
            if let Some(filter) = category_filter(category, values) {
                push_or_merge_and_filter(&mut filters, filter);
            }
        }
        if !filters.is_empty() {
            params.filters = Some(filters);
        }
    }

    if let Some(active_sort) = input.sort_state.and_then(SortState::active_sort) {
        let field = input
            .hub_sort_field_keys
            .get(&active_sort.column_key)
            .ok_or_else(|| TableError::UnmappedSortField(active_sort.column_key.clone()))?;
        params.sort = Some(HubSort {
            field: field.clone(),
            direction: active_sort.direction,
        });
    }

    if let Some(pagination) = input.pagination_state {
        params.page = Some(HubPage {
            page_number: pagination.page_number(),
            items_per_page: pagination.items_per_page(),
        });
    }

    Ok(params)
}
