//! Saving and restoring table state through URL query parameters.
//!
//! A [`TableStateSnapshot`] holds everything a user would expect to survive
//! a reload or a shared link: filters, sort, page, expanded rows and the
//! active item. It is written as flat query parameters, each optionally
//! prefixed with a table-specific key so several tables can share one URL:
//!
//! | Parameter | Value |
//! |-----------|-------|
//! | `filters` | JSON object of category key to values |
//! | `sortColumn` / `sortDirection` | column key, `asc` or `desc` |
//! | `pageNumber` / `itemsPerPage` | decimal numbers |
//! | `expandedCells` | JSON object of row id to `true` or a column key |
//! | `activeItem` | row id |
//!
//! With the prefix `apps`, the page number is stored as `apps:pageNumber`.

use crate::error::{Result, TableError};
use crate::expansion::ExpandedCell;
use crate::filter::FilterValues;
use crate::sort::{ActiveSort, SortDirection};
use crate::value::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FILTERS: &str = "filters";
const SORT_COLUMN: &str = "sortColumn";
const SORT_DIRECTION: &str = "sortDirection";
const PAGE_NUMBER: &str = "pageNumber";
const ITEMS_PER_PAGE: &str = "itemsPerPage";
const EXPANDED_CELLS: &str = "expandedCells";
const ACTIVE_ITEM: &str = "activeItem";

/// Persistable part of a table's state.
///
/// # Examples
///
/// ```rust
/// use table_controls::persistence::TableStateSnapshot;
/// use table_controls::sort::{ActiveSort, SortDirection};
///
/// let snapshot = TableStateSnapshot {
///     active_sort: Some(ActiveSort::new("name", SortDirection::Desc)),
///     page_number: Some(3),
///     ..Default::default()
/// };
///
/// let params = snapshot.to_url_params(Some("apps")).unwrap();
/// assert_eq!(params[0], ("apps:sortColumn".to_string(), "name".to_string()));
///
/// let restored = TableStateSnapshot::from_url_params(Some("apps"), params).unwrap();
/// assert_eq!(restored, snapshot);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStateSnapshot {
    /// Active filter values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filter_values: FilterValues,
    /// Active sort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_sort: Option<ActiveSort>,
    /// Current page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
    /// Page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<usize>,
    /// Expanded rows.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expanded_cells: BTreeMap<ItemId, ExpandedCell>,
    /// Row with an open detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_item: Option<ItemId>,
}

fn prefixed(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{key}"),
        None => key.to_string(),
    }
}

fn persistence_error(key: &str, message: impl ToString) -> TableError {
    TableError::Persistence {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn to_json<V: Serialize>(key: &str, value: &V) -> Result<String> {
    serde_json::to_string(value).map_err(|err| persistence_error(key, err))
}

fn from_json<V: for<'de> Deserialize<'de>>(key: &str, value: &str) -> Result<V> {
    serde_json::from_str(value).map_err(|err| persistence_error(key, err))
}

fn parse_page_value(key: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(0) => Err(persistence_error(key, "must be greater than zero")),
        Ok(number) => Ok(number),
        Err(err) => Err(persistence_error(key, err)),
    }
}

impl TableStateSnapshot {
    /// Returns true if nothing would be written.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Encodes the snapshot as query parameters. Empty parts are omitted.
    pub fn to_url_params(&self, prefix: Option<&str>) -> Result<Vec<(String, String)>> {
        let mut params = Vec::new();

        if !self.filter_values.is_empty() {
            params.push((prefixed(prefix, FILTERS), to_json(FILTERS, &self.filter_values)?));
        }
        if let Some(sort) = &self.active_sort {
            params.push((prefixed(prefix, SORT_COLUMN), sort.column_key.clone()));
            params.push((prefixed(prefix, SORT_DIRECTION), sort.direction.to_string()));
        }
        if let Some(page_number) = self.page_number {
            params.push((prefixed(prefix, PAGE_NUMBER), page_number.to_string()));
        }
        if let Some(items_per_page) = self.items_per_page {
            params.push((prefixed(prefix, ITEMS_PER_PAGE), items_per_page.to_string()));
        }
        if !self.expanded_cells.is_empty() {
            params.push((
                prefixed(prefix, EXPANDED_CELLS),
                to_json(EXPANDED_CELLS, &self.expanded_cells)?,
            ));
        }
        if let Some(active_item) = &self.active_item {
            params.push((prefixed(prefix, ACTIVE_ITEM), active_item.to_string()));
        }

        Ok(params)
    }

    /// Decodes a snapshot from query parameters.
    ///
    /// Parameters without the prefix, unknown keys and empty values are
    /// skipped. A sort is restored only when both its column and direction
    /// are present.
    pub fn from_url_params<I, K, V>(prefix: Option<&str>, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut snapshot = Self::default();
        let mut sort_column = None;
        let mut sort_direction = None;

        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            let key = match prefix {
                Some(prefix) => match key.strip_prefix(prefix).and_then(|k| k.strip_prefix(':')) {
                    Some(key) => key,
                    None => continue,
                },
                None => key,
            };
            if value.is_empty() {
                continue;
            }
            match key {
                FILTERS => snapshot.filter_values = from_json(FILTERS, value)?,
                SORT_COLUMN => sort_column = Some(value.to_string()),
                SORT_DIRECTION => {
                    let direction: SortDirection = value
                        .parse()
                        .map_err(|_| persistence_error(SORT_DIRECTION, format!("`{value}` is not asc or desc")))?;
                    sort_direction = Some(direction);
                }
                PAGE_NUMBER => snapshot.page_number = Some(parse_page_value(PAGE_NUMBER, value)?),
                ITEMS_PER_PAGE => snapshot.items_per_page = Some(parse_page_value(ITEMS_PER_PAGE, value)?),
                EXPANDED_CELLS => snapshot.expanded_cells = from_json(EXPANDED_CELLS, value)?,
                ACTIVE_ITEM => snapshot.active_item = Some(ItemId::from(value)),
                other => log::trace!("ignoring unknown table parameter `{other}`"),
            }
        }

        snapshot.filter_values.retain(|_, values| !values.is_empty());
        if let (Some(column_key), Some(direction)) = (sort_column, sort_direction) {
            snapshot.active_sort = Some(ActiveSort { column_key, direction });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_snapshot() -> TableStateSnapshot {
        let mut filter_values = FilterValues::new();
        filter_values.insert("name".into(), vec!["app".into()]);
        let mut expanded_cells = BTreeMap::new();
        expanded_cells.insert(ItemId::from("7"), ExpandedCell::Column("tags".into()));
        TableStateSnapshot {
            filter_values,
            active_sort: Some(ActiveSort::new("name", SortDirection::Asc)),
            page_number: Some(2),
            items_per_page: Some(20),
            expanded_cells,
            active_item: Some(ItemId::from("7")),
        }
    }

    #[test]
    fn test_url_param_keys_and_values() {
        let params = full_snapshot().to_url_params(None).unwrap();
        assert_eq!(
            params,
            vec![
                ("filters".to_string(), r#"{"name":["app"]}"#.to_string()),
                ("sortColumn".to_string(), "name".to_string()),
                ("sortDirection".to_string(), "asc".to_string()),
                ("pageNumber".to_string(), "2".to_string()),
                ("itemsPerPage".to_string(), "20".to_string()),
                ("expandedCells".to_string(), r#"{"7":"tags"}"#.to_string()),
                ("activeItem".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_snapshot_writes_nothing() {
        let snapshot = TableStateSnapshot::default();
        assert!(snapshot.is_empty());
        assert!(snapshot.to_url_params(Some("t")).unwrap().is_empty());
    }

    #[test]
    fn test_prefix_isolates_tables() {
        let params = vec![
            ("apps:pageNumber", "3"),
            ("reviews:pageNumber", "9"),
            ("pageNumber", "5"),
        ];
        let apps = TableStateSnapshot::from_url_params(Some("apps"), params.clone()).unwrap();
        assert_eq!(apps.page_number, Some(3));
        let unprefixed = TableStateSnapshot::from_url_params(None, params).unwrap();
        assert_eq!(unprefixed.page_number, Some(5));
    }

    #[test]
    fn test_round_trip_with_prefix() {
        let snapshot = full_snapshot();
        let params = snapshot.to_url_params(Some("apps")).unwrap();
        assert!(params.iter().all(|(k, _)| k.starts_with("apps:")));
        assert_eq!(TableStateSnapshot::from_url_params(Some("apps"), params).unwrap(), snapshot);
    }

    #[test]
    fn test_sort_needs_column_and_direction() {
        let snapshot = TableStateSnapshot::from_url_params(None, [("sortColumn", "name")]).unwrap();
        assert_eq!(snapshot.active_sort, None);
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let snapshot =
            TableStateSnapshot::from_url_params(None, [("pageNumber", ""), ("activeItem", "")]).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_malformed_values_are_errors() {
        let err = TableStateSnapshot::from_url_params(None, [("pageNumber", "two")]).unwrap_err();
        assert!(matches!(err, TableError::Persistence { ref key, .. } if key == "pageNumber"));

        let err = TableStateSnapshot::from_url_params(None, [("itemsPerPage", "0")]).unwrap_err();
        assert!(matches!(err, TableError::Persistence { ref key, .. } if key == "itemsPerPage"));

        let err = TableStateSnapshot::from_url_params(None, [("filters", "{not json")]).unwrap_err();
        assert!(matches!(err, TableError::Persistence { ref key, .. } if key == "filters"));

        let err = TableStateSnapshot::from_url_params(None, [("sortDirection", "up")]).unwrap_err();
        assert!(matches!(err, TableError::Persistence { ref key, .. } if key == "sortDirection"));
    }

    #[test]
    fn test_snapshot_serializes_as_camel_case_json() {
        let json = serde_json::to_value(full_snapshot()).unwrap();
        assert_eq!(json["pageNumber"], 2);
        assert_eq!(json["activeSort"]["columnKey"], "name");
        assert_eq!(json["expandedCells"]["7"], "tags");
    }
}
