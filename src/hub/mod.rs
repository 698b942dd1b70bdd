//! Request parameters for a remote, server-paginated hub API.
//!
//! When a table is backed by the hub, filtering, sorting and paging happen
//! on the server. This module turns table state into [`HubRequestParams`]
//! ([`get_hub_request_params`]) and encodes those parameters as the query
//! string the hub expects ([`serialize_request_params_for_hub`]):
//!
//! | Parameter | Form | Example |
//! |-----------|------|---------|
//! | `filter` | comma-joined `field<op>value` terms | `name~"app",tag=("a"\|"b")` |
//! | `sort` | `direction:field` | `asc:name` |
//! | `limit` / `offset` | page size and first row | `10` / `20` |
//!
//! Decoding the same format back into parameters is
//! [`deserialize_request_params_from_hub`].

mod params;
mod wire;

pub use params::{get_hub_request_params, push_or_merge_and_filter, HubParamsInput};
pub use wire::{
    deserialize_request_params_from_hub, parse_filters, serialize_filter_for_hub,
    serialize_request_params_for_hub, wrap_in_quotes_and_escape, HubQuery,
};

use crate::filter::LogicOperator;
use crate::sort::SortDirection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a hub filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// `=`
    #[serde(rename = "=")]
    Equal,
    /// `!=`
    #[serde(rename = "!=")]
    NotEqual,
    /// `~` (substring / like)
    #[serde(rename = "~")]
    Like,
    /// `>`
    #[serde(rename = ">")]
    GreaterThan,
    /// `>=`
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    /// `<`
    #[serde(rename = "<")]
    LessThan,
    /// `<=`
    #[serde(rename = "<=")]
    LessThanOrEqual,
}

impl FilterOperator {
    /// Two-character operators come first so prefix matching picks the
    /// longest operator.
    pub(crate) const ALL: [FilterOperator; 7] = [
        FilterOperator::NotEqual,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::LessThanOrEqual,
        FilterOperator::Equal,
        FilterOperator::Like,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
    ];

    /// Wire form of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "=",
            FilterOperator::NotEqual => "!=",
            FilterOperator::Like => "~",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterThanOrEqual => ">=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessThanOrEqual => "<=",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a hub filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HubFilterValue {
    /// A single string.
    String(String),
    /// A single number.
    Number(f64),
    /// Several values joined with AND (`,`) or OR (`|`).
    List {
        /// How the values combine.
        operator: LogicOperator,
        /// The values.
        list: Vec<String>,
    },
}

impl HubFilterValue {
    /// Builds a value list.
    pub fn list<I, S>(operator: LogicOperator, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HubFilterValue::List {
            operator,
            list: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true for an empty string or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            HubFilterValue::String(s) => s.is_empty(),
            HubFilterValue::Number(_) => false,
            HubFilterValue::List { list, .. } => list.is_empty(),
        }
    }
}

impl From<&str> for HubFilterValue {
    fn from(value: &str) -> Self {
        HubFilterValue::String(value.to_string())
    }
}

impl From<String> for HubFilterValue {
    fn from(value: String) -> Self {
        HubFilterValue::String(value)
    }
}

impl From<f64> for HubFilterValue {
    fn from(value: f64) -> Self {
        HubFilterValue::Number(value)
    }
}

/// One server-side filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubFilter {
    /// Hub field name.
    pub field: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Value or value list.
    pub value: HubFilterValue,
}

impl HubFilter {
    /// Creates a filter.
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<HubFilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Server-side sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSort {
    /// Hub field name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

/// Server-side page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubPage {
    /// 1-indexed page number.
    pub page_number: usize,
    /// Rows per page.
    pub items_per_page: usize,
}

/// Filter, sort and page parameters of one hub request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubRequestParams {
    /// Filters; `None` when nothing is filtered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<HubFilter>>,
    /// Sort; `None` when no sort is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<HubSort>,
    /// Page; `None` when pagination is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<HubPage>,
}

/// One page of rows as returned by the hub, with the server-side total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubPaginatedResult<T> {
    /// Rows of the requested page.
    pub data: Vec<T>,
    /// Total number of rows matching the request's filters.
    pub total: usize,
}

impl<T> HubPaginatedResult<T> {
    /// Creates a result.
    pub fn new(data: Vec<T>, total: usize) -> Self {
        Self { data, total }
    }
}

impl<T> Default for HubPaginatedResult<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
        }
    }
}
