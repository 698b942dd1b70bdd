//! Sort state and local (in-memory) sorting.
//!
//! One column may be active at a time. Sorting is stable: items that compare
//! equal keep their input order, in both directions.

use crate::error::{Result, TableError};
use crate::value::{locale_compare, strip_whitespace, SortValue};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Wire name of the direction (`"asc"` / `"desc"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// The active sort column and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSort {
    /// Key of the sorted column.
    pub column_key: String,
    /// Direction of the sort.
    pub direction: SortDirection,
}

impl ActiveSort {
    /// Creates an active sort.
    pub fn new(column_key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_key: column_key.into(),
            direction,
        }
    }
}

/// Sort state of one table.
///
/// # Examples
///
/// ```rust
/// use table_controls::sort::{SortDirection, SortState};
///
/// let mut sort = SortState::new(["name", "risk"]);
/// assert!(sort.active_sort().is_none());
///
/// sort.toggle_column("name").unwrap();
/// assert_eq!(sort.direction_for("name"), Some(SortDirection::Asc));
///
/// sort.toggle_column("name").unwrap();
/// assert_eq!(sort.direction_for("name"), Some(SortDirection::Desc));
///
/// // Switching columns starts ascending again
/// sort.toggle_column("risk").unwrap();
/// assert_eq!(sort.direction_for("risk"), Some(SortDirection::Asc));
/// assert_eq!(sort.direction_for("name"), None);
///
/// assert!(sort.toggle_column("owner").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active_sort: Option<ActiveSort>,
    sortable_columns: Vec<String>,
}

impl SortState {
    /// Creates a state that allows sorting on the given columns.
    pub fn new<I, S>(sortable_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active_sort: None,
            sortable_columns: sortable_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the initial sort (builder pattern). Unsortable columns are ignored.
    pub fn with_initial_sort(mut self, sort: Option<ActiveSort>) -> Self {
        if let Some(sort) = sort {
            if self.is_sortable(&sort.column_key) {
                self.active_sort = Some(sort);
            } else {
                log::warn!(
                    "ignoring initial sort on non-sortable column `{}`",
                    sort.column_key
                );
            }
        }
        self
    }

    /// Returns the active sort, if any.
    pub fn active_sort(&self) -> Option<&ActiveSort> {
        self.active_sort.as_ref()
    }

    /// Returns the columns that may be sorted.
    pub fn sortable_columns(&self) -> &[String] {
        &self.sortable_columns
    }

    /// Returns true if `column_key` may be sorted.
    pub fn is_sortable(&self, column_key: &str) -> bool {
        self.sortable_columns.iter().any(|c| c == column_key)
    }

    /// Direction of `column_key` if it is the active sort column.
    pub fn direction_for(&self, column_key: &str) -> Option<SortDirection> {
        self.active_sort
            .as_ref()
            .filter(|s| s.column_key == column_key)
            .map(|s| s.direction)
    }

    /// Replaces the active sort.
    pub fn set_active_sort(&mut self, sort: Option<ActiveSort>) -> Result<()> {
        if let Some(sort) = &sort {
            if !self.is_sortable(&sort.column_key) {
                return Err(TableError::ColumnNotSortable(sort.column_key.clone()));
            }
        }
        self.active_sort = sort;
        Ok(())
    }

    /// Header-click behaviour: the active column flips direction, any other
    /// column becomes active in ascending order.
    pub fn toggle_column(&mut self, column_key: &str) -> Result<&ActiveSort> {
        if !self.is_sortable(column_key) {
            return Err(TableError::ColumnNotSortable(column_key.to_string()));
        }
        let direction = match self.direction_for(column_key) {
            Some(direction) => direction.reversed(),
            None => SortDirection::Asc,
        };
        Ok(&*self
            .active_sort
            .insert(ActiveSort::new(column_key, direction)))
    }

    /// Removes the active sort.
    pub fn clear(&mut self) {
        self.active_sort = None;
    }
}

fn subtract_cmp(a: f64, b: f64) -> Ordering {
    if a.is_nan() || b.is_nan() {
        return a.total_cmp(&b);
    }
    let diff = a - b;
    if diff < 0.0 {
        Ordering::Less
    } else if diff > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Compares two sort values for the given direction.
///
/// - two strings: whitespace removed, then [`locale_compare`]; descending
///   compares `b` against `a` instead of negating the ascending result
/// - two numbers: sign of `a - b` (descending `b - a`)
/// - anything else: booleans by value, otherwise by variant, reversed for
///   descending
pub fn compare_sort_values(a: &SortValue, b: &SortValue, direction: SortDirection) -> Ordering {
    match (a, b) {
        (SortValue::String(a), SortValue::String(b)) => {
            let a = strip_whitespace(a);
            let b = strip_whitespace(b);
            let a_sort_result = locale_compare(&a, &b);
            let b_sort_result = locale_compare(&b, &a);
            match direction {
                SortDirection::Asc => a_sort_result,
                SortDirection::Desc => b_sort_result,
            }
        }
        (SortValue::Number(a), SortValue::Number(b)) => match direction {
            SortDirection::Asc => subtract_cmp(*a, *b),
            SortDirection::Desc => subtract_cmp(*b, *a),
        },
        _ => {
            let ordering = a.fallback_cmp(b);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

fn compare_optional(a: Option<&SortValue>, b: Option<&SortValue>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_sort_values(a, b, direction),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => match direction {
            SortDirection::Asc => Ordering::Less,
            SortDirection::Desc => Ordering::Greater,
        },
        (Some(_), None) => match direction {
            SortDirection::Asc => Ordering::Greater,
            SortDirection::Desc => Ordering::Less,
        },
    }
}

/// Sorts items by the active sort column.
///
/// `get_sort_value` maps an item and a column key to the value that column
/// sorts by; items without a value sort first in ascending order. With no
/// active sort the input order is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use table_controls::sort::{sort_items, ActiveSort, SortDirection};
/// use table_controls::SortValue;
///
/// let items = vec![(1, 5), (2, 5), (3, 1)];
/// let sort = ActiveSort::new("v", SortDirection::Asc);
/// let sorted = sort_items(&items, |item: &(u32, u32), _| Some(SortValue::from(item.1)), Some(&sort));
///
/// let ids: Vec<u32> = sorted.iter().map(|item| item.0).collect();
/// assert_eq!(ids, vec![3, 1, 2]);
/// ```
pub fn sort_items<'a, T, I, F>(items: I, get_sort_value: F, active_sort: Option<&ActiveSort>) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T, &str) -> Option<SortValue>,
{
    let Some(active_sort) = active_sort else {
        return items.into_iter().collect();
    };
    let mut keyed: Vec<(Option<SortValue>, &'a T)> = items
        .into_iter()
        .map(|item| (get_sort_value(item, &active_sort.column_key), item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_optional(a.as_ref(), b.as_ref(), active_sort.direction));
    keyed.into_iter().map(|(_, item)| item).collect()
}

/// Index-addressed sort, for accessors that return every sortable value of
/// an item as a positional list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortBy {
    /// Position of the sort value in the accessor's list.
    pub index: usize,
    /// Direction of the sort.
    pub direction: SortDirection,
}

/// Sorts items by a positional sort value. See [`sort_items`].
pub fn sort_items_by_index<'a, T, I, F>(items: I, get_sort_values: F, sort_by: Option<SortBy>) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Vec<SortValue>,
{
    let Some(sort_by) = sort_by else {
        return items.into_iter().collect();
    };
    let mut keyed: Vec<(Option<SortValue>, &'a T)> = items
        .into_iter()
        .map(|item| (get_sort_values(item).into_iter().nth(sort_by.index), item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_optional(a.as_ref(), b.as_ref(), sort_by.direction));
    keyed.into_iter().map(|(_, item)| item).collect()
}
