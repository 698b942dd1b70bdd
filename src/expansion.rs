//! Row expansion state.
//!
//! A table expands rows in one of two ways, fixed for the lifetime of the
//! table:
//!
//! - [`ExpansionVariant::Single`]: a whole row opens to show detail content.
//! - [`ExpansionVariant::Compound`]: a row opens under one of its cells; at
//!   most one column per row is expanded, so expanding another column of the
//!   same row replaces the first.

use crate::error::{Result, TableError};
use crate::value::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Expansion mode of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionVariant {
    /// Whole-row expansion.
    Single,
    /// Per-cell expansion, one column per row.
    Compound,
}

/// What is expanded for one row.
///
/// Serializes as `true` for a whole row and as the column key for a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExpandedCellRepr", into = "ExpandedCellRepr")]
pub enum ExpandedCell {
    /// The whole row (single variant).
    Row,
    /// One column of the row (compound variant).
    Column(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ExpandedCellRepr {
    Row(bool),
    Column(String),
}

impl TryFrom<ExpandedCellRepr> for ExpandedCell {
    type Error = String;

    fn try_from(repr: ExpandedCellRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            ExpandedCellRepr::Row(true) => Ok(ExpandedCell::Row),
            ExpandedCellRepr::Row(false) => Err("`false` is not an expanded cell".to_string()),
            ExpandedCellRepr::Column(column) => Ok(ExpandedCell::Column(column)),
        }
    }
}

impl From<ExpandedCell> for ExpandedCellRepr {
    fn from(cell: ExpandedCell) -> Self {
        match cell {
            ExpandedCell::Row => ExpandedCellRepr::Row(true),
            ExpandedCell::Column(column) => ExpandedCellRepr::Column(column),
        }
    }
}

/// Expanded rows of one table, keyed by row identity.
///
/// # Examples
///
/// ```rust
/// use table_controls::expansion::{ExpansionState, ExpansionVariant};
///
/// let mut expansion = ExpansionState::new(ExpansionVariant::Compound);
/// expansion.set_cell_expanded("app-1", true, Some("tags")).unwrap();
/// expansion.set_cell_expanded("app-1", true, Some("risks")).unwrap();
///
/// assert!(expansion.is_cell_expanded("app-1", None));
/// assert!(expansion.is_cell_expanded("app-1", Some("risks")));
/// assert!(!expansion.is_cell_expanded("app-1", Some("tags")));
///
/// // Compound tables must name the column.
/// assert!(expansion.set_cell_expanded("app-2", true, None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionState {
    variant: ExpansionVariant,
    expanded_cells: BTreeMap<ItemId, ExpandedCell>,
}

impl ExpansionState {
    /// Creates a state with nothing expanded.
    pub fn new(variant: ExpansionVariant) -> Self {
        Self {
            variant,
            expanded_cells: BTreeMap::new(),
        }
    }

    /// Restores previously expanded cells (builder pattern).
    ///
    /// Entries that do not fit the variant (a whole-row entry in a compound
    /// table or a column entry in a single table) are dropped.
    pub fn with_expanded_cells(mut self, cells: BTreeMap<ItemId, ExpandedCell>) -> Self {
        let variant = self.variant;
        self.expanded_cells = cells
            .into_iter()
            .filter(|(id, cell)| {
                let fits = matches!(
                    (variant, cell),
                    (ExpansionVariant::Single, ExpandedCell::Row)
                        | (ExpansionVariant::Compound, ExpandedCell::Column(_))
                );
                if !fits {
                    log::warn!("dropping expanded cell {cell:?} for `{id}`: does not fit {variant:?} expansion");
                }
                fits
            })
            .collect();
        self
    }

    /// The expansion mode.
    pub fn variant(&self) -> ExpansionVariant {
        self.variant
    }

    /// All expanded rows.
    pub fn expanded_cells(&self) -> &BTreeMap<ItemId, ExpandedCell> {
        &self.expanded_cells
    }

    /// Ids of every expanded row.
    pub fn expanded_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.expanded_cells.keys()
    }

    /// The expanded column of a row in a compound table.
    pub fn expanded_column(&self, id: &str) -> Option<&str> {
        match self.expanded_cells.get(id) {
            Some(ExpandedCell::Column(column)) => Some(column.as_str()),
            _ => None,
        }
    }

    /// Without a column key: is the row expanded at all. With a column key:
    /// is that column's content showing for the row.
    pub fn is_cell_expanded(&self, id: &str, column_key: Option<&str>) -> bool {
        match (self.expanded_cells.get(id), column_key) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(ExpandedCell::Column(expanded)), Some(column_key)) => expanded == column_key,
            (Some(ExpandedCell::Row), Some(_)) => false,
        }
    }

    fn check_column_key(&self, id: &ItemId, column_key: Option<&str>, is_expanding: bool) -> Result<()> {
        match (self.variant, column_key) {
            (ExpansionVariant::Single, Some(column_key)) => Err(TableError::ColumnKeyNotAllowed {
                item_id: id.to_string(),
                column_key: column_key.to_string(),
            }),
            (ExpansionVariant::Compound, None) if is_expanding => Err(TableError::ColumnKeyRequired {
                item_id: id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Expands or collapses a row or cell.
    ///
    /// Expanding a column of a compound row replaces any other expanded
    /// column of that row. Collapsing with a column key only collapses the
    /// row if that column is the expanded one; collapsing without a key
    /// closes the row in either variant.
    ///
    /// Returns true if the state changed.
    pub fn set_cell_expanded(
        &mut self,
        id: impl Into<ItemId>,
        is_expanding: bool,
        column_key: Option<&str>,
    ) -> Result<bool> {
        let id = id.into();
        if let Err(err) = self.check_column_key(&id, column_key, is_expanding) {
            log::warn!("{err}");
            return Err(err);
        }

        if is_expanding {
            let cell = match column_key {
                Some(column_key) => ExpandedCell::Column(column_key.to_string()),
                None => ExpandedCell::Row,
            };
            let previous = self.expanded_cells.insert(id, cell.clone());
            return Ok(previous.as_ref() != Some(&cell));
        }

        let collapses = match column_key {
            Some(column_key) => self.is_cell_expanded(id.as_str(), Some(column_key)),
            None => self.expanded_cells.contains_key(&id),
        };
        if collapses {
            self.expanded_cells.remove(&id);
        }
        Ok(collapses)
    }

    /// Flips the expansion of a row or cell. Returns the new expanded state.
    pub fn toggle_cell(&mut self, id: impl Into<ItemId>, column_key: Option<&str>) -> Result<bool> {
        let id = id.into();
        let expanding = !self.is_cell_expanded(id.as_str(), column_key);
        self.set_cell_expanded(id, expanding, column_key)?;
        Ok(expanding)
    }

    /// Collapses every row.
    pub fn collapse_all(&mut self) {
        self.expanded_cells.clear();
    }

    /// Keeps only the rows for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ItemId) -> bool,
    {
        self.expanded_cells.retain(|id, _| keep(id));
    }
}
