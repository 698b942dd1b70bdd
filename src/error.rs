//! Error types for table state operations.
//!
//! Nothing in this crate performs I/O, so every error here is either a
//! caller-contract violation (asking a compound table to expand a row without
//! naming a column, selecting "all" before the total is known) or a malformed
//! input handed to one of the decoders.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors raised by table state containers and the composer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A compound-expansion table was asked to expand a row without a column key.
    #[error("compound expansion requires a column key (item `{item_id}`)")]
    ColumnKeyRequired {
        /// Identity of the row the call targeted.
        item_id: String,
    },

    /// A single-expansion table was handed a column key.
    #[error("single expansion does not accept a column key (item `{item_id}`, column `{column_key}`)")]
    ColumnKeyNotAllowed {
        /// Identity of the row the call targeted.
        item_id: String,
        /// The column key that was rejected.
        column_key: String,
    },

    /// "Select all" was requested before the total item count was known.
    #[error("cannot select all items: total item count is unknown")]
    TotalUnknown,

    /// Items per page must be greater than zero.
    #[error("items per page must be greater than zero")]
    InvalidItemsPerPage,

    /// A column key that the table does not define.
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    /// Sorting was requested on a column that is not sortable.
    #[error("column `{0}` is not sortable")]
    ColumnNotSortable(String),

    /// The active sort column has no entry in the hub field dictionary.
    #[error("no hub sort field mapped for column `{0}`")]
    UnmappedSortField(String),

    /// An action targeted a feature that is disabled for this table.
    #[error("{0} is not enabled for this table")]
    FeatureDisabled(Feature),

    /// The hub wire format could not be decoded.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Persisted table state could not be restored.
    #[error("invalid persisted value for `{key}`: {message}")]
    Persistence {
        /// The parameter key that failed to decode.
        key: String,
        /// Why decoding failed.
        message: String,
    },
}

/// Table features that can be switched off per table instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Filtering.
    Filter,
    /// Sorting.
    Sort,
    /// Pagination.
    Pagination,
    /// Row expansion.
    Expansion,
    /// Row selection.
    Selection,
    /// Active (detail) item tracking.
    ActiveItem,
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Feature::Filter => "filtering",
            Feature::Sort => "sorting",
            Feature::Pagination => "pagination",
            Feature::Expansion => "expansion",
            Feature::Selection => "selection",
            Feature::ActiveItem => "active item tracking",
        };
        f.write_str(name)
    }
}

/// Errors raised while decoding hub request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A filter term did not contain a recognised operator.
    #[error("filter term `{0}` has no operator")]
    MissingOperator(String),

    /// A filter term had an empty field name.
    #[error("filter term `{0}` has no field")]
    MissingField(String),

    /// A quoted value was not terminated.
    #[error("unterminated quoted value in `{0}`")]
    UnterminatedQuote(String),

    /// A value list was not closed with `)`.
    #[error("unterminated value list in `{0}`")]
    UnterminatedList(String),

    /// A value list mixed `|` and `,` separators.
    #[error("value list in `{0}` mixes `|` and `,` separators")]
    MixedListOperators(String),

    /// Unexpected characters after a complete term.
    #[error("unexpected trailing input in `{0}`")]
    TrailingInput(String),

    /// The sort parameter was not `direction:field`.
    #[error("invalid sort `{0}`")]
    InvalidSort(String),

    /// A numeric parameter failed to parse.
    #[error("invalid number for `{key}`: `{value}`")]
    InvalidNumber {
        /// Query parameter name.
        key: String,
        /// The offending value.
        value: String,
    },
}
