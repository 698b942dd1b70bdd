#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/table-controls/")]

//! # table-controls
//!
//! State containers and derived views for list-backed tables in
//! [bubbletea-rs](https://github.com/joshka/bubbletea-rs) applications.
//!
//! A table's interactive state (filters, sort, page, expanded rows, selected
//! rows and the active row) lives in small independent containers. Pure
//! functions derive the visible rows from that state, or, for tables backed
//! by a server-paginated hub API, the request parameters to send instead.
//! [`controls::TableControls`] composes everything behind one interface so
//! rendering code never has to know which features run locally and which on
//! the server.
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`filter`] | Filter categories, filter state, local filtering |
//! | [`sort`] | Sort state, comparator, stable local sorting |
//! | [`pagination`] | Page state, slicing, self-correction, status line |
//! | [`expansion`] | Single and compound row expansion |
//! | [`selection`] | Row selection with "select all" for remote data |
//! | [`active_item`] | The row whose detail view is open |
//! | [`hub`] | Hub request parameters and their query-string format |
//! | [`persistence`] | Saving table state to URL query parameters |
//! | [`controls`] | The composer, its render props, key bindings and text view |
//! | [`key`] | Key bindings |
//!
//! ## Local tables
//!
//! ```rust
//! use table_controls::prelude::*;
//!
//! let definition = TableDefinition::new(|n: &u32| *n)
//!     .with_column(Column::new("n", "N").with_cell(|n: &u32| n.to_string()));
//!
//! let mut table = TableControls::new(TableControlsConfig::local("numbers"), definition).unwrap();
//! table.set_data(DataSource::Local((1..=11).collect()));
//! table.update(TableAction::SetPage(2)).unwrap();
//! assert_eq!(table.derived().current_page_items.len(), 1);
//!
//! // Deleting the only row of page 2 moves the table back to page 1.
//! table.set_data(DataSource::Local((1..=10).collect()));
//! assert_eq!(table.pagination_state().page_number(), 1);
//! ```
//!
//! ## Remote tables
//!
//! ```rust
//! use table_controls::prelude::*;
//!
//! let definition = TableDefinition::new(|row: &String| row.clone())
//!     .with_column(Column::new("name", "Name").sortable())
//!     .with_filter_category(FilterCategory::new("name", "Name").with_type(FilterType::Select))
//!     .with_hub_sort_field("name", "name");
//!
//! let mut table = TableControls::new(TableControlsConfig::remote("apps"), definition).unwrap();
//! table.set_data(DataSource::Remote(HubPaginatedResult::new(vec!["app-a".to_string()], 42)));
//!
//! table.update(TableAction::SetFilterValues { key: "name".into(), values: vec!["app-a".into()] }).unwrap();
//! table.update(TableAction::ToggleSort("name".into())).unwrap();
//! table.update(TableAction::SetPage(2)).unwrap();
//!
//! assert_eq!(
//!     table.hub_query().unwrap().to_query_string(),
//!     "filter=name%3D%22app-a%22&sort=asc%3Aname&limit=10&offset=10"
//! );
//! ```
//!
//! ## Integration with bubbletea-rs
//!
//! Forward messages to [`controls::TableControls::update_key`] from your
//! model's `update`, and render with [`controls::TableControls::view`]:
//!
//! ```rust
//! use table_controls::prelude::*;
//! use bubbletea_rs::{KeyMsg, Msg};
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! fn handle(table: &mut TableControls<u32>, msg: Msg) {
//!     if let Err(err) = table.update_key(&msg) {
//!         eprintln!("{err}");
//!     }
//! }
//!
//! let definition = TableDefinition::new(|n: &u32| *n)
//!     .with_column(Column::new("n", "N").with_cell(|n: &u32| n.to_string()));
//! let mut table = TableControls::new(TableControlsConfig::local("numbers"), definition).unwrap();
//! table.set_data(DataSource::Local((1..=25).collect()));
//!
//! handle(&mut table, Box::new(KeyMsg { key: KeyCode::Right, modifiers: KeyModifiers::NONE }));
//! assert_eq!(table.pagination_state().page_number(), 2);
//! assert!(table.view().ends_with("2/3"));
//! ```

pub mod active_item;
pub mod controls;
pub mod error;
pub mod expansion;
pub mod filter;
pub mod hub;
pub mod key;
pub mod pagination;
pub mod persistence;
pub mod selection;
pub mod sort;
pub mod value;

pub use error::{Result, TableError};
pub use value::{ItemId, SortValue};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::active_item::ActiveItemState;
    pub use crate::controls::{
        Column, DataSource, DerivedView, FeatureMode, TableAction, TableControls, TableControlsConfig,
        TableDefinition, TableKeyMap,
    };
    pub use crate::error::{Feature, ParseError, Result, TableError};
    pub use crate::expansion::{ExpandedCell, ExpansionState, ExpansionVariant};
    pub use crate::filter::{filter_items, FilterCategory, FilterState, FilterType, FilterValues, LogicOperator};
    pub use crate::hub::{
        deserialize_request_params_from_hub, get_hub_request_params, serialize_request_params_for_hub,
        HubPaginatedResult, HubQuery, HubRequestParams,
    };
    pub use crate::key::{new_binding, with_help, with_keys_str, Binding, KeyMap, KeyPress};
    pub use crate::pagination::{paginate_items, PaginationState, PaginationView};
    pub use crate::persistence::TableStateSnapshot;
    pub use crate::selection::{BulkSelectState, SelectionState};
    pub use crate::sort::{sort_items, ActiveSort, SortDirection, SortState};
    pub use crate::value::{ItemId, SortValue};
}
