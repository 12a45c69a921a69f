//! gridkit Table - Headless data grid engine
//!
//! Everything a grid view needs besides drawing:
//!
//! - `column_types` - per-type validation, edit seeding, display and editor strategies
//! - `pipeline` - filter → search → sort → paginate over borrowed rows
//! - `GridState` / `PaginationState` - immutable-per-transition view state
//! - `SelectionModel` - selected row ids across pages
//! - `CellEditSession` - the single inline edit and its commit rules
//! - `Debouncer` / `ClickDisambiguator` - delayed intents and double-click detection
//! - `DataGrid` - the facade that ties these together and emits `GridEvent`s

pub mod column_types;
mod debounce;
mod edit;
mod events;
mod grid;
mod pagination;
pub mod pipeline;
mod selection;
mod state;
mod validation;

pub use column_types::{EditorKind, TypeStrategy, format_cell, strategy_for};
pub use debounce::*;
pub use edit::*;
pub use events::*;
pub use grid::*;
pub use pagination::*;
pub use pipeline::{FilterState, Pagination, PipelineOutput, SortDirection, SortState};
pub use selection::*;
pub use state::*;
pub use validation::*;
