//! gridkit Core - Value model and column definitions for the data grid engine
//!
//! This crate provides the fundamental types every other gridkit crate
//! depends on:
//!
//! - `CellValue`, `RowId`, `Row` - the host-supplied row collection
//! - `ColumnType`, `ColumnDefinition` - declarative per-field grid behavior
//! - `normalize` / `ColumnSet` - defaulting of raw column declarations and the
//!   derived filter/search/display views
//! - `FormConfig` - field list and width of the record-entry dialog
//! - `GridError` - lookup failures shared by the engine layers

mod column;
mod error;
mod form;
mod types;

pub use column::*;
pub use error::*;
pub use form::*;
pub use types::*;
