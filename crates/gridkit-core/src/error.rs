//! Error types for gridkit

use thiserror::Error;

/// Core error type for column and row lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown row: {0}")]
    UnknownRow(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Column index out of range: {0}")]
    ColumnIndexOutOfRange(usize),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, GridError>;
