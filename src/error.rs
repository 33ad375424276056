//! Error types for dataset normalization.
//!
//! Every failure propagates to the caller of the top-level load; nothing is
//! caught or retried internally.

use std::path::PathBuf;

/// Top-level error type for the normalization library.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// A column referenced by name does not exist in the table.
    #[error("column not found: {name}")]
    ColumnNotFound { name: String },

    /// A non-empty value in a recognized temporal column failed to parse.
    #[error("cannot parse {value:?} in column {column} as a timestamp")]
    TimestampParse { column: String, value: String },

    /// A file has no reader registered for it.
    #[error("no reader registered for file {file:?}; add an entry to the reader registry")]
    UnregisteredFile { file: String },

    /// An index column contains nulls, so no composite index can be built
    /// over it.
    #[error("index column {column} contains null values")]
    NullIndexValue { column: String },

    /// An index reorder named a different set of columns than the table's
    /// current index.
    #[error("index columns {requested:?} do not match current index {current:?}")]
    IndexMismatch {
        requested: Vec<String>,
        current: Vec<String>,
    },

    /// A join would introduce a column name that already exists.
    #[error("join would duplicate column {name}")]
    DuplicateColumn { name: String },

    /// Columns that must share a type do not.
    #[error("column {column} is {found} where {expected} was required")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
