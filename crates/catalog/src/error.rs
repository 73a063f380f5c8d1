//! Error types for the catalog crate.
//!
//! Only the load step can fail. Queries against a loaded catalog are
//! infallible: an unknown movie simply has no ratings and no genres.

use thiserror::Error;

/// Errors that can occur while loading the movie or rating tables
///
/// A failed load is fatal to that load step only. Whatever rows were read
/// before the failure stay in the catalog.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected the input (bad quoting, invalid UTF-8, ...)
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// The header row is missing or empty
    #[error("Missing or empty header row in {file}")]
    MissingHeader { file: String },

    /// Line in data file couldn't be parsed
    ///
    /// Only raised for fields that identify a record (the movie id);
    /// numeric rating fields are coerced instead.
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
