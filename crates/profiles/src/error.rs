//! Error types for the profiles crate.
//!
//! Covers everything that can go wrong while loading an artist catalog:
//! missing files, malformed JSON, duplicate identities and entries that
//! fail validation.

use thiserror::Error;

/// Errors that can occur while loading or validating artist profiles
///
/// The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
/// and `Display` from the `#[error(...)]` attributes.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Catalog file could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Catalog contents are not valid JSON for the expected shape
    #[error("Parse error at line {line}, column {column} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        column: usize,
        reason: String,
    },

    /// The same artist id appears twice in one catalog
    #[error("Duplicate artist id in catalog: {id}")]
    DuplicateArtist { id: String },

    /// A profile field had an invalid value
    #[error("Invalid value for {field} on artist {id}: {reason}")]
    InvalidValue {
        id: String,
        field: String,
        reason: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ProfileError>;
