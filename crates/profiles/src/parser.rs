//! Parser for artist catalog files.
//!
//! A catalog is a JSON array of artist profiles, each carrying the usual
//! `Candidate` fields plus an optional `follows_viewer` flag:
//!
//! ```json
//! [
//!   {"id": "a-1", "display_name": "Nova", "genres": ["synthwave"], "follows_viewer": true},
//!   {"id": "a-2", "display_name": "Juniper Lane"}
//! ]
//! ```
//!
//! Parsing only checks the shape of each entry. Cross-entry rules (unique
//! ids) are enforced when the entries are indexed into a `Catalog`.

use crate::catalog::CatalogEntry;
use crate::error::{ProfileError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Parse a catalog file from disk
pub fn parse_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ProfileError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => ProfileError::IoError(e),
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_catalog_str(&contents, &file_name)
}

/// Parse catalog JSON that is already in memory
///
/// `source` names the origin in error messages.
pub fn parse_catalog_str(contents: &str, source: &str) -> Result<Vec<CatalogEntry>> {
    let entries: Vec<CatalogEntry> =
        serde_json::from_str(contents).map_err(|e| ProfileError::ParseError {
            file: source.to_string(),
            line: e.line(),
            column: e.column(),
            reason: e.to_string(),
        })?;

    for entry in &entries {
        validate_entry(entry)?;
    }

    Ok(entries)
}

/// Reject entries the swipe deck could not render
fn validate_entry(entry: &CatalogEntry) -> Result<()> {
    let candidate = &entry.candidate;
    let invalid = |field: &str, reason: &str| ProfileError::InvalidValue {
        id: candidate.id.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    };

    if candidate.id.as_str().trim().is_empty() {
        return Err(invalid("id", "must not be empty"));
    }
    if candidate.display_name.trim().is_empty() {
        return Err(invalid("display_name", "must not be empty"));
    }
    if candidate
        .media_samples
        .iter()
        .any(|sample| sample.url.trim().is_empty())
    {
        return Err(invalid("media_samples", "every sample needs a url"));
    }

    Ok(())
}
