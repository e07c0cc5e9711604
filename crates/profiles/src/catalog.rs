//! Catalog building and indexing.
//!
//! A `Catalog` owns an ordered list of artist entries plus an id index for
//! O(1) lookups. Order is preserved from the source file because the offline
//! backend serves batches in catalog order.

use crate::error::{ProfileError, Result};
use crate::parser;
use crate::types::{ArtistId, Candidate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// A catalog record: the profile plus whether the artist already follows
/// the viewer (a like on such an artist completes a mutual follow)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(default)]
    pub follows_viewer: bool,
}

impl CatalogEntry {
    pub fn new(candidate: Candidate) -> Self {
        Self {
            candidate,
            follows_viewer: false,
        }
    }

    pub fn following_viewer(mut self) -> Self {
        self.follows_viewer = true;
        self
    }
}

/// Ordered, id-indexed collection of artist profiles
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<ArtistId, usize>,
}

impl Catalog {
    /// Creates a new, empty Catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and index a catalog file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let entries = parser::parse_catalog(path)?;
        let catalog = Self::from_entries(entries)?;
        info!(
            path = %path.display(),
            artists = catalog.len(),
            "Loaded artist catalog"
        );
        Ok(catalog)
    }

    /// Index already-parsed entries, rejecting duplicate ids
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    /// Append an entry to the end of the catalog
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<()> {
        let id = entry.candidate.id.clone();
        if self.index.contains_key(&id) {
            return Err(ProfileError::DuplicateArtist { id: id.to_string() });
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Get an entry by artist id
    pub fn get(&self, id: &ArtistId) -> Option<&CatalogEntry> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    /// All entries in catalog order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> CatalogEntry {
        CatalogEntry::new(Candidate::new(id, name))
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.get(&ArtistId::new("missing")).is_none());
    }

    #[test]
    fn test_lookup_and_order() {
        let catalog = Catalog::from_entries(vec![
            entry("a-2", "Juniper Lane"),
            entry("a-1", "Nova").following_viewer(),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[0].candidate.id.as_str(), "a-2");

        let nova = catalog.get(&ArtistId::new("a-1")).unwrap();
        assert_eq!(nova.candidate.display_name, "Nova");
        assert!(nova.follows_viewer);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = Catalog::from_entries(vec![entry("a-1", "Nova"), entry("a-1", "Nova Again")]);
        match result {
            Err(ProfileError::DuplicateArtist { id }) => assert_eq!(id, "a-1"),
            other => panic!("expected DuplicateArtist, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_entry_flattens_candidate_fields() {
        let json = r#"{"id": "a-3", "display_name": "Ember", "follows_viewer": true}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.candidate.id.as_str(), "a-3");
        assert!(entry.follows_viewer);
    }

    #[test]
    fn test_load_sample_catalog() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/sample_catalog.json");
        let catalog = Catalog::load_from_file(&path).expect("Failed to load sample catalog");

        assert_eq!(catalog.len(), 7);
        let followers = catalog.entries().iter().filter(|e| e.follows_viewer).count();
        assert_eq!(followers, 2);
    }
}
