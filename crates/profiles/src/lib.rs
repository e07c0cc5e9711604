//! # Profiles Crate
//!
//! Domain model for YourSpace artist discovery.
//!
//! ## Main Components
//!
//! - **types**: Identities, artist candidates, swipe receipts and analytics
//! - **catalog**: Ordered, id-indexed artist catalog for offline sessions
//! - **parser**: Parse catalog JSON files into entries
//! - **error**: Error types for catalog loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use profiles::{ArtistId, Catalog};
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_file(Path::new("data/artists.json"))?;
//! let nova = catalog.get(&ArtistId::new("a-1")).unwrap();
//! println!("{} has {} followers", nova.candidate.headline(), nova.candidate.follower_count);
//! ```

pub mod catalog;
pub mod error;
pub mod parser;
pub mod types;

pub use catalog::{Catalog, CatalogEntry};
pub use error::{ProfileError, Result};
pub use types::{
    AnalyticsSummary, ArtistId, Candidate, MediaKind, MediaSample, RecentActivity, SwipeReceipt,
    ViewerId,
};
