//! # Discovery Crate
//!
//! The artist-discovery swipe deck.
//!
//! ## Components
//!
//! ### Discovery Stack Controller
//! An ordered queue of candidate artists plus a cursor:
//! - `decide(liked)` records a like/pass through the `SwipeRecorder`
//!   and advances the cursor only on success
//! - when the unseen tail drops to the refill threshold, a background
//!   refill appends a new batch from the `ArtistFetcher`
//! - `load_stack` / `reset` replace the queue and rewind
//!
//! ### Analytics Aggregator
//! Read-through access to seen/liked/passed counts and recent activity.
//!
//! ### Local Backend
//! An in-memory implementation of every collaborator, driven by a catalog
//! file, for offline sessions and demos.
//!
//! ## Example Usage
//!
//! ```ignore
//! use discovery::{DiscoveryStack, LocalBackend};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(LocalBackend::new(catalog));
//! let stack = DiscoveryStack::builder(backend.clone(), backend.clone())
//!     .with_viewer(viewer)
//!     .build();
//!
//! stack.load_stack().await;
//! while let Some(artist) = stack.current().await {
//!     println!("{}", artist.headline());
//!     stack.decide(true).await;
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod local;
pub mod notify;
pub mod stack;
pub mod traits;

pub use analytics::{AnalyticsAggregator, render_report};
pub use config::DiscoveryConfig;
pub use local::LocalBackend;
pub use notify::{Notification, Notifier, TracingNotifier};
pub use stack::{DecideOutcome, DiscoveryStack, DiscoveryStackBuilder, LoadOutcome, StackSnapshot};
pub use traits::{AnalyticsSource, ArtistFetcher, CollaboratorError, SwipeRecorder};
