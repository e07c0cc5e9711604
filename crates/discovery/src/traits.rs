//! Collaborator traits for the discovery controller.
//!
//! The controller never talks to the network itself. It is handed
//! implementations of these traits: the HTTP edge client in production,
//! the offline `LocalBackend`, or scripted doubles in tests.
//!
//! ## Design Note
//! - `Send + Sync` so collaborators can be shared with spawned refill tasks
//! - `#[async_trait]` keeps the traits object-safe behind `Arc<dyn ...>`

use async_trait::async_trait;
use profiles::{AnalyticsSummary, ArtistId, Candidate, SwipeReceipt, ViewerId};
use thiserror::Error;

/// Failure reported by an external collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// Network or service failure; the call may succeed if re-issued
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service understood the request and refused it
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The service answered with something we could not use
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The decision referenced an artist the backend does not know
    #[error("unknown artist: {0}")]
    UnknownArtist(ArtistId),
}

/// Fetches a batch ("stack") of candidate profiles
#[async_trait]
pub trait ArtistFetcher: Send + Sync {
    /// Returns candidates in the order they should be shown
    async fn fetch_batch(
        &self,
        viewer: Option<&ViewerId>,
    ) -> Result<Vec<Candidate>, CollaboratorError>;
}

/// Persists like/pass decisions
#[async_trait]
pub trait SwipeRecorder: Send + Sync {
    async fn record(
        &self,
        viewer: &ViewerId,
        artist: &ArtistId,
        liked: bool,
    ) -> Result<SwipeReceipt, CollaboratorError>;
}

/// Supplies aggregate discovery statistics
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch_summary(&self, viewer: &ViewerId)
    -> Result<AnalyticsSummary, CollaboratorError>;
}
