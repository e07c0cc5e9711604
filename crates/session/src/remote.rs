//! Adapter from the edge function client to the discovery collaborator
//! traits.

use async_trait::async_trait;
use discovery::{AnalyticsSource, ArtistFetcher, CollaboratorError, SwipeRecorder};
use edge_client::{EdgeClient, EdgeClientError};
use profiles::{AnalyticsSummary, ArtistId, Candidate, SwipeReceipt, ViewerId};

/// Serves every collaborator role from the function endpoints
#[derive(Clone)]
pub struct RemoteBackend {
    client: EdgeClient,
}

impl RemoteBackend {
    pub fn new(client: EdgeClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &EdgeClient {
        &self.client
    }
}

/// Server errors and transport failures are worth re-issuing; anything
/// else the service refused outright
fn to_collaborator_error(error: EdgeClientError) -> CollaboratorError {
    let message = error.to_string();
    match error {
        EdgeClientError::Transport { .. } | EdgeClientError::Configuration(_) => {
            CollaboratorError::Unavailable(message)
        }
        EdgeClientError::Status { status, .. } if status >= 500 => {
            CollaboratorError::Unavailable(message)
        }
        EdgeClientError::Status { .. } | EdgeClientError::Rejected { .. } => {
            CollaboratorError::Rejected(message)
        }
        EdgeClientError::InvalidResponse { .. } => CollaboratorError::InvalidResponse(message),
    }
}

#[async_trait]
impl ArtistFetcher for RemoteBackend {
    async fn fetch_batch(
        &self,
        viewer: Option<&ViewerId>,
    ) -> Result<Vec<Candidate>, CollaboratorError> {
        self.client
            .fetch_candidate_batch(viewer)
            .await
            .map_err(to_collaborator_error)
    }
}

#[async_trait]
impl SwipeRecorder for RemoteBackend {
    async fn record(
        &self,
        viewer: &ViewerId,
        artist: &ArtistId,
        liked: bool,
    ) -> Result<SwipeReceipt, CollaboratorError> {
        self.client
            .record_swipe(viewer, artist, liked)
            .await
            .map_err(to_collaborator_error)
    }
}

#[async_trait]
impl AnalyticsSource for RemoteBackend {
    async fn fetch_summary(
        &self,
        viewer: &ViewerId,
    ) -> Result<AnalyticsSummary, CollaboratorError> {
        self.client
            .fetch_analytics(viewer)
            .await
            .map_err(to_collaborator_error)
    }
}
