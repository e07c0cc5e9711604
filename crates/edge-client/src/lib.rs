//! HTTP client for the YourSpace discovery function endpoints.
//!
//! The backend exposes three functions under `{base}/functions/v1/`:
//! - `discover-artists`: fetch a batch of candidate profiles
//! - `record-swipe`: persist a like/pass decision, report mutual follows
//! - `discovery-analytics`: aggregate counts plus recent activity
//!
//! This crate handles:
//! - Building requests with the anon key and the viewer's access token
//! - Converting between wire payloads and `profiles` domain types
//! - Mapping transport, status and decoding failures to `EdgeClientError`
//!
//! There is no retry logic here. A failed call is reported once and the
//! caller decides whether to re-issue it.

use std::time::Duration;

use profiles::{AnalyticsSummary, ArtistId, Candidate, SwipeReceipt, ViewerId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Function name for fetching a candidate batch
pub const DISCOVER_ARTISTS_FN: &str = "discover-artists";
/// Function name for recording a swipe decision
pub const RECORD_SWIPE_FN: &str = "record-swipe";
/// Function name for fetching discovery analytics
pub const DISCOVERY_ANALYTICS_FN: &str = "discovery-analytics";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when calling the function endpoints
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EdgeClientError {
    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    #[error("Request to {function} failed: {reason}")]
    Transport { function: String, reason: String },

    #[error("{function} returned HTTP {status}: {body}")]
    Status {
        function: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {function}: {reason}")]
    InvalidResponse { function: String, reason: String },

    #[error("{function} rejected the request: {reason}")]
    Rejected { function: String, reason: String },
}

/// Connection settings for the function endpoints
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    /// Project URL, e.g. "https://abc.supabase.co"
    pub base_url: String,
    /// Public anon key sent as the `apikey` header
    pub anon_key: Option<String>,
    /// Viewer session token sent as a bearer token
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl EdgeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: None,
            access_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = Some(key.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Wire payloads
// =============================================================================

#[derive(Serialize)]
struct DiscoverRequest<'a> {
    viewer_id: Option<&'a ViewerId>,
}

#[derive(Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    artists: Vec<Candidate>,
}

#[derive(Serialize)]
struct SwipeRequest<'a> {
    viewer_id: &'a ViewerId,
    artist_id: &'a ArtistId,
    liked: bool,
}

#[derive(Deserialize)]
struct SwipeResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    mutual_follow: bool,
    #[serde(default)]
    error: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Serialize)]
struct AnalyticsRequest<'a> {
    viewer_id: &'a ViewerId,
}

// =============================================================================
// Client
// =============================================================================

/// Client for the discovery function endpoints.
///
/// Cheap to clone: the underlying `reqwest::Client` shares its pool.
#[derive(Debug, Clone)]
pub struct EdgeClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: Option<String>,
    access_token: Option<String>,
}

impl EdgeClient {
    /// Build a client from configuration.
    ///
    /// No request is made here; the base URL is only checked for shape.
    pub fn new(config: EdgeConfig) -> Result<Self, EdgeClientError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(EdgeClientError::Configuration(format!(
                "base url must start with http:// or https://, got '{}'",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EdgeClientError::Configuration(e.to_string()))?;

        info!("Configured edge client for {}", base_url);
        Ok(Self {
            http,
            base_url,
            anon_key: config.anon_key,
            access_token: config.access_token,
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn function_url(&self, function: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, function)
    }

    /// POST a JSON body to a function and decode the JSON reply
    async fn invoke<B, R>(&self, function: &str, body: &B) -> Result<R, EdgeClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.http.post(self.function_url(function)).json(body);
        if let Some(key) = &self.anon_key {
            request = request.header("apikey", key);
        }
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!("Transport error calling {}: {}", function, e);
            EdgeClientError::Transport {
                function: function.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EdgeClientError::Transport {
                function: function.to_string(),
                reason: e.to_string(),
            })?;

        if !status.is_success() {
            error!("{} returned HTTP {}: {}", function, status.as_u16(), text);
            return Err(EdgeClientError::Status {
                function: function.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            error!("Could not decode {} response: {}", function, e);
            EdgeClientError::InvalidResponse {
                function: function.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Fetch a batch of candidate profiles, in the order the backend ranks them
    #[instrument(skip(self))]
    pub async fn fetch_candidate_batch(
        &self,
        viewer: Option<&ViewerId>,
    ) -> Result<Vec<Candidate>, EdgeClientError> {
        let response: DiscoverResponse = self
            .invoke(DISCOVER_ARTISTS_FN, &DiscoverRequest { viewer_id: viewer })
            .await?;
        debug!("Fetched {} candidates", response.artists.len());
        Ok(response.artists)
    }

    /// Persist a like/pass decision
    #[instrument(skip(self))]
    pub async fn record_swipe(
        &self,
        viewer: &ViewerId,
        artist: &ArtistId,
        liked: bool,
    ) -> Result<SwipeReceipt, EdgeClientError> {
        let request = SwipeRequest {
            viewer_id: viewer,
            artist_id: artist,
            liked,
        };
        let response: SwipeResponse = self.invoke(RECORD_SWIPE_FN, &request).await?;

        if !response.success {
            let reason = response
                .error
                .unwrap_or_else(|| "no reason given".to_string());
            error!("Swipe on {} rejected: {}", artist, reason);
            return Err(EdgeClientError::Rejected {
                function: RECORD_SWIPE_FN.to_string(),
                reason,
            });
        }

        debug!(
            "Recorded swipe on {} (liked: {}, mutual: {})",
            artist, liked, response.mutual_follow
        );
        Ok(SwipeReceipt {
            mutual_follow: response.mutual_follow,
        })
    }

    /// Fetch the aggregate analytics snapshot for a viewer
    #[instrument(skip(self))]
    pub async fn fetch_analytics(
        &self,
        viewer: &ViewerId,
    ) -> Result<AnalyticsSummary, EdgeClientError> {
        self.invoke(DISCOVERY_ANALYTICS_FN, &AnalyticsRequest { viewer_id: viewer })
            .await
    }
}
