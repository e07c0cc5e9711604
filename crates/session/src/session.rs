//! # Discovery Session
//!
//! Builds the discovery controller over one of two backends:
//! - **remote**: the `discover-artists`, `record-swipe` and
//!   `discovery-analytics` function endpoints via `EdgeClient`
//! - **offline**: a `LocalBackend` serving a catalog file
//!
//! The stack and the analytics aggregator share the same backend, so an
//! offline session's analytics reflect the swipes made in it.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::{info, instrument};

use discovery::{
    AnalyticsAggregator, DiscoveryConfig, DiscoveryStack, LoadOutcome, LocalBackend, Notifier,
    TracingNotifier,
};
use edge_client::{EdgeClient, EdgeConfig};
use profiles::{AnalyticsSummary, Catalog, ViewerId};

use crate::remote::RemoteBackend;

/// Settings shared by both session modes
#[derive(Clone)]
pub struct SessionOptions {
    pub discovery: DiscoveryConfig,
    pub viewer: Option<ViewerId>,
    pub notifier: Arc<dyn Notifier>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            viewer: None,
            notifier: Arc::new(TracingNotifier),
        }
    }
}

impl SessionOptions {
    pub fn with_viewer(mut self, viewer: ViewerId) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

/// A discovery stack plus analytics over a single backend
#[derive(Clone)]
pub struct DiscoverySession {
    stack: DiscoveryStack,
    analytics: AnalyticsAggregator,
}

impl DiscoverySession {
    /// Session backed by the function endpoints
    pub fn remote(edge: EdgeConfig, options: SessionOptions) -> Result<Self> {
        let base_url = edge.base_url.clone();
        let client = EdgeClient::new(edge)
            .with_context(|| format!("Failed to create edge client for {}", base_url))?;
        let backend = Arc::new(RemoteBackend::new(client));

        info!("Discovery session using function endpoints at {}", base_url);
        Ok(Self::assemble(backend.clone(), backend.clone(), backend, options))
    }

    /// Session backed by an in-memory catalog
    pub fn offline(backend: LocalBackend, options: SessionOptions) -> Self {
        info!(
            "Discovery session using offline catalog ({} artists)",
            backend.catalog().len()
        );
        let backend = Arc::new(backend);
        Self::assemble(backend.clone(), backend.clone(), backend, options)
    }

    /// Offline session over a catalog file, optionally shuffled with `seed`
    pub fn offline_from_file(
        path: &Path,
        batch_size: usize,
        seed: Option<u64>,
        options: SessionOptions,
    ) -> Result<Self> {
        let catalog = Catalog::load_from_file(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?;

        let mut backend = LocalBackend::new(catalog).with_batch_size(batch_size);
        if let Some(seed) = seed {
            backend = backend.with_shuffle(seed);
        }
        Ok(Self::offline(backend, options))
    }

    fn assemble(
        fetcher: Arc<dyn discovery::ArtistFetcher>,
        recorder: Arc<dyn discovery::SwipeRecorder>,
        source: Arc<dyn discovery::AnalyticsSource>,
        options: SessionOptions,
    ) -> Self {
        let mut builder = DiscoveryStack::builder(fetcher, recorder)
            .with_config(options.discovery)
            .with_notifier(options.notifier.clone());
        if let Some(viewer) = options.viewer {
            builder = builder.with_viewer(viewer);
        }

        Self {
            stack: builder.build(),
            analytics: AnalyticsAggregator::new(source).with_notifier(options.notifier),
        }
    }

    pub fn stack(&self) -> &DiscoveryStack {
        &self.stack
    }

    pub fn analytics(&self) -> &AnalyticsAggregator {
        &self.analytics
    }

    /// Load the first batch; returns how many candidates were queued
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<usize> {
        match self.stack.load_stack().await {
            LoadOutcome::Loaded { count } => Ok(count),
            LoadOutcome::Failed { reason } => Err(anyhow!("Failed to load artists: {}", reason)),
        }
    }

    /// Fresh analytics for the signed-in viewer
    #[instrument(skip(self))]
    pub async fn analytics_summary(&self) -> Result<AnalyticsSummary> {
        let viewer = self
            .stack
            .viewer()
            .await
            .context("Sign in to view discovery analytics")?;
        self.analytics
            .summary(&viewer)
            .await
            .context("Failed to fetch discovery analytics")
    }
}
