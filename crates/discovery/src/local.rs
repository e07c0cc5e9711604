//! Offline backend over an artist catalog.
//!
//! Implements all three collaborator traits in memory so a discovery
//! session can run without the function endpoints:
//! - batches are the next `batch_size` catalog entries the viewer has not
//!   decided on, in catalog order (optionally shuffled once, seeded)
//! - a like on an entry marked `follows_viewer` completes a mutual follow
//! - analytics are derived from the decisions recorded so far

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use profiles::{
    AnalyticsSummary, ArtistId, Candidate, Catalog, RecentActivity, SwipeReceipt, ViewerId,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::debug;

use crate::traits::{AnalyticsSource, ArtistFetcher, CollaboratorError, SwipeRecorder};

/// Default number of candidates served per batch
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// How many activity rows a summary carries
const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone)]
struct RecordedDecision {
    viewer: ViewerId,
    artist: ArtistId,
    artist_name: String,
    liked: bool,
    mutual_follow: bool,
    at: DateTime<Utc>,
}

/// In-memory discovery backend
pub struct LocalBackend {
    catalog: Catalog,
    /// Serving order as positions into the catalog
    order: Vec<usize>,
    batch_size: usize,
    decisions: Mutex<Vec<RecordedDecision>>,
}

impl LocalBackend {
    pub fn new(catalog: Catalog) -> Self {
        let order = (0..catalog.len()).collect();
        Self {
            catalog,
            order,
            batch_size: DEFAULT_BATCH_SIZE,
            decisions: Mutex::new(Vec::new()),
        }
    }

    /// Configure batch size (default: 10, minimum 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Shuffle the serving order once with a seeded RNG
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        self.order.shuffle(&mut rng);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Number of decisions recorded for `viewer`
    pub async fn decision_count(&self, viewer: &ViewerId) -> usize {
        self.decisions
            .lock()
            .await
            .iter()
            .filter(|d| &d.viewer == viewer)
            .count()
    }
}

#[async_trait]
impl ArtistFetcher for LocalBackend {
    async fn fetch_batch(
        &self,
        viewer: Option<&ViewerId>,
    ) -> Result<Vec<Candidate>, CollaboratorError> {
        let decided: HashSet<ArtistId> = match viewer {
            Some(viewer) => self
                .decisions
                .lock()
                .await
                .iter()
                .filter(|d| &d.viewer == viewer)
                .map(|d| d.artist.clone())
                .collect(),
            None => HashSet::new(),
        };

        let batch: Vec<Candidate> = self
            .order
            .iter()
            .map(|&position| &self.catalog.entries()[position].candidate)
            .filter(|candidate| !decided.contains(&candidate.id))
            .take(self.batch_size)
            .cloned()
            .collect();

        debug!(
            "Serving {} candidates ({} already decided)",
            batch.len(),
            decided.len()
        );
        Ok(batch)
    }
}

#[async_trait]
impl SwipeRecorder for LocalBackend {
    async fn record(
        &self,
        viewer: &ViewerId,
        artist: &ArtistId,
        liked: bool,
    ) -> Result<SwipeReceipt, CollaboratorError> {
        let entry = self
            .catalog
            .get(artist)
            .ok_or_else(|| CollaboratorError::UnknownArtist(artist.clone()))?;

        let mut decisions = self.decisions.lock().await;
        if decisions
            .iter()
            .any(|d| &d.viewer == viewer && &d.artist == artist)
        {
            return Err(CollaboratorError::Rejected(format!(
                "already swiped on {}",
                artist
            )));
        }

        let mutual_follow = liked && entry.follows_viewer;
        decisions.push(RecordedDecision {
            viewer: viewer.clone(),
            artist: artist.clone(),
            artist_name: entry.candidate.display_name.clone(),
            liked,
            mutual_follow,
            at: Utc::now(),
        });

        Ok(SwipeReceipt { mutual_follow })
    }
}

#[async_trait]
impl AnalyticsSource for LocalBackend {
    async fn fetch_summary(
        &self,
        viewer: &ViewerId,
    ) -> Result<AnalyticsSummary, CollaboratorError> {
        let decisions = self.decisions.lock().await;
        let mine: Vec<&RecordedDecision> =
            decisions.iter().filter(|d| &d.viewer == viewer).collect();

        let total_seen = mine.len() as u64;
        let total_liked = mine.iter().filter(|d| d.liked).count() as u64;
        let engagement_rate = if total_seen == 0 {
            0.0
        } else {
            total_liked as f64 / total_seen as f64 * 100.0
        };

        let recent_activity = mine
            .iter()
            .rev()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|d| RecentActivity {
                artist_id: d.artist.clone(),
                artist_name: d.artist_name.clone(),
                liked: d.liked,
                at: d.at,
            })
            .collect();

        Ok(AnalyticsSummary {
            total_seen,
            total_liked,
            total_passed: total_seen - total_liked,
            engagement_rate,
            mutual_follows: mine.iter().filter(|d| d.mutual_follow).count() as u64,
            recent_activity,
        })
    }
}
