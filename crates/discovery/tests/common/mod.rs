//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use discovery::{
    ArtistFetcher, CollaboratorError, DiscoveryConfig, DiscoveryStack, Notification, Notifier,
    SwipeRecorder,
};
use profiles::{ArtistId, Candidate, SwipeReceipt, ViewerId};
use tokio::sync::Semaphore;

pub const VIEWER: &str = "v-1";

/// Candidates whose display name is the upper-cased id
pub fn candidates(ids: &[&str]) -> Vec<Candidate> {
    ids.iter()
        .map(|id| Candidate::new(*id, id.to_uppercase()))
        .collect()
}

pub fn ids(batch: &[Candidate]) -> Vec<String> {
    batch.iter().map(|c| c.id.to_string()).collect()
}

/// Poll `condition` until it holds, failing the test after two seconds
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ============================================================================
// Fetcher
// ============================================================================

/// Serves queued batches in order, then empty batches
pub struct ScriptedFetcher {
    batches: Mutex<VecDeque<Result<Vec<Candidate>, CollaboratorError>>>,
    calls: AtomicUsize,
    gate: Option<Semaphore>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            batches: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Every fetch blocks until `release` hands it a permit
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn push_batch(&self, ids: &[&str]) {
        self.batches.lock().unwrap().push_back(Ok(candidates(ids)));
    }

    pub fn push_error(&self, error: CollaboratorError) {
        self.batches.lock().unwrap().push_back(Err(error));
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    /// Number of fetches started, including ones still blocked on the gate
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtistFetcher for ScriptedFetcher {
    async fn fetch_batch(
        &self,
        _viewer: Option<&ViewerId>,
    ) -> Result<Vec<Candidate>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ============================================================================
// Recorder
// ============================================================================

/// Records every call; can fail on demand or report mutual follows
pub struct ScriptedRecorder {
    calls: Mutex<Vec<(ViewerId, ArtistId, bool)>>,
    failures: Mutex<VecDeque<CollaboratorError>>,
    mutual: Mutex<HashSet<ArtistId>>,
    gate: Option<Semaphore>,
}

impl ScriptedRecorder {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            mutual: Mutex::new(HashSet::new()),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// The next call fails with `error`
    pub fn fail_next(&self, error: CollaboratorError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// Likes on `id` report a mutual follow
    pub fn mutual_with(&self, id: &str) {
        self.mutual.lock().unwrap().insert(ArtistId::new(id));
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn calls(&self) -> Vec<(ViewerId, ArtistId, bool)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SwipeRecorder for ScriptedRecorder {
    async fn record(
        &self,
        viewer: &ViewerId,
        artist: &ArtistId,
        liked: bool,
    ) -> Result<SwipeReceipt, CollaboratorError> {
        self.calls
            .lock()
            .unwrap()
            .push((viewer.clone(), artist.clone(), liked));
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let mutual_follow = liked && self.mutual.lock().unwrap().contains(artist);
        Ok(SwipeReceipt { mutual_follow })
    }
}

// ============================================================================
// Notifier
// ============================================================================

#[derive(Default)]
pub struct CollectingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub stack: DiscoveryStack,
    pub fetcher: Arc<ScriptedFetcher>,
    pub recorder: Arc<ScriptedRecorder>,
    pub notifier: Arc<CollectingNotifier>,
}

fn build(fetcher: ScriptedFetcher, recorder: ScriptedRecorder, viewer: Option<ViewerId>) -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();

    let fetcher = Arc::new(fetcher);
    let recorder = Arc::new(recorder);
    let notifier = Arc::new(CollectingNotifier::default());

    let mut builder = DiscoveryStack::builder(fetcher.clone(), recorder.clone())
        .with_notifier(notifier.clone())
        .with_config(DiscoveryConfig::default());
    if let Some(viewer) = viewer {
        builder = builder.with_viewer(viewer);
    }

    Harness {
        stack: builder.build(),
        fetcher,
        recorder,
        notifier,
    }
}

/// Stack signed in as `VIEWER` with the default refill threshold
pub fn harness(fetcher: ScriptedFetcher, recorder: ScriptedRecorder) -> Harness {
    build(fetcher, recorder, Some(ViewerId::new(VIEWER)))
}

/// Stack with nobody signed in
pub fn signed_out_harness(fetcher: ScriptedFetcher, recorder: ScriptedRecorder) -> Harness {
    build(fetcher, recorder, None)
}
