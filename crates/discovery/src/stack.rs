//! Discovery Stack Controller
//!
//! Holds the in-memory queue of artist candidates and a cursor into it.
//! Each recorded decision advances the cursor by exactly one; when the
//! unseen tail gets short, a background refill appends a fresh batch.
//!
//! ## Lifecycle
//! empty → populated → draining → near-empty → refill-triggered → populated
//!
//! ## Guards
//! - `swiping`: one decision in flight at a time; overlapping calls get `Busy`
//! - `refilling`: at most one background refill
//! - `fetch_gate`: a load and a refill never fetch-and-apply concurrently
//! - `generation`: bumped on every replace, so a refill that was triggered
//!   against an older stack is dropped instead of appended
//!
//! State is never locked across an external call.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use profiles::{ArtistId, Candidate, ViewerId};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::DiscoveryConfig;
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::traits::{ArtistFetcher, SwipeRecorder};

/// Result of a `decide` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecideOutcome {
    /// The recorder accepted the decision and the cursor moved on
    Recorded {
        artist: ArtistId,
        liked: bool,
        mutual_follow: bool,
        refill_triggered: bool,
    },
    /// Nothing to decide on; stack and cursor untouched
    NoCandidate,
    /// No signed-in viewer; a sign-in prompt was emitted
    SignInRequired,
    /// Another decision is still in flight
    Busy,
    /// The recorder failed; the same candidate stays current
    Failed { reason: String },
}

impl DecideOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, DecideOutcome::Recorded { .. })
    }
}

/// Result of a `load_stack` or `reset` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    Failed { reason: String },
}

/// Point-in-time view of the cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackSnapshot {
    pub cursor: usize,
    pub len: usize,
    pub remaining: usize,
}

// =============================================================================
// Stack state
// =============================================================================

#[derive(Debug, Default)]
struct StackState {
    candidates: Vec<Candidate>,
    /// Invariant: cursor <= candidates.len()
    cursor: usize,
    generation: u64,
    viewer: Option<ViewerId>,
}

impl StackState {
    fn current(&self) -> Option<&Candidate> {
        self.candidates.get(self.cursor)
    }

    fn upcoming(&self) -> Option<&Candidate> {
        self.candidates.get(self.cursor + 1)
    }

    fn remaining(&self) -> usize {
        self.candidates.len().saturating_sub(self.cursor)
    }

    fn advance(&mut self) {
        if self.cursor < self.candidates.len() {
            self.cursor += 1;
        }
    }

    /// Swap in a fresh batch and rewind; returns the new length
    fn replace(&mut self, batch: Vec<Candidate>) -> usize {
        self.candidates.clear();
        self.cursor = 0;
        self.generation += 1;
        self.append(batch);
        self.candidates.len()
    }

    /// Append candidates whose id is not already queued; returns how many
    /// were added
    fn append(&mut self, batch: Vec<Candidate>) -> usize {
        let mut known: HashSet<ArtistId> =
            self.candidates.iter().map(|c| c.id.clone()).collect();
        let before = self.candidates.len();
        for candidate in batch {
            if known.insert(candidate.id.clone()) {
                self.candidates.push(candidate);
            }
        }
        self.candidates.len() - before
    }

    fn snapshot(&self) -> StackSnapshot {
        StackSnapshot {
            cursor: self.cursor,
            len: self.candidates.len(),
            remaining: self.remaining(),
        }
    }
}

/// Clears the swiping flag when a decision finishes, on every path
struct SwipeGuard<'a>(&'a AtomicBool);

impl<'a> SwipeGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SwipeGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owned by the refill task; clears the refilling flag when it ends
struct RefillGuard(Arc<Inner>);

impl RefillGuard {
    fn acquire(inner: &Arc<Inner>) -> Option<Self> {
        inner
            .refilling
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(inner)))
    }
}

impl Drop for RefillGuard {
    fn drop(&mut self) {
        self.0.refilling.store(false, Ordering::Release);
    }
}

// =============================================================================
// Controller
// =============================================================================

struct Inner {
    fetcher: Arc<dyn ArtistFetcher>,
    recorder: Arc<dyn SwipeRecorder>,
    notifier: Arc<dyn Notifier>,
    config: DiscoveryConfig,
    state: RwLock<StackState>,
    swiping: AtomicBool,
    refilling: AtomicBool,
    fetch_gate: Mutex<()>,
    refill_task: Mutex<Option<JoinHandle<()>>>,
}

/// Builder for `DiscoveryStack`
pub struct DiscoveryStackBuilder {
    fetcher: Arc<dyn ArtistFetcher>,
    recorder: Arc<dyn SwipeRecorder>,
    notifier: Arc<dyn Notifier>,
    config: DiscoveryConfig,
    viewer: Option<ViewerId>,
}

impl DiscoveryStackBuilder {
    /// Where user-facing messages go (default: the tracing log)
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_config(mut self, config: DiscoveryConfig) -> Self {
        self.config = config;
        self
    }

    /// Start signed in as `viewer`
    pub fn with_viewer(mut self, viewer: ViewerId) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn build(self) -> DiscoveryStack {
        DiscoveryStack {
            inner: Arc::new(Inner {
                fetcher: self.fetcher,
                recorder: self.recorder,
                notifier: self.notifier,
                config: self.config,
                state: RwLock::new(StackState {
                    viewer: self.viewer,
                    ..Default::default()
                }),
                swiping: AtomicBool::new(false),
                refilling: AtomicBool::new(false),
                fetch_gate: Mutex::new(()),
                refill_task: Mutex::new(None),
            }),
        }
    }
}

/// The swipe deck: candidate queue, cursor and refill policy.
///
/// Clones share the same deck, so a UI task and a spawned refill can both
/// hold one.
#[derive(Clone)]
pub struct DiscoveryStack {
    inner: Arc<Inner>,
}

impl DiscoveryStack {
    pub fn builder(
        fetcher: Arc<dyn ArtistFetcher>,
        recorder: Arc<dyn SwipeRecorder>,
    ) -> DiscoveryStackBuilder {
        DiscoveryStackBuilder {
            fetcher,
            recorder,
            notifier: Arc::new(TracingNotifier),
            config: DiscoveryConfig::default(),
            viewer: None,
        }
    }

    pub fn config(&self) -> DiscoveryConfig {
        self.inner.config
    }

    /// Sign in (`Some`) or out (`None`)
    pub async fn set_viewer(&self, viewer: Option<ViewerId>) {
        self.inner.state.write().await.viewer = viewer;
    }

    pub async fn viewer(&self) -> Option<ViewerId> {
        self.inner.state.read().await.viewer.clone()
    }

    /// The candidate awaiting a decision, if any
    pub async fn current(&self) -> Option<Candidate> {
        self.inner.state.read().await.current().cloned()
    }

    /// The candidate after the current one (the background card)
    pub async fn next(&self) -> Option<Candidate> {
        self.inner.state.read().await.upcoming().cloned()
    }

    /// Candidates not yet decided on, current first
    pub async fn pending(&self) -> Vec<Candidate> {
        let state = self.inner.state.read().await;
        state.candidates[state.cursor..].to_vec()
    }

    pub async fn remaining_count(&self) -> usize {
        self.inner.state.read().await.remaining()
    }

    pub async fn cursor(&self) -> usize {
        self.inner.state.read().await.cursor
    }

    pub async fn len(&self) -> usize {
        self.inner.state.read().await.candidates.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.state.read().await.candidates.is_empty()
    }

    /// True when every queued candidate has been decided on
    pub async fn is_exhausted(&self) -> bool {
        self.inner.state.read().await.remaining() == 0
    }

    pub async fn snapshot(&self) -> StackSnapshot {
        self.inner.state.read().await.snapshot()
    }

    /// Fetch a batch and replace the stack with it, rewinding the cursor.
    ///
    /// Exactly one fetch per call, no retry. On failure the stack is left
    /// as it was and a `LoadFailed` notification goes out. Waits behind an
    /// in-flight refill rather than racing it.
    #[instrument(skip(self))]
    pub async fn load_stack(&self) -> LoadOutcome {
        let _gate = self.inner.fetch_gate.lock().await;
        let viewer = self.viewer().await;

        match self.inner.fetcher.fetch_batch(viewer.as_ref()).await {
            Ok(batch) => {
                let fetched = batch.len();
                let count = self.inner.state.write().await.replace(batch);
                if count < fetched {
                    debug!("Dropped {} duplicate candidates from batch", fetched - count);
                }
                info!("Loaded {} candidates", count);
                LoadOutcome::Loaded { count }
            }
            Err(e) => {
                warn!("Failed to load candidates: {}", e);
                self.inner.notifier.notify(Notification::LoadFailed {
                    reason: e.to_string(),
                });
                LoadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Rewind the cursor, then load a fresh batch
    #[instrument(skip(self))]
    pub async fn reset(&self) -> LoadOutcome {
        self.inner.state.write().await.cursor = 0;
        self.load_stack().await
    }

    /// Record a like (`true`) or pass (`false`) on the current candidate.
    ///
    /// The cursor advances only after the recorder succeeds. A successful
    /// decision that leaves `refill_threshold` or fewer cards triggers one
    /// background refill.
    #[instrument(skip(self))]
    pub async fn decide(&self, liked: bool) -> DecideOutcome {
        let Some(_swiping) = SwipeGuard::acquire(&self.inner.swiping) else {
            debug!("Decision already in flight");
            return DecideOutcome::Busy;
        };

        let (viewer, candidate, generation) = {
            let state = self.inner.state.read().await;
            let Some(candidate) = state.current().cloned() else {
                debug!("No current candidate");
                return DecideOutcome::NoCandidate;
            };
            let Some(viewer) = state.viewer.clone() else {
                self.inner.notifier.notify(Notification::SignInRequired);
                return DecideOutcome::SignInRequired;
            };
            (viewer, candidate, state.generation)
        };

        let receipt = match self
            .inner
            .recorder
            .record(&viewer, &candidate.id, liked)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("Failed to record swipe on {}: {}", candidate.id, e);
                self.inner.notifier.notify(Notification::SwipeFailed {
                    artist: candidate.id.clone(),
                    reason: e.to_string(),
                });
                return DecideOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let (remaining, generation) = {
            let mut state = self.inner.state.write().await;
            let still_current = state.generation == generation
                && state.current().map(|c| &c.id) == Some(&candidate.id);
            if still_current {
                state.advance();
            } else {
                debug!(
                    "Stack changed while recording {}; cursor left in place",
                    candidate.id
                );
            }
            (state.remaining(), state.generation)
        };

        debug!(
            "Recorded {} on {} ({} remaining)",
            if liked { "like" } else { "pass" },
            candidate.id,
            remaining
        );

        if receipt.mutual_follow {
            self.inner.notifier.notify(Notification::MutualFollow {
                artist: candidate.id.clone(),
                display_name: candidate.display_name.clone(),
            });
        }

        let refill_triggered =
            remaining <= self.inner.config.refill_threshold && self.spawn_refill(generation).await;

        DecideOutcome::Recorded {
            artist: candidate.id,
            liked,
            mutual_follow: receipt.mutual_follow,
            refill_triggered,
        }
    }

    /// Wait for the in-flight refill, if there is one
    pub async fn settle(&self) {
        let handle = self.inner.refill_task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Refill task ended abnormally: {}", e);
            }
        }
    }

    /// Start a background refill unless one is already running
    async fn spawn_refill(&self, generation: u64) -> bool {
        // Hold the slot while acquiring so a finished task's handle can
        // never overwrite a newer one
        let mut slot = self.inner.refill_task.lock().await;
        let Some(guard) = RefillGuard::acquire(&self.inner) else {
            debug!("Refill already in flight");
            return false;
        };

        let this = self.clone();
        *slot = Some(tokio::spawn(async move {
            let _guard = guard;
            this.refill(generation).await;
        }));
        true
    }

    /// Fetch a batch and append its unseen candidates
    async fn refill(&self, generation: u64) {
        let _gate = self.inner.fetch_gate.lock().await;

        let viewer = {
            let state = self.inner.state.read().await;
            if state.generation != generation {
                debug!("Stack was replaced before refill ran; skipping");
                return;
            }
            state.viewer.clone()
        };

        match self.inner.fetcher.fetch_batch(viewer.as_ref()).await {
            Ok(batch) => {
                let fetched = batch.len();
                let mut state = self.inner.state.write().await;
                let added = state.append(batch);
                info!(
                    "Refilled stack: fetched {}, appended {} (total {})",
                    fetched,
                    added,
                    state.candidates.len()
                );
            }
            Err(e) => {
                warn!("Refill failed: {}", e);
                self.inner.notifier.notify(Notification::LoadFailed {
                    reason: e.to_string(),
                });
            }
        }
    }
}
