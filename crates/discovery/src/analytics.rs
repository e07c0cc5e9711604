//! Analytics Aggregator
//!
//! Read-through access to the viewer's discovery statistics. There is no
//! cache: every `summary` call is a fresh round trip. Formatting lives on
//! `AnalyticsSummary` itself; this module adds report rendering.

use std::sync::Arc;

use profiles::{AnalyticsSummary, ViewerId};
use tracing::{debug, instrument, warn};

use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::traits::{AnalyticsSource, CollaboratorError};

/// Fetches and renders discovery analytics
#[derive(Clone)]
pub struct AnalyticsAggregator {
    source: Arc<dyn AnalyticsSource>,
    notifier: Arc<dyn Notifier>,
}

impl AnalyticsAggregator {
    pub fn new(source: Arc<dyn AnalyticsSource>) -> Self {
        Self {
            source,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Fetch a fresh summary for `viewer`
    #[instrument(skip(self))]
    pub async fn summary(&self, viewer: &ViewerId) -> Result<AnalyticsSummary, CollaboratorError> {
        match self.source.fetch_summary(viewer).await {
            Ok(summary) => {
                debug!(
                    "Fetched analytics: seen {}, liked {}, passed {}",
                    summary.total_seen, summary.total_liked, summary.total_passed
                );
                Ok(summary)
            }
            Err(e) => {
                warn!("Failed to fetch analytics: {}", e);
                self.notifier.notify(Notification::AnalyticsFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

/// Render a summary as display lines, showing at most `recent` activity rows
pub fn render_report(summary: &AnalyticsSummary, recent: usize) -> Vec<String> {
    let mut lines = vec![
        format!("Artists seen:   {}", summary.total_seen),
        format!("Liked:          {}", summary.total_liked),
        format!("Passed:         {}", summary.total_passed),
        format!("Like rate:      {:.1}%", summary.like_rate() * 100.0),
        format!("Engagement:     {}", summary.formatted_engagement()),
        format!("Mutual follows: {}", summary.mutual_follows),
    ];

    let rows = summary.recent(recent);
    if !rows.is_empty() {
        lines.push("Recent activity:".to_string());
        for row in rows {
            lines.push(format!(
                "  {} {} ({})",
                if row.liked { "♥" } else { "✕" },
                row.artist_name,
                row.at.format("%Y-%m-%d %H:%M")
            ));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use profiles::{ArtistId, RecentActivity};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl AnalyticsSource for CountingSource {
        async fn fetch_summary(
            &self,
            _viewer: &ViewerId,
        ) -> Result<AnalyticsSummary, CollaboratorError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64 + 1;
            if self.fail {
                return Err(CollaboratorError::Unavailable("connection reset".into()));
            }
            Ok(AnalyticsSummary {
                total_seen: call * 10,
                total_liked: call * 4,
                total_passed: call * 6,
                engagement_rate: 40.0,
                ..Default::default()
            })
        }
    }

    #[derive(Default)]
    struct Collected(Mutex<Vec<Notification>>);

    impl Notifier for Collected {
        fn notify(&self, notification: Notification) {
            self.0.lock().unwrap().push(notification);
        }
    }

    #[tokio::test]
    async fn test_every_summary_is_a_fresh_fetch() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let aggregator = AnalyticsAggregator::new(source.clone());
        let viewer = ViewerId::new("v-1");

        let first = aggregator.summary(&viewer).await.unwrap();
        let second = aggregator.summary(&viewer).await.unwrap();

        assert_eq!(first.total_seen, 10);
        assert_eq!(second.total_seen, 20);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_notifies_and_returns_error() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let notifier = Arc::new(Collected::default());
        let aggregator = AnalyticsAggregator::new(source).with_notifier(notifier.clone());

        let result = aggregator.summary(&ViewerId::new("v-1")).await;
        assert!(matches!(result, Err(CollaboratorError::Unavailable(_))));

        let notes = notifier.0.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert!(matches!(notes[0], Notification::AnalyticsFailed { .. }));
    }

    #[test]
    fn test_render_report() {
        let summary = AnalyticsSummary {
            total_seen: 4,
            total_liked: 1,
            total_passed: 3,
            engagement_rate: 25.0,
            mutual_follows: 1,
            recent_activity: vec![RecentActivity {
                artist_id: ArtistId::new("a-1"),
                artist_name: "Nova".to_string(),
                liked: true,
                at: Utc.with_ymd_and_hms(2026, 10, 1, 12, 30, 0).unwrap(),
            }],
        };

        let lines = render_report(&summary, 5);
        assert!(lines.contains(&"Like rate:      25.0%".to_string()));
        assert!(lines.contains(&"Engagement:     25.0%".to_string()));
        assert_eq!(lines.last().unwrap(), "  ♥ Nova (2026-10-01 12:30)");
    }

    #[test]
    fn test_render_report_without_activity() {
        let lines = render_report(&AnalyticsSummary::default(), 5);
        assert_eq!(lines.len(), 6);
        assert!(!lines.iter().any(|l| l.starts_with("Recent")));
    }
}
