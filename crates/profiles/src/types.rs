//! Core domain types for artist discovery.
//!
//! This module defines the data that flows between the discovery controller
//! and the external function endpoints:
//! - Identity newtypes (ArtistId, ViewerId) so the two can never be swapped
//! - Candidate: the artist profile snapshot shown on a swipe card
//! - SwipeReceipt: what the recorder reports back for a decision
//! - AnalyticsSummary: the read-only aggregate shown on the stats panel
//!
//! All types serialize to the JSON shape the endpoints speak.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Identities
// =============================================================================
// The backend hands out UUID strings for both artists and viewers. Wrapping
// them keeps a viewer id from being passed where an artist id is expected.

/// Unique identifier for an artist profile
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(String);

impl ArtistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtistId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ArtistId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identity of the signed-in user doing the swiping
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewerId(String);

impl ViewerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// Candidate
// =============================================================================

/// Kind of media attached to a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
    Image,
}

/// A media sample an artist pinned to their card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSample {
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// An artist profile snapshot surfaced for swiping.
///
/// Candidates are immutable once fetched. Optional fields default when the
/// endpoint omits them, so sparse profiles still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: ArtistId,
    pub display_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub media_samples: Vec<MediaSample>,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Candidate {
    /// Create a bare candidate with only an id and display name
    pub fn new(id: impl Into<ArtistId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            username: None,
            bio: None,
            genres: Vec::new(),
            media_samples: Vec::new(),
            follower_count: 0,
            view_count: 0,
            avatar_url: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_media(mut self, sample: MediaSample) -> Self {
        self.media_samples.push(sample);
        self
    }

    pub fn with_counts(mut self, followers: u64, views: u64) -> Self {
        self.follower_count = followers;
        self.view_count = views;
        self
    }

    /// Display name followed by the handle when one is set
    pub fn headline(&self) -> String {
        match &self.username {
            Some(username) => format!("{} (@{})", self.display_name, username),
            None => self.display_name.clone(),
        }
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// Acknowledgement returned by the swipe recorder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeReceipt {
    /// True when this like completed a reciprocal follow
    pub mutual_follow: bool,
}

// =============================================================================
// Analytics
// =============================================================================

/// One row of the viewer's recent swipe history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub liked: bool,
    pub at: DateTime<Utc>,
}

/// Aggregate discovery statistics for a viewer.
///
/// Fetched on demand and never mutated locally; refresh by fetching again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total_seen: u64,
    #[serde(default)]
    pub total_liked: u64,
    #[serde(default)]
    pub total_passed: u64,
    /// Percentage in the range 0 to 100
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default)]
    pub mutual_follows: u64,
    #[serde(default)]
    pub recent_activity: Vec<RecentActivity>,
}

impl AnalyticsSummary {
    /// Fraction of seen artists that were liked, 0.0 when nothing was seen
    pub fn like_rate(&self) -> f64 {
        if self.total_seen == 0 {
            return 0.0;
        }
        self.total_liked as f64 / self.total_seen as f64
    }

    /// Engagement rate formatted for display, e.g. "42.5%"
    pub fn formatted_engagement(&self) -> String {
        format!("{:.1}%", self.engagement_rate)
    }

    /// The `limit` newest activity rows, newest first
    pub fn recent(&self, limit: usize) -> Vec<&RecentActivity> {
        let mut rows: Vec<&RecentActivity> = self.recent_activity.iter().collect();
        rows.sort_by(|a, b| b.at.cmp(&a.at));
        rows.truncate(limit);
        rows
    }
}
