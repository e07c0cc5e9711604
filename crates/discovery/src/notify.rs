//! User-facing notifications.
//!
//! Every failure in discovery degrades to a transient message plus an
//! unchanged, still-usable state. `Notifier` is the channel those messages
//! go out on; a UI shows them as toasts, the CLI prints them.

use profiles::ArtistId;
use std::fmt;
use tracing::{info, warn};

/// A transient message for the viewer
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A swipe was attempted without a signed-in viewer
    SignInRequired,
    /// Recording a decision failed; the card stays put
    SwipeFailed { artist: ArtistId, reason: String },
    /// Fetching a batch failed
    LoadFailed { reason: String },
    /// A like completed a reciprocal follow
    MutualFollow {
        artist: ArtistId,
        display_name: String,
    },
    /// Fetching analytics failed
    AnalyticsFailed { reason: String },
}

impl Notification {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Notification::MutualFollow { .. })
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::SignInRequired => write!(f, "Please sign in to discover artists"),
            Notification::SwipeFailed { reason, .. } => {
                write!(f, "Failed to record swipe: {}", reason)
            }
            Notification::LoadFailed { reason } => {
                write!(f, "Failed to load artists: {}", reason)
            }
            Notification::MutualFollow { display_name, .. } => {
                write!(f, "It's a match! You and {} now follow each other", display_name)
            }
            Notification::AnalyticsFailed { reason } => {
                write!(f, "Failed to load analytics: {}", reason)
            }
        }
    }
}

/// Receives notifications; implementations must not block
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sends notifications to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        if notification.is_failure() {
            warn!("{}", notification);
        } else {
            info!("{}", notification);
        }
    }
}
