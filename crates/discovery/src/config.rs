//! Tuning knobs for the discovery controller.

/// Remaining-card count at or below which a refill is triggered
pub const DEFAULT_REFILL_THRESHOLD: usize = 2;

/// Configuration for a `DiscoveryStack`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Refill once `len - cursor` drops to this value or lower
    pub refill_threshold: usize,
}

impl DiscoveryConfig {
    pub fn new() -> Self {
        Self {
            refill_threshold: DEFAULT_REFILL_THRESHOLD,
        }
    }

    /// Configure the refill threshold (default: 2)
    pub fn with_refill_threshold(mut self, threshold: usize) -> Self {
        self.refill_threshold = threshold;
        self
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::new()
    }
}
