//! Talk-time accounting and balance classification.

mod sustained;
mod tracker;
mod types;

use std::time::Duration;

pub(crate) use sustained::SustainedCondition;
pub use tracker::BalanceTracker;
pub use types::{
    BalanceReport, BalanceShares, BalanceSnapshot, BalanceStatus, BalanceTrigger,
    ParticipantShare, SpeakerMetrics, SpeakerSummary, TrackerMetrics,
};

/// Largest percentage-point gap still considered balanced (67/33).
pub const MILD_IMBALANCE_THRESHOLD: u8 = 35;
/// Largest gap still considered a mild imbalance (70/30).
pub const SEVERE_IMBALANCE_THRESHOLD: u8 = 40;
pub const MILD_IMBALANCE_DURATION: Duration = Duration::from_secs(3 * 60);
pub const SEVERE_IMBALANCE_DURATION: Duration = Duration::from_secs(5 * 60);
