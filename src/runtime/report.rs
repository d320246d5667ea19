use serde::Serialize;

use crate::balance::TrackerMetrics;
use crate::intervention::{InterventionRecord, InterventionStats};

/// Final or interim account of one session runtime, for the summary generator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeReport {
    pub session_id: String,
    pub goal: String,
    pub expired: bool,
    pub paused: bool,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    pub balance: TrackerMetrics,
    pub interventions: InterventionStats,
    pub history: Vec<InterventionRecord>,
}
