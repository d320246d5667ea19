use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::balance::BalanceSnapshot;
use crate::intervention::InterventionRecord;

use super::timer::SessionClock;

/// Outbound envelope: `{ "type", "data", "timestamp" }`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvent {
    #[serde(skip)]
    pub session_id: String,
    #[serde(flatten)]
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
}

impl SessionEvent {
    pub fn new(session_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            session_id: session_id.into(),
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    TimeRemaining(TimeRemaining),
    BalanceUpdate(BalanceSnapshot),
    Intervention(InterventionRecord),
}

impl EventPayload {
    pub fn event_type(&self) -> &'static str {
        match self {
            EventPayload::TimeRemaining(_) => "time_remaining",
            EventPayload::BalanceUpdate(_) => "balance_update",
            EventPayload::Intervention(_) => "intervention",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRemaining {
    pub minutes: u64,
    pub seconds: u64,
    pub total_seconds_remaining: u64,
    pub percent_complete: u8,
}

impl TimeRemaining {
    pub fn from_clock(clock: &SessionClock) -> Self {
        let total = clock
            .duration
            .as_secs()
            .saturating_sub(clock.elapsed.as_secs());
        Self {
            minutes: total / 60,
            seconds: total % 60,
            total_seconds_remaining: total,
            percent_complete: clock.percent_complete(),
        }
    }
}
