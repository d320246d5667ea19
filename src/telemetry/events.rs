use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::intervention::InterventionRecord;
use crate::session::SessionClock;

pub(crate) const TARGET: &str = "telemetry::facilitation";
pub(crate) const EVENT_INTERVENTION: &str = "intervention_fired";
pub(crate) const EVENT_LISTENER_FAILED: &str = "listener_failed";
pub(crate) const EVENT_SESSION_EXPIRED: &str = "session_expired";

#[derive(Debug, Serialize)]
pub struct InterventionFiredEvent<'a> {
    pub session_id: &'a str,
    pub intervention_id: &'a str,
    pub kind: &'static str,
    pub modality: &'static str,
    pub target_participant: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ListenerFailedEvent<'a> {
    pub session_id: &'a str,
    pub event_type: &'static str,
    pub error: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SessionExpiredEvent<'a> {
    pub session_id: &'a str,
    pub elapsed_ms: u64,
    pub duration_ms: u64,
}

pub fn record_intervention_fired(session_id: &str, record: &InterventionRecord) {
    let event = InterventionFiredEvent {
        session_id,
        intervention_id: &record.id,
        kind: record.kind.as_str(),
        modality: record.modality.as_str(),
        target_participant: record.target_participant.as_deref(),
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_INTERVENTION,
            session_id,
            kind = event.kind,
            modality = event.modality,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_INTERVENTION,
            %err,
            "failed to encode intervention event"
        ),
    }
}

pub fn record_listener_failed(session_id: &str, event_type: &'static str, error: &str) {
    let event = ListenerFailedEvent {
        session_id,
        event_type,
        error,
    };

    match serde_json::to_string(&event) {
        Ok(payload) => warn!(
            target: TARGET,
            event = EVENT_LISTENER_FAILED,
            session_id,
            event_type,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_LISTENER_FAILED,
            %err,
            "failed to encode listener failure event"
        ),
    }
}

pub fn record_session_expired(session_id: &str, clock: &SessionClock) {
    let event = SessionExpiredEvent {
        session_id,
        elapsed_ms: duration_to_ms(clock.elapsed),
        duration_ms: duration_to_ms(clock.duration),
    };

    match serde_json::to_string(&event) {
        Ok(payload) => info!(
            target: TARGET,
            event = EVENT_SESSION_EXPIRED,
            session_id,
            elapsed_ms = event.elapsed_ms,
            payload = %payload
        ),
        Err(err) => warn!(
            target: TARGET,
            event = EVENT_SESSION_EXPIRED,
            %err,
            "failed to encode session expiry event"
        ),
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_clamps_to_u64() {
        let duration = Duration::new(u64::MAX, 0);
        assert_eq!(duration_to_ms(duration), u64::MAX);
    }

    #[test]
    fn listener_failure_payload_is_flat_json() {
        let event = ListenerFailedEvent {
            session_id: "s-1",
            event_type: "time_remaining",
            error: "socket closed",
        };
        let value = serde_json::to_value(&event).expect("encode");
        assert_eq!(value["event_type"], "time_remaining");
        assert_eq!(value["error"], "socket closed");
    }
}
