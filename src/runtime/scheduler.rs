use std::sync::Weak;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

use crate::session::{
    EventPayload, SessionEvent, SessionLifecyclePhase, SessionLifecycleUpdate,
};
use crate::telemetry::events::{record_intervention_fired, record_session_expired};

use super::fanout::EventFanout;
use super::state::{SessionRuntimeState, TickOutcome};

const TARGET: &str = "session_runtime";

/// Drives one session until its time runs out or its state is dropped.
pub(crate) async fn run_scheduler(
    state: Weak<Mutex<SessionRuntimeState>>,
    fanout: EventFanout,
    tick_interval: Duration,
) {
    loop {
        let Some(state) = state.upgrade() else {
            debug!(target: TARGET, "session state dropped; scheduler exiting");
            break;
        };

        let now = super::now();
        let (session_id, outcome, listeners) = {
            let mut guard = state.lock().await;
            let outcome = guard.tick(now);
            (guard.session_id().to_string(), outcome, guard.listeners())
        };
        drop(state);

        if let TickOutcome::Running { clock, events } = outcome {
            for payload in events {
                if let EventPayload::Intervention(record) = &payload {
                    record_intervention_fired(&session_id, record);
                }
                fanout
                    .emit(SessionEvent::new(session_id.as_str(), payload), &listeners)
                    .await;
            }

            if clock.is_expired() {
                record_session_expired(&session_id, &clock);
                fanout.emit_lifecycle(SessionLifecycleUpdate::progress(
                    session_id,
                    SessionLifecyclePhase::Expired,
                    &clock,
                ));
                break;
            }
        }

        sleep(tick_interval).await;
    }
}
