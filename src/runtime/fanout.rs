use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::warn;

use crate::session::{SessionEvent, SessionLifecycleUpdate};
use crate::telemetry::events::record_listener_failed;

use super::traits::EventListener;

/// Delivers events to the crate-wide bus and to registered listeners.
#[derive(Clone)]
pub(crate) struct EventFanout {
    events_tx: broadcast::Sender<SessionEvent>,
    lifecycle_tx: broadcast::Sender<SessionLifecycleUpdate>,
    listener_timeout: Duration,
}

impl EventFanout {
    pub(crate) fn new(event_buffer: usize, lifecycle_buffer: usize, listener_timeout: Duration) -> Self {
        let (events_tx, _) = broadcast::channel(event_buffer.max(1));
        let (lifecycle_tx, _) = broadcast::channel(lifecycle_buffer.max(1));
        Self {
            events_tx,
            lifecycle_tx,
            listener_timeout,
        }
    }

    pub(crate) fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    pub(crate) fn subscribe_lifecycle(&self) -> broadcast::Receiver<SessionLifecycleUpdate> {
        self.lifecycle_tx.subscribe()
    }

    /// Listener errors and timeouts are logged and skipped.
    pub(crate) async fn emit(&self, event: SessionEvent, listeners: &[Arc<dyn EventListener>]) {
        // No subscribers is not an error.
        let _ = self.events_tx.send(event.clone());

        for listener in listeners {
            match timeout(self.listener_timeout, listener.deliver(&event)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    record_listener_failed(&event.session_id, event.event_type(), &err.to_string())
                }
                Err(_) => record_listener_failed(
                    &event.session_id,
                    event.event_type(),
                    "delivery timed out",
                ),
            }
        }
    }

    pub(crate) fn emit_lifecycle(&self, update: SessionLifecycleUpdate) {
        if let Err(err) = self.lifecycle_tx.send(update) {
            warn!(
                target: "session_supervisor",
                %err,
                "failed to broadcast lifecycle update"
            );
        }
    }
}
