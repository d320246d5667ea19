mod scheduler;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::config::RuntimeConfig;
use crate::intervention::FacilitatorConfig;
use crate::runtime::{EventListener, SessionSupervisor};
use crate::session::{
    EventPayload, Participant, ParticipantRole, SessionEvent, SessionLifecycleUpdate, SessionSpec,
};

fn supervisor() -> SessionSupervisor {
    SessionSupervisor::new(RuntimeConfig::default())
}

fn spec(id: &str, duration_minutes: i64) -> SessionSpec {
    SessionSpec {
        id: id.to_string(),
        goal: "agree on a budget".to_string(),
        participants: vec![
            Participant::new("p-a", "Avery", ParticipantRole::Creator),
            Participant::new("p-b", "Blair", ParticipantRole::Invitee),
        ],
        duration_minutes,
        facilitator: FacilitatorConfig::default(),
    }
}

fn drain_events(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            // A lagged receiver skips to the oldest retained event; keep draining.
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    events
}

fn drain_lifecycle(rx: &mut broadcast::Receiver<SessionLifecycleUpdate>) -> Vec<SessionLifecycleUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}

fn remaining_seconds(events: &[SessionEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|event| match &event.payload {
            EventPayload::TimeRemaining(remaining) => Some(remaining.total_seconds_remaining),
            _ => None,
        })
        .collect()
}

#[derive(Default)]
struct CollectingListener {
    events: Mutex<Vec<SessionEvent>>,
}

impl CollectingListener {
    fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().expect("events lock poisoned").clone()
    }
}

#[async_trait]
impl EventListener for CollectingListener {
    async fn deliver(&self, event: &SessionEvent) -> Result<()> {
        self.events
            .lock()
            .expect("events lock poisoned")
            .push(event.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FailingListener {
    attempts: Mutex<usize>,
}

#[async_trait]
impl EventListener for FailingListener {
    async fn deliver(&self, _event: &SessionEvent) -> Result<()> {
        *self.attempts.lock().expect("attempts lock poisoned") += 1;
        Err(anyhow!("socket closed"))
    }
}

struct StalledListener {
    delay: Duration,
}

#[async_trait]
impl EventListener for StalledListener {
    async fn deliver(&self, _event: &SessionEvent) -> Result<()> {
        sleep(self.delay).await;
        Ok(())
    }
}

fn shared<T: EventListener + 'static>(listener: T) -> (Arc<T>, Arc<dyn EventListener>) {
    let listener = Arc::new(listener);
    let erased: Arc<dyn EventListener> = listener.clone();
    (listener, erased)
}
