use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::intervention::{Blocker, FacilitatorConfig, InterventionRecord};
use crate::session::{
    EventPayload, SessionEvent, SessionLifecyclePhase, SessionLifecycleUpdate, SessionSpec,
};
use crate::telemetry::events::record_intervention_fired;

use super::fanout::EventFanout;
use super::handle::SessionRuntimeHandle;
use super::report::RuntimeReport;
use super::state::SessionRuntimeState;
use super::traits::EventListener;

const TARGET: &str = "session_supervisor";

/// Registry of live session runtimes keyed by session id.
///
/// A runtime is created when its session goes live and discarded when the
/// session is stopped; pausing keeps it registered.
pub struct SessionSupervisor {
    config: RuntimeConfig,
    fanout: EventFanout,
    sessions: Mutex<HashMap<String, SessionRuntimeHandle>>,
}

impl SessionSupervisor {
    pub fn new(config: RuntimeConfig) -> Self {
        let fanout = EventFanout::new(
            config.event_buffer,
            config.lifecycle_buffer,
            config.listener_timeout,
        );
        Self {
            config,
            fanout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.fanout.subscribe_events()
    }

    pub fn subscribe_lifecycle(&self) -> broadcast::Receiver<SessionLifecycleUpdate> {
        self.fanout.subscribe_lifecycle()
    }

    pub async fn start_session_runtime(&self, spec: SessionSpec) -> Result<(), RuntimeError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&spec.id) {
            return Err(RuntimeError::AlreadyRunning(spec.id));
        }

        let session_id = spec.id.clone();
        let duration = spec.duration();
        let participants = spec.participants.len();
        let state = SessionRuntimeState::new(spec, super::now());
        let handle = super::spawn_runtime(state, self.fanout.clone(), self.config.tick_interval);
        sessions.insert(session_id.clone(), handle);
        drop(sessions);

        info!(
            target: TARGET,
            session_id = %session_id,
            participants,
            duration_secs = duration.as_secs(),
            "session runtime started"
        );
        self.fanout.emit_lifecycle(SessionLifecycleUpdate::new(
            session_id,
            SessionLifecyclePhase::Started,
        ));
        Ok(())
    }

    /// Freezes session time and blocks interventions; the scheduler keeps running.
    pub async fn pause_session_runtime(&self, session_id: &str) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        let paused = state.lock().await.pause(super::now());

        if let Some(clock) = paused {
            info!(target: TARGET, session_id, elapsed_secs = clock.elapsed.as_secs(), "session runtime paused");
            self.fanout.emit_lifecycle(SessionLifecycleUpdate::progress(
                session_id,
                SessionLifecyclePhase::Paused,
                &clock,
            ));
        }
        Ok(())
    }

    pub async fn resume_session_runtime(&self, session_id: &str) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        let resumed = state.lock().await.resume(super::now());

        if let Some(clock) = resumed {
            info!(target: TARGET, session_id, elapsed_secs = clock.elapsed.as_secs(), "session runtime resumed");
            self.fanout.emit_lifecycle(SessionLifecycleUpdate::progress(
                session_id,
                SessionLifecyclePhase::Resumed,
                &clock,
            ));
        }
        Ok(())
    }

    /// Cancels the scheduler and discards all per-session state.
    pub async fn stop_session_runtime(&self, session_id: &str) -> Result<RuntimeReport, RuntimeError> {
        let handle = self
            .sessions
            .lock()
            .await
            .remove(session_id)
            .ok_or_else(|| RuntimeError::SessionNotFound(session_id.to_string()))?;

        let report = handle.state().lock().await.report(super::now());
        drop(handle);

        info!(
            target: TARGET,
            session_id,
            interventions = report.interventions.total_interventions,
            elapsed_secs = report.elapsed_seconds,
            "session runtime stopped"
        );
        self.fanout.emit_lifecycle(SessionLifecycleUpdate::stopped(
            session_id,
            report.interventions.total_interventions,
            report.elapsed_seconds,
        ));
        Ok(report)
    }

    pub async fn stop_all(&self) -> Vec<RuntimeReport> {
        let ids: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        let mut reports = Vec::with_capacity(ids.len());
        for id in ids {
            if let Ok(report) = self.stop_session_runtime(&id).await {
                reports.push(report);
            }
        }
        reports
    }

    pub async fn record_speaker_activity(
        &self,
        session_id: &str,
        speaker_label: &str,
        is_speaking: bool,
    ) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        let mut guard = state.lock().await;
        guard.record_speaker_activity(speaker_label, is_speaking, super::now())
    }

    /// Completed turns reported per diarization label, in milliseconds. New
    /// labels bind to participants in the order given.
    pub async fn record_speaker_durations(
        &self,
        session_id: &str,
        durations: &[(String, i64)],
    ) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        let mut guard = state.lock().await;
        guard.record_speaker_durations(durations, super::now())
    }

    /// Coarse speech flag for sources without per-speaker attribution.
    pub async fn record_speech_activity(
        &self,
        session_id: &str,
        is_speaking: bool,
    ) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        state
            .lock()
            .await
            .record_speech_activity(is_speaking, super::now());
        Ok(())
    }

    pub async fn record_tension(&self, session_id: &str, score: f64) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        state.lock().await.record_tension(score);
        Ok(())
    }

    pub async fn record_goal_alignment(
        &self,
        session_id: &str,
        on_goal: bool,
    ) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        state.lock().await.record_goal_alignment(on_goal);
        Ok(())
    }

    pub async fn set_blocker(
        &self,
        session_id: &str,
        name: &str,
        active: bool,
    ) -> Result<(), RuntimeError> {
        let blocker: Blocker = name.parse()?;
        let state = self.session_state(session_id).await?;
        state.lock().await.set_blocker(blocker, active);
        Ok(())
    }

    pub async fn set_participant_names(
        &self,
        session_id: &str,
        names: HashMap<String, String>,
    ) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        state.lock().await.set_participant_names(names);
        Ok(())
    }

    pub async fn update_facilitator_config(
        &self,
        session_id: &str,
        config: FacilitatorConfig,
    ) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        state.lock().await.apply_config(config);
        info!(target: TARGET, session_id, "facilitator settings updated");
        Ok(())
    }

    /// Emits an icebreaker right away when the engine allows one.
    pub async fn trigger_icebreaker(
        &self,
        session_id: &str,
    ) -> Result<Option<InterventionRecord>, RuntimeError> {
        let state = self.session_state(session_id).await?;
        let (record, listeners) = {
            let mut guard = state.lock().await;
            (guard.trigger_icebreaker(super::now()), guard.listeners())
        };

        if let Some(record) = &record {
            record_intervention_fired(session_id, record);
            self.fanout
                .emit(
                    SessionEvent::new(session_id, EventPayload::Intervention(record.clone())),
                    &listeners,
                )
                .await;
        }
        Ok(record)
    }

    pub async fn add_listener(
        &self,
        session_id: &str,
        listener: Arc<dyn EventListener>,
    ) -> Result<(), RuntimeError> {
        let state = self.session_state(session_id).await?;
        state.lock().await.add_listener(listener);
        Ok(())
    }

    pub async fn report(&self, session_id: &str) -> Result<RuntimeReport, RuntimeError> {
        let state = self.session_state(session_id).await?;
        let report = state.lock().await.report(super::now());
        Ok(report)
    }

    pub async fn is_active(&self, session_id: &str) -> bool {
        self.sessions.lock().await.contains_key(session_id)
    }

    /// Whether the session's scheduler is still ticking (false once expired).
    pub async fn is_ticking(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .map(SessionRuntimeHandle::is_scheduler_running)
            .unwrap_or(false)
    }

    pub async fn active_sessions(&self) -> Vec<String> {
        self.sessions.lock().await.keys().cloned().collect()
    }

    async fn session_state(
        &self,
        session_id: &str,
    ) -> Result<Arc<Mutex<SessionRuntimeState>>, RuntimeError> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .map(SessionRuntimeHandle::state)
            .ok_or_else(|| RuntimeError::SessionNotFound(session_id.to_string()))
    }
}
