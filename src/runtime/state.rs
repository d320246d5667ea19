use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::balance::{BalanceReport, BalanceStatus, BalanceTracker};
use crate::error::RuntimeError;
use crate::intervention::{
    Blocker, EvaluationInput, FacilitatorConfig, InterventionEngine, InterventionKind,
    InterventionRecord,
};
use crate::session::{
    EventPayload, SessionClock, SessionSpec, SessionTimer, SpeakerResolver, TimeRemaining,
};

use super::report::RuntimeReport;
use super::traits::EventListener;

const TARGET: &str = "session_runtime";

pub(crate) enum TickOutcome {
    Paused,
    Running {
        clock: SessionClock,
        events: Vec<EventPayload>,
    },
}

/// Everything one live session owns. Mutated only under the session lock.
pub(crate) struct SessionRuntimeState {
    session_id: String,
    goal: String,
    participant_names: HashMap<String, String>,
    timer: SessionTimer,
    tracker: BalanceTracker,
    engine: InterventionEngine,
    resolver: SpeakerResolver,
    listeners: Vec<Arc<dyn EventListener>>,
    speech_active: bool,
    silence_anchor: Instant,
    tension_score: f64,
    on_goal: bool,
    expired: bool,
}

impl SessionRuntimeState {
    pub(crate) fn new(spec: SessionSpec, now: Instant) -> Self {
        let participant_names = spec.participant_names();
        let mut engine = InterventionEngine::new(spec.facilitator.clone());
        engine.set_participant_names(participant_names.clone());

        let duration = spec.duration();
        let participant_ids = spec
            .participants
            .iter()
            .map(|participant| participant.id.clone())
            .collect();

        Self {
            session_id: spec.id,
            goal: spec.goal,
            participant_names,
            timer: SessionTimer::new(now, duration),
            tracker: BalanceTracker::new(now),
            engine,
            resolver: SpeakerResolver::new(participant_ids),
            listeners: Vec::new(),
            speech_active: false,
            silence_anchor: now,
            tension_score: 0.0,
            on_goal: true,
            expired: false,
        }
    }

    pub(crate) fn session_id(&self) -> &str {
        &self.session_id
    }

    pub(crate) fn listeners(&self) -> Vec<Arc<dyn EventListener>> {
        self.listeners.clone()
    }

    pub(crate) fn add_listener(&mut self, listener: Arc<dyn EventListener>) {
        self.listeners.push(listener);
    }

    /// One scheduler step. Payloads come back in emission order.
    pub(crate) fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.timer.is_paused() {
            return TickOutcome::Paused;
        }

        let clock = self.timer.clock(now);
        let mut events = vec![EventPayload::TimeRemaining(TimeRemaining::from_clock(&clock))];

        let report = self.tracker.report(now);
        let report = BalanceReport {
            balance: report.balance.with_names(&self.participant_names),
            ..report
        };
        if !report.balance.is_waiting() {
            events.push(EventPayload::BalanceUpdate(report.balance.clone()));
        }

        let trigger = self.tracker.check_intervention_trigger(now);
        if let Some(trigger) = trigger {
            debug!(target: TARGET, session_id = %self.session_id, trigger = trigger.as_str(), "sustained imbalance");
        }
        let input = EvaluationInput {
            balance_status: BalanceStatus::from_trigger(trigger),
            balance: report,
            silence: self.silence(now),
            tension_score: self.tension_score,
            on_goal: self.on_goal,
            goal: self.goal.clone(),
        };

        if let Some(record) = self.engine.evaluate(&input, &clock) {
            if record.kind == InterventionKind::Balance {
                self.tracker.reset_intervention_timers();
            }
            events.push(EventPayload::Intervention(record));
        }

        if clock.is_expired() {
            self.expired = true;
        }

        TickOutcome::Running { clock, events }
    }

    fn anyone_speaking(&self) -> bool {
        self.speech_active || self.tracker.is_anyone_speaking()
    }

    fn silence(&self, now: Instant) -> Option<Duration> {
        if self.anyone_speaking() {
            None
        } else {
            Some(now.saturating_duration_since(self.silence_anchor))
        }
    }

    fn after_speech_change(&mut self, was_speaking: bool, now: Instant) {
        if was_speaking && !self.anyone_speaking() {
            self.silence_anchor = now;
        }
    }

    pub(crate) fn record_speaker_activity(
        &mut self,
        label: &str,
        is_speaking: bool,
        now: Instant,
    ) -> Result<(), RuntimeError> {
        let Some(participant) = self.resolver.resolve(label) else {
            warn!(target: TARGET, session_id = %self.session_id, label, "speaker label has no participant");
            return Err(RuntimeError::NoParticipants(self.session_id.clone()));
        };

        let was_speaking = self.anyone_speaking();
        self.tracker.update_speaker(&participant, is_speaking, now);
        self.after_speech_change(was_speaking, now);
        Ok(())
    }

    pub(crate) fn record_speaker_durations(
        &mut self,
        durations: &[(String, i64)],
        now: Instant,
    ) -> Result<(), RuntimeError> {
        let mut heard = false;
        for (label, duration_ms) in durations {
            let Some(participant) = self.resolver.resolve(label) else {
                warn!(target: TARGET, session_id = %self.session_id, label, "speaker label has no participant");
                return Err(RuntimeError::NoParticipants(self.session_id.clone()));
            };
            self.tracker.add_speaking_duration(&participant, *duration_ms);
            heard |= *duration_ms > 0;
        }

        if heard && !self.anyone_speaking() {
            self.silence_anchor = now;
        }
        Ok(())
    }

    pub(crate) fn record_speech_activity(&mut self, is_speaking: bool, now: Instant) {
        let was_speaking = self.anyone_speaking();
        self.speech_active = is_speaking;
        self.after_speech_change(was_speaking, now);
    }

    pub(crate) fn record_tension(&mut self, score: f64) {
        self.tension_score = score;
    }

    pub(crate) fn record_goal_alignment(&mut self, on_goal: bool) {
        self.on_goal = on_goal;
    }

    pub(crate) fn set_blocker(&mut self, blocker: Blocker, active: bool) {
        if self.engine.is_blocker_active(blocker) == active {
            return;
        }
        debug!(target: TARGET, session_id = %self.session_id, blocker = blocker.as_str(), active, "blocker updated");
        self.engine.set_blocker(blocker, active);
    }

    pub(crate) fn set_participant_names(&mut self, names: HashMap<String, String>) {
        self.participant_names.extend(names);
        self.engine
            .set_participant_names(self.participant_names.clone());
    }

    pub(crate) fn apply_config(&mut self, config: FacilitatorConfig) {
        self.engine.apply_config(config);
    }

    /// Returns the clock at the pause instant, or `None` if already paused.
    pub(crate) fn pause(&mut self, now: Instant) -> Option<SessionClock> {
        if self.timer.is_paused() {
            return None;
        }
        self.timer.pause(now);
        self.engine.pause();
        Some(self.timer.clock(now))
    }

    /// Returns the clock at the resume instant, or `None` if not paused.
    pub(crate) fn resume(&mut self, now: Instant) -> Option<SessionClock> {
        if !self.timer.is_paused() {
            return None;
        }
        self.timer.resume(now);
        self.engine.resume();
        self.silence_anchor = now;
        Some(self.timer.clock(now))
    }

    pub(crate) fn trigger_icebreaker(&mut self, now: Instant) -> Option<InterventionRecord> {
        let clock = self.timer.clock(now);
        self.engine.create_icebreaker(&self.goal, &clock)
    }

    pub(crate) fn report(&self, now: Instant) -> RuntimeReport {
        let clock = self.timer.clock(now);
        RuntimeReport {
            session_id: self.session_id.clone(),
            goal: self.goal.clone(),
            expired: self.expired,
            paused: self.timer.is_paused(),
            elapsed_seconds: clock.elapsed.as_secs(),
            remaining_seconds: clock.remaining.as_secs(),
            balance: self.tracker.metrics_export(now),
            interventions: self.engine.stats(&clock),
            history: self.engine.history().to_vec(),
        }
    }
}
