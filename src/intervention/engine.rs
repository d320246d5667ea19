use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, trace};

use crate::balance::{BalanceReport, BalanceStatus, SustainedCondition};
use crate::session::SessionClock;

use super::config::FacilitatorConfig;
use super::templates;
use super::types::{
    Blocker, EvaluationInput, InterventionKind, InterventionRecord, InterventionStats, Modality,
    Priority,
};

const TARGET: &str = "intervention_engine";

/// Decides whether, and how, the facilitator should step in.
///
/// Candidates are checked in a fixed priority order and at most one
/// intervention is produced per evaluation. Every fired intervention starts
/// the global and per-type cooldowns and is appended to the history.
#[derive(Debug)]
pub struct InterventionEngine {
    config: FacilitatorConfig,
    participant_names: HashMap<String, String>,
    last_intervention: Option<Instant>,
    last_by_kind: HashMap<InterventionKind, Instant>,
    intervention_count: u64,
    history: Vec<InterventionRecord>,
    blockers: HashSet<Blocker>,
    paused: bool,
    tension: SustainedCondition,
    goal_drift: SustainedCondition,
    warnings_sent: Vec<u64>,
}

impl InterventionEngine {
    pub fn new(config: FacilitatorConfig) -> Self {
        Self {
            config,
            participant_names: HashMap::new(),
            last_intervention: None,
            last_by_kind: HashMap::new(),
            intervention_count: 0,
            history: Vec::new(),
            blockers: HashSet::new(),
            paused: false,
            tension: SustainedCondition::new(),
            goal_drift: SustainedCondition::new(),
            warnings_sent: Vec::new(),
        }
    }

    pub fn config(&self) -> &FacilitatorConfig {
        &self.config
    }

    pub fn apply_config(&mut self, config: FacilitatorConfig) {
        self.config = config;
    }

    pub fn set_participant_names(&mut self, names: HashMap<String, String>) {
        self.participant_names = names;
    }

    pub fn set_blocker(&mut self, blocker: Blocker, active: bool) {
        if active {
            self.blockers.insert(blocker);
        } else {
            self.blockers.remove(&blocker);
        }
    }

    pub fn is_blocker_active(&self, blocker: Blocker) -> bool {
        self.blockers.contains(&blocker)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Lifts the pause and forgets sustained-duration progress so nothing
    /// accumulated before the pause can fire right away.
    pub fn resume(&mut self) {
        self.paused = false;
        self.tension.reset();
        self.goal_drift.reset();
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn history(&self) -> &[InterventionRecord] {
        &self.history
    }

    pub fn intervention_count(&self) -> u64 {
        self.intervention_count
    }

    pub fn can_intervene(&self, kind: InterventionKind, clock: &SessionClock) -> bool {
        match self.blocked_by(kind, clock) {
            Some(reason) => {
                trace!(target: TARGET, kind = kind.as_str(), reason, "intervention blocked");
                false
            }
            None => true,
        }
    }

    fn blocked_by(&self, kind: InterventionKind, clock: &SessionClock) -> Option<&'static str> {
        let policy = &self.config.policy;

        if self.paused {
            return Some("paused");
        }

        if kind != InterventionKind::Icebreaker && clock.elapsed < policy.quiet_period() {
            return Some("quiet_period");
        }

        if let Some(last) = self.last_intervention {
            if clock.now.saturating_duration_since(last) < policy.min_interval() {
                return Some("global_cooldown");
            }
        }

        if let Some(last) = self.last_by_kind.get(&kind) {
            if clock.now.saturating_duration_since(*last) < policy.type_cooldown() {
                return Some("type_cooldown");
            }
        }

        if self.blockers.contains(&Blocker::MidSentence) && !self.config.interrupt_authority {
            return Some(Blocker::MidSentence.as_str());
        }

        for blocker in [
            Blocker::EmotionalDisclosure,
            Blocker::RepairInProgress,
            Blocker::CrisisDetected,
        ] {
            if self.blockers.contains(&blocker) {
                return Some(blocker.as_str());
            }
        }

        None
    }

    /// Returns the highest-priority intervention warranted right now, if any.
    pub fn evaluate(
        &mut self,
        input: &EvaluationInput,
        clock: &SessionClock,
    ) -> Option<InterventionRecord> {
        self.check_escalation(input.tension_score, clock)
            .or_else(|| self.check_severe_balance(input, clock))
            .or_else(|| self.check_time_warning(&input.goal, clock))
            .or_else(|| self.check_silence(input.silence, clock))
            .or_else(|| self.check_mild_balance(input, clock))
            .or_else(|| self.check_goal_drift(input.on_goal, &input.goal, clock))
    }

    /// Opening prompt. Exempt from the quiet period but not from cooldowns or blockers.
    pub fn create_icebreaker(
        &mut self,
        goal: &str,
        clock: &SessionClock,
    ) -> Option<InterventionRecord> {
        if !self.can_intervene(InterventionKind::Icebreaker, clock) {
            return None;
        }

        let record = InterventionRecord::new(
            InterventionKind::Icebreaker,
            Modality::Voice,
            Priority::Medium,
            templates::ICEBREAKER_GOAL.to_string(),
        )
        .with_metadata("session_goal", goal);
        Some(self.record(record, clock.now))
    }

    fn check_escalation(
        &mut self,
        tension_score: f64,
        clock: &SessionClock,
    ) -> Option<InterventionRecord> {
        let policy = &self.config.policy;
        let tense = tension_score > policy.tension_threshold;
        let sustained = self
            .tension
            .held_for(tense, clock.now, policy.tension_duration());

        if !sustained || !self.can_intervene(InterventionKind::Escalation, clock) {
            return None;
        }

        let record = InterventionRecord::new(
            InterventionKind::Escalation,
            Modality::Voice,
            Priority::Critical,
            templates::ESCALATION_PAUSE.to_string(),
        )
        .with_metadata("tension_score", tension_score);
        Some(self.record(record, clock.now))
    }

    fn check_severe_balance(
        &mut self,
        input: &EvaluationInput,
        clock: &SessionClock,
    ) -> Option<InterventionRecord> {
        if input.balance_status != BalanceStatus::SevereImbalance
            || !self.can_intervene(InterventionKind::Balance, clock)
        {
            return None;
        }

        let name = self.quiet_participant_name(&input.balance);
        let balance_result = serde_json::to_value(&input.balance).unwrap_or(Value::Null);
        let record = InterventionRecord::new(
            InterventionKind::Balance,
            Modality::Voice,
            Priority::High,
            templates::balance_voice(&name),
        )
        .targeting(input.balance.quiet_speaker.clone())
        .with_metadata("balance_status", input.balance_status.as_str())
        .with_metadata("balance_result", balance_result);
        Some(self.record(record, clock.now))
    }

    fn check_time_warning(&mut self, goal: &str, clock: &SessionClock) -> Option<InterventionRecord> {
        if !self.can_intervene(InterventionKind::TimeWarning, clock) {
            return None;
        }

        let minutes = self
            .config
            .policy
            .time_warning_minutes
            .iter()
            .copied()
            .find(|minutes| {
                clock.remaining <= Duration::from_secs(minutes * 60)
                    && !self.warnings_sent.contains(minutes)
            })?;
        self.warnings_sent.push(minutes);

        let record = InterventionRecord::new(
            InterventionKind::TimeWarning,
            Modality::Visual,
            Priority::Medium,
            templates::time_warning(minutes, goal),
        )
        .with_metadata("time_remaining_seconds", clock.remaining.as_secs());
        Some(self.record(record, clock.now))
    }

    fn check_silence(
        &mut self,
        silence: Option<Duration>,
        clock: &SessionClock,
    ) -> Option<InterventionRecord> {
        if !self.config.silence_detection {
            return None;
        }

        let silence = silence?;
        if silence < self.config.policy.silence_threshold()
            || !self.can_intervene(InterventionKind::Silence, clock)
        {
            return None;
        }

        let record = InterventionRecord::new(
            InterventionKind::Silence,
            Modality::Visual,
            Priority::Low,
            templates::SILENCE_VISUAL.to_string(),
        )
        .with_metadata("silence_seconds", silence.as_secs());
        Some(self.record(record, clock.now))
    }

    fn check_mild_balance(
        &mut self,
        input: &EvaluationInput,
        clock: &SessionClock,
    ) -> Option<InterventionRecord> {
        if input.balance_status != BalanceStatus::MildImbalance
            || !self.can_intervene(InterventionKind::Balance, clock)
        {
            return None;
        }

        let name = self.quiet_participant_name(&input.balance);
        let record = InterventionRecord::new(
            InterventionKind::Balance,
            Modality::Visual,
            Priority::Medium,
            templates::balance_visual(&name),
        )
        .targeting(input.balance.quiet_speaker.clone())
        .with_metadata("balance_status", input.balance_status.as_str());
        Some(self.record(record, clock.now))
    }

    fn check_goal_drift(
        &mut self,
        on_goal: bool,
        goal: &str,
        clock: &SessionClock,
    ) -> Option<InterventionRecord> {
        let drifted = self.goal_drift.held_for(
            !on_goal,
            clock.now,
            self.config.policy.goal_drift_threshold(),
        );

        if !drifted || !self.can_intervene(InterventionKind::GoalDrift, clock) {
            return None;
        }

        let record = InterventionRecord::new(
            InterventionKind::GoalDrift,
            Modality::Visual,
            Priority::Low,
            templates::GOAL_DRIFT_VISUAL.to_string(),
        )
        .with_metadata("session_goal", goal);
        Some(self.record(record, clock.now))
    }

    fn record(&mut self, record: InterventionRecord, now: Instant) -> InterventionRecord {
        self.last_intervention = Some(now);
        self.last_by_kind.insert(record.kind, now);
        self.intervention_count += 1;
        self.history.push(record.clone());

        debug!(
            target: TARGET,
            kind = record.kind.as_str(),
            modality = record.modality.as_str(),
            count = self.intervention_count,
            "intervention fired"
        );

        record
    }

    fn quiet_participant_name(&self, report: &BalanceReport) -> String {
        if let Some(name) = report
            .quiet_speaker
            .as_ref()
            .and_then(|id| self.participant_names.get(id))
        {
            return name.clone();
        }

        let Some(shares) = report.balance.shares() else {
            return templates::PARTNER_FALLBACK.to_string();
        };

        let quieter = if shares.participant_a.percentage < shares.participant_b.percentage {
            Some(&shares.participant_a)
        } else if shares.participant_b.percentage < shares.participant_a.percentage {
            Some(&shares.participant_b)
        } else {
            None
        };

        quieter
            .and_then(|share| share.name.clone())
            .unwrap_or_else(|| templates::PARTNER_FALLBACK.to_string())
    }

    pub fn stats(&self, clock: &SessionClock) -> InterventionStats {
        let mut by_type = BTreeMap::new();
        let mut by_modality = BTreeMap::new();
        for record in &self.history {
            *by_type.entry(record.kind).or_insert(0) += 1;
            *by_modality.entry(record.modality).or_insert(0) += 1;
        }

        let elapsed_minutes = clock.elapsed.as_secs_f64() / 60.0;
        let rate_per_30_minutes = if elapsed_minutes < 1.0 {
            0.0
        } else {
            self.intervention_count as f64 / elapsed_minutes * 30.0
        };

        InterventionStats {
            total_interventions: self.intervention_count,
            rate_per_30_minutes,
            by_type,
            by_modality,
            is_paused: self.paused,
            elapsed_seconds: clock.elapsed.as_secs(),
            remaining_seconds: clock.remaining.as_secs(),
        }
    }
}
