use std::time::{Duration, Instant};

use super::sustained::SustainedCondition;
use super::types::{
    BalanceReport, BalanceShares, BalanceSnapshot, BalanceStatus, BalanceTrigger,
    ParticipantShare, SpeakerMetrics, SpeakerSummary, TrackerMetrics,
};
use super::{MILD_IMBALANCE_DURATION, SEVERE_IMBALANCE_DURATION};

/// Accumulates speaking time per participant and classifies talk balance.
///
/// Participants are ordered by first observation; the first two recorded
/// become participant A and participant B of every snapshot.
#[derive(Debug)]
pub struct BalanceTracker {
    speakers: Vec<(String, SpeakerMetrics)>,
    started_at: Instant,
    imbalance: SustainedCondition,
    severe_imbalance: SustainedCondition,
}

impl BalanceTracker {
    pub fn new(started_at: Instant) -> Self {
        Self {
            speakers: Vec::new(),
            started_at,
            imbalance: SustainedCondition::new(),
            severe_imbalance: SustainedCondition::new(),
        }
    }

    fn metrics(&self, participant_id: &str) -> Option<&SpeakerMetrics> {
        self.speakers
            .iter()
            .find(|(id, _)| id == participant_id)
            .map(|(_, metrics)| metrics)
    }

    fn metrics_mut(&mut self, participant_id: &str) -> &mut SpeakerMetrics {
        let index = match self.speakers.iter().position(|(id, _)| id == participant_id) {
            Some(index) => index,
            None => {
                self.speakers
                    .push((participant_id.to_string(), SpeakerMetrics::default()));
                self.speakers.len() - 1
            }
        };
        &mut self.speakers[index].1
    }

    /// Applies a live speaking-state change. Repeating the current state is a no-op.
    pub fn update_speaker(&mut self, participant_id: &str, is_speaking: bool, now: Instant) {
        let metrics = self.metrics_mut(participant_id);

        if is_speaking && !metrics.is_speaking {
            metrics.is_speaking = true;
            metrics.last_spoke_at = Some(now);
        } else if !is_speaking && metrics.is_speaking {
            if let Some(turn_started) = metrics.last_spoke_at {
                metrics.total_speaking_ms = metrics
                    .total_speaking_ms
                    .saturating_add(duration_to_ms(now.saturating_duration_since(turn_started)));
            }
            metrics.is_speaking = false;
        }
    }

    /// Credits a completed turn reported by diarization. Non-positive durations are ignored.
    pub fn add_speaking_duration(&mut self, participant_id: &str, duration_ms: i64) {
        if duration_ms <= 0 {
            return;
        }

        let metrics = self.metrics_mut(participant_id);
        metrics.total_speaking_ms = metrics.total_speaking_ms.saturating_add(duration_ms as u64);
    }

    /// Completed speaking time plus the in-progress turn, if any.
    pub fn current_speaking_ms(&self, participant_id: &str, now: Instant) -> u64 {
        self.metrics(participant_id)
            .map(|metrics| current_ms(metrics, now))
            .unwrap_or(0)
    }

    pub fn is_anyone_speaking(&self) -> bool {
        self.speakers.iter().any(|(_, metrics)| metrics.is_speaking)
    }

    pub fn speaker_count(&self) -> usize {
        self.speakers.len()
    }

    pub fn balance(&self, now: Instant) -> BalanceSnapshot {
        if self.speakers.len() < 2 {
            return BalanceSnapshot::WaitingForSpeakers;
        }

        let times: Vec<u64> = self
            .speakers
            .iter()
            .map(|(_, metrics)| current_ms(metrics, now))
            .collect();
        let total: u64 = times.iter().fold(0u64, |acc, time| acc.saturating_add(*time));

        let percentage_a = if total == 0 {
            50
        } else {
            ((times[0] as u128 * 100) / total as u128) as u8
        };
        let percentage_b = 100 - percentage_a;

        BalanceSnapshot::Measured(BalanceShares {
            participant_a: ParticipantShare {
                id: self.speakers[0].0.clone(),
                name: None,
                percentage: percentage_a,
            },
            participant_b: ParticipantShare {
                id: self.speakers[1].0.clone(),
                name: None,
                percentage: percentage_b,
            },
            status: BalanceStatus::from_difference(percentage_a.abs_diff(percentage_b)),
        })
    }

    /// Reports a sustained imbalance. Severe takes precedence over mild; either
    /// running timer restarts as soon as its condition stops holding.
    pub fn check_intervention_trigger(&mut self, now: Instant) -> Option<BalanceTrigger> {
        let status = self.balance(now).status()?;

        let severe = status == BalanceStatus::SevereImbalance;
        if self
            .severe_imbalance
            .held_for(severe, now, SEVERE_IMBALANCE_DURATION)
        {
            return Some(BalanceTrigger::SevereBalance);
        }

        let mild_or_worse = status != BalanceStatus::Balanced;
        if self
            .imbalance
            .held_for(mild_or_worse, now, MILD_IMBALANCE_DURATION)
        {
            return Some(BalanceTrigger::Balance);
        }

        None
    }

    pub fn reset_intervention_timers(&mut self) {
        self.imbalance.reset();
        self.severe_imbalance.reset();
    }

    pub fn dominant_speaker(&self, now: Instant) -> Option<String> {
        dominant_of(&self.balance(now))
    }

    pub fn quiet_speaker(&self, now: Instant) -> Option<String> {
        quiet_of(&self.balance(now))
    }

    pub fn report(&self, now: Instant) -> BalanceReport {
        let balance = self.balance(now);
        BalanceReport {
            dominant_speaker: dominant_of(&balance),
            quiet_speaker: quiet_of(&balance),
            balance,
        }
    }

    pub fn tracked_duration(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    pub fn metrics_export(&self, now: Instant) -> TrackerMetrics {
        let report = self.report(now);
        TrackerMetrics {
            tracked_seconds: self.tracked_duration(now).as_secs(),
            balance: report.balance,
            dominant_speaker: report.dominant_speaker,
            quiet_speaker: report.quiet_speaker,
            speakers: self
                .speakers
                .iter()
                .map(|(id, metrics)| {
                    (
                        id.clone(),
                        SpeakerSummary {
                            total_speaking_ms: current_ms(metrics, now),
                            is_speaking: metrics.is_speaking,
                        },
                    )
                })
                .collect(),
        }
    }
}

fn current_ms(metrics: &SpeakerMetrics, now: Instant) -> u64 {
    let mut total = metrics.total_speaking_ms;
    if metrics.is_speaking {
        if let Some(turn_started) = metrics.last_spoke_at {
            total = total.saturating_add(duration_to_ms(now.saturating_duration_since(turn_started)));
        }
    }
    total
}

fn dominant_of(snapshot: &BalanceSnapshot) -> Option<String> {
    let shares = snapshot.shares()?;
    if shares.status == BalanceStatus::Balanced {
        return None;
    }

    if shares.participant_a.percentage > shares.participant_b.percentage {
        Some(shares.participant_a.id.clone())
    } else {
        Some(shares.participant_b.id.clone())
    }
}

fn quiet_of(snapshot: &BalanceSnapshot) -> Option<String> {
    let shares = snapshot.shares()?;
    if shares.status == BalanceStatus::Balanced {
        return None;
    }

    if shares.participant_a.percentage < shares.participant_b.percentage {
        Some(shares.participant_a.id.clone())
    } else {
        Some(shares.participant_b.id.clone())
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}
