use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing thresholds that govern when interventions may fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterventionPolicy {
    /// Minimum gap between any two interventions.
    pub min_interval_secs: u64,
    /// Minimum gap between two interventions of the same type.
    pub type_cooldown_secs: u64,
    /// Session time during which only icebreakers may fire.
    pub quiet_period_secs: u64,
    pub silence_threshold_secs: u64,
    pub goal_drift_secs: u64,
    /// Tension score that must be exceeded to count toward escalation.
    pub tension_threshold: f64,
    pub tension_duration_secs: u64,
    /// Remaining-time warnings, checked in the listed order, each sent once.
    pub time_warning_minutes: Vec<u64>,
}

impl Default for InterventionPolicy {
    fn default() -> Self {
        Self {
            min_interval_secs: 30,
            type_cooldown_secs: 2 * 60,
            quiet_period_secs: 3 * 60,
            silence_threshold_secs: 15,
            goal_drift_secs: 2 * 60,
            tension_threshold: 0.7,
            tension_duration_secs: 30,
            time_warning_minutes: vec![5, 2, 1],
        }
    }
}

impl InterventionPolicy {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }

    pub fn type_cooldown(&self) -> Duration {
        Duration::from_secs(self.type_cooldown_secs)
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_secs(self.quiet_period_secs)
    }

    pub fn silence_threshold(&self) -> Duration {
        Duration::from_secs(self.silence_threshold_secs)
    }

    pub fn goal_drift_threshold(&self) -> Duration {
        Duration::from_secs(self.goal_drift_secs)
    }

    pub fn tension_duration(&self) -> Duration {
        Duration::from_secs(self.tension_duration_secs)
    }
}

/// Per-session facilitator behaviour chosen by the session creator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacilitatorConfig {
    /// Facilitator may speak over a participant who is mid-sentence.
    pub interrupt_authority: bool,
    pub direct_inquiry: bool,
    /// Nudge the room after a stretch of silence.
    pub silence_detection: bool,
    pub policy: InterventionPolicy,
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self {
            interrupt_authority: true,
            direct_inquiry: true,
            silence_detection: false,
            policy: InterventionPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: FacilitatorConfig = serde_json::from_str(
            r#"{ "silenceDetection": true, "policy": { "typeCooldownSecs": 60 } }"#,
        )
        .expect("config decodes");

        assert!(config.silence_detection);
        assert!(config.interrupt_authority);
        assert_eq!(config.policy.type_cooldown(), Duration::from_secs(60));
        assert_eq!(config.policy.min_interval(), Duration::from_secs(30));
        assert_eq!(config.policy.time_warning_minutes, vec![5, 2, 1]);
    }
}
