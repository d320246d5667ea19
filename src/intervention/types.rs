use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::balance::{BalanceReport, BalanceStatus};
use crate::error::RuntimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    Balance,
    Silence,
    GoalDrift,
    TimeWarning,
    Escalation,
    Icebreaker,
}

impl InterventionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionKind::Balance => "balance",
            InterventionKind::Silence => "silence",
            InterventionKind::GoalDrift => "goal_drift",
            InterventionKind::TimeWarning => "time_warning",
            InterventionKind::Escalation => "escalation",
            InterventionKind::Icebreaker => "icebreaker",
        }
    }
}

/// Delivery channel of an intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Visual,
    Voice,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Visual => "visual",
            Modality::Voice => "voice",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

/// Transient conditions that suppress interventions until cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blocker {
    /// Overridden when the facilitator holds interrupt authority.
    MidSentence,
    EmotionalDisclosure,
    RepairInProgress,
    CrisisDetected,
}

impl Blocker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Blocker::MidSentence => "mid_sentence",
            Blocker::EmotionalDisclosure => "emotional_disclosure",
            Blocker::RepairInProgress => "repair_in_progress",
            Blocker::CrisisDetected => "crisis_detected",
        }
    }
}

impl FromStr for Blocker {
    type Err = RuntimeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mid_sentence" => Ok(Blocker::MidSentence),
            "emotional_disclosure" => Ok(Blocker::EmotionalDisclosure),
            "repair_in_progress" => Ok(Blocker::RepairInProgress),
            "crisis_detected" => Ok(Blocker::CrisisDetected),
            other => Err(RuntimeError::UnknownBlocker(other.to_string())),
        }
    }
}

/// A fired intervention. Records are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InterventionKind,
    pub modality: Modality,
    pub message: String,
    pub target_participant: Option<String>,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub metadata: Map<String, Value>,
}

impl InterventionRecord {
    pub(crate) fn new(
        kind: InterventionKind,
        modality: Modality,
        priority: Priority,
        message: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            modality,
            message,
            target_participant: None,
            priority,
            created_at: Utc::now(),
            metadata: Map::new(),
        }
    }

    pub(crate) fn targeting(mut self, participant: Option<String>) -> Self {
        self.target_participant = participant;
        self
    }

    pub(crate) fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Signals gathered by the scheduler for one evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationInput {
    /// Sustained-imbalance classification from the balance tracker.
    pub balance_status: BalanceStatus,
    pub balance: BalanceReport,
    /// Present only while nobody is speaking.
    pub silence: Option<Duration>,
    pub tension_score: f64,
    pub on_goal: bool,
    pub goal: String,
}

impl Default for EvaluationInput {
    fn default() -> Self {
        Self {
            balance_status: BalanceStatus::Balanced,
            balance: BalanceReport::waiting(),
            silence: None,
            tension_score: 0.0,
            on_goal: true,
            goal: String::new(),
        }
    }
}

/// Aggregate counters over an engine's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionStats {
    pub total_interventions: u64,
    pub rate_per_30_minutes: f64,
    pub by_type: BTreeMap<InterventionKind, u64>,
    pub by_modality: BTreeMap<Modality, u64>,
    pub is_paused: bool,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocker_names_round_trip_through_wire_form() {
        for blocker in [
            Blocker::MidSentence,
            Blocker::EmotionalDisclosure,
            Blocker::RepairInProgress,
            Blocker::CrisisDetected,
        ] {
            assert_eq!(blocker.as_str().parse::<Blocker>().ok(), Some(blocker));
        }

        let err = "grief".parse::<Blocker>().expect_err("unknown blocker");
        assert!(matches!(err, RuntimeError::UnknownBlocker(name) if name == "grief"));
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = InterventionRecord::new(
            InterventionKind::GoalDrift,
            Modality::Visual,
            Priority::Low,
            "Shall we return to the topic?".into(),
        )
        .targeting(Some("p-2".into()))
        .with_metadata("session_goal", "budget");

        let value = serde_json::to_value(&record).expect("encode");
        assert_eq!(value["type"], "goal_drift");
        assert_eq!(value["modality"], "visual");
        assert_eq!(value["priority"], "low");
        assert_eq!(value["targetParticipant"], "p-2");
        assert_eq!(value["metadata"]["session_goal"], "budget");
        assert!(value["createdAt"].as_str().is_some());
        assert_eq!(value["id"].as_str().map(str::len), Some(36));
    }
}
