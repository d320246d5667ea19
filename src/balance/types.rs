use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use serde::{Deserialize, Serialize, Serializer};

/// Per-participant speaking accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerMetrics {
    /// Completed speaking time in milliseconds; never decreases.
    pub total_speaking_ms: u64,
    /// Start of the current turn. Always set while `is_speaking`.
    pub last_spoke_at: Option<Instant>,
    pub is_speaking: bool,
}

/// Talk-balance classification over the two leading participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Balanced,
    MildImbalance,
    SevereImbalance,
}

impl BalanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceStatus::Balanced => "balanced",
            BalanceStatus::MildImbalance => "mild_imbalance",
            BalanceStatus::SevereImbalance => "severe_imbalance",
        }
    }

    /// Classifies the absolute percentage-point gap between two participants.
    pub fn from_difference(difference: u8) -> Self {
        if difference <= super::MILD_IMBALANCE_THRESHOLD {
            BalanceStatus::Balanced
        } else if difference <= super::SEVERE_IMBALANCE_THRESHOLD {
            BalanceStatus::MildImbalance
        } else {
            BalanceStatus::SevereImbalance
        }
    }

    /// Status fed to the intervention engine for a tracker trigger.
    pub fn from_trigger(trigger: Option<BalanceTrigger>) -> Self {
        match trigger {
            Some(BalanceTrigger::SevereBalance) => BalanceStatus::SevereImbalance,
            Some(BalanceTrigger::Balance) => BalanceStatus::MildImbalance,
            None => BalanceStatus::Balanced,
        }
    }
}

/// Sustained-imbalance signal raised by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceTrigger {
    /// Mild-or-worse imbalance held for the mild duration.
    Balance,
    /// Severe imbalance held for the severe duration.
    SevereBalance,
}

impl BalanceTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceTrigger::Balance => "balance",
            BalanceTrigger::SevereBalance => "severe_balance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantShare {
    pub id: String,
    pub name: Option<String>,
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceShares {
    pub participant_a: ParticipantShare,
    pub participant_b: ParticipantShare,
    pub status: BalanceStatus,
}

/// Point-in-time talk balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceSnapshot {
    /// Fewer than two distinct participants have been recorded.
    WaitingForSpeakers,
    Measured(BalanceShares),
}

impl BalanceSnapshot {
    pub fn is_waiting(&self) -> bool {
        matches!(self, BalanceSnapshot::WaitingForSpeakers)
    }

    pub fn shares(&self) -> Option<&BalanceShares> {
        match self {
            BalanceSnapshot::WaitingForSpeakers => None,
            BalanceSnapshot::Measured(shares) => Some(shares),
        }
    }

    pub fn status(&self) -> Option<BalanceStatus> {
        self.shares().map(|shares| shares.status)
    }

    /// Attaches display names for any participant present in `names`.
    pub fn with_names(mut self, names: &HashMap<String, String>) -> Self {
        if let BalanceSnapshot::Measured(shares) = &mut self {
            for share in [&mut shares.participant_a, &mut shares.participant_b] {
                if let Some(name) = names.get(&share.id) {
                    share.name = Some(name.clone());
                }
            }
        }
        self
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum SnapshotRepr<'a> {
    Waiting { status: &'static str },
    Measured(&'a BalanceShares),
}

impl Serialize for BalanceSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BalanceSnapshot::WaitingForSpeakers => SnapshotRepr::Waiting {
                status: "waiting_for_speakers",
            },
            BalanceSnapshot::Measured(shares) => SnapshotRepr::Measured(shares),
        }
        .serialize(serializer)
    }
}

/// Snapshot enriched with the dominant and quiet participant ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub balance: BalanceSnapshot,
    pub dominant_speaker: Option<String>,
    pub quiet_speaker: Option<String>,
}

impl BalanceReport {
    pub fn waiting() -> Self {
        Self {
            balance: BalanceSnapshot::WaitingForSpeakers,
            dominant_speaker: None,
            quiet_speaker: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerSummary {
    pub total_speaking_ms: u64,
    pub is_speaking: bool,
}

/// Export of everything the tracker knows, for reports and summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerMetrics {
    pub tracked_seconds: u64,
    pub balance: BalanceSnapshot,
    pub dominant_speaker: Option<String>,
    pub quiet_speaker: Option<String>,
    pub speakers: BTreeMap<String, SpeakerSummary>,
}
