use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::intervention::FacilitatorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Creator,
    Invitee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub role: ParticipantRole,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: ParticipantRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

/// Typed view of a session handed to the runtime when it goes live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSpec {
    pub id: String,
    #[serde(default)]
    pub goal: String,
    pub participants: Vec<Participant>,
    /// Non-positive values yield a session that expires on its first tick.
    pub duration_minutes: i64,
    #[serde(default)]
    pub facilitator: FacilitatorConfig,
}

impl SessionSpec {
    pub fn duration(&self) -> Duration {
        u64::try_from(self.duration_minutes)
            .map(|minutes| Duration::from_secs(minutes.saturating_mul(60)))
            .unwrap_or(Duration::ZERO)
    }

    pub fn participant_names(&self) -> HashMap<String, String> {
        self.participants
            .iter()
            .map(|participant| (participant.id.clone(), participant.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_duration_is_zero() {
        let mut spec = SessionSpec {
            id: "s-1".into(),
            goal: String::new(),
            participants: Vec::new(),
            duration_minutes: 20,
            facilitator: FacilitatorConfig::default(),
        };
        assert_eq!(spec.duration(), Duration::from_secs(1200));

        spec.duration_minutes = 0;
        assert_eq!(spec.duration(), Duration::ZERO);
        spec.duration_minutes = -5;
        assert_eq!(spec.duration(), Duration::ZERO);
    }

    #[test]
    fn spec_decodes_with_default_facilitator() {
        let spec: SessionSpec = serde_json::from_str(
            r#"{
                "id": "s-9",
                "participants": [
                    { "id": "u-1", "name": "Avery", "role": "creator" },
                    { "id": "u-2", "name": "Blair", "role": "invitee" }
                ],
                "durationMinutes": 15
            }"#,
        )
        .expect("spec decodes");

        assert_eq!(spec.participants[1].role, ParticipantRole::Invitee);
        assert_eq!(spec.facilitator, FacilitatorConfig::default());
        assert_eq!(spec.participant_names()["u-1"], "Avery");
    }
}
