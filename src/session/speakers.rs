use std::collections::HashMap;

use tracing::debug;

/// Binds diarization labels ("speaker_0", ...) to participant ids.
///
/// A label is bound on first sight to the first participant without a label.
/// Once every participant holds a label, further labels all fall back to the
/// first participant. Bindings are never revised.
#[derive(Debug, Clone, Default)]
pub struct SpeakerResolver {
    participants: Vec<String>,
    bindings: HashMap<String, String>,
}

impl SpeakerResolver {
    pub fn new(participants: Vec<String>) -> Self {
        Self {
            participants,
            bindings: HashMap::new(),
        }
    }

    /// Returns the participant bound to `label`, binding it first if needed.
    /// `None` only when the session has no participants.
    pub fn resolve(&mut self, label: &str) -> Option<String> {
        if let Some(participant) = self.bindings.get(label) {
            return Some(participant.clone());
        }

        let participant = self
            .participants
            .iter()
            .find(|candidate| !self.bindings.values().any(|bound| bound == *candidate))
            .or_else(|| self.participants.first())?
            .clone();

        debug!(
            target: "session_runtime",
            label,
            participant = %participant,
            "bound speaker label"
        );
        self.bindings.insert(label.to_string(), participant.clone());
        Some(participant)
    }

    pub fn binding(&self, label: &str) -> Option<&str> {
        self.bindings.get(label).map(String::as_str)
    }

    pub fn bound_labels(&self) -> usize {
        self.bindings.len()
    }
}
