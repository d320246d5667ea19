//! Per-session building blocks: participants, time, speaker labels, outbound events.

pub mod events;
pub mod lifecycle;
mod speakers;
mod timer;
mod types;

pub use events::{EventPayload, SessionEvent, TimeRemaining};
pub use lifecycle::{SessionLifecyclePayload, SessionLifecyclePhase, SessionLifecycleUpdate};
pub use speakers::SpeakerResolver;
pub use timer::{SessionClock, SessionTimer};
pub use types::{Participant, ParticipantRole, SessionSpec};
