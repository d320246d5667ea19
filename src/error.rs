use thiserror::Error;

/// Failures surfaced to the lifecycle layer by the session supervisor.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no active runtime for session {0}")]
    SessionNotFound(String),
    #[error("session {0} already has an active runtime")]
    AlreadyRunning(String),
    #[error("unknown blocker: {0}")]
    UnknownBlocker(String),
    #[error("session {0} has no participants")]
    NoParticipants(String),
}
