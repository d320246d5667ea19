//! Facilitation Core Library
//!
//! Session runtime for a live two-party conversation: talk-balance tracking,
//! intervention policy, and the per-session scheduler that ties them together.

pub mod balance;
pub mod config;
pub mod error;
pub mod intervention;
pub mod runtime;
pub mod session;
pub mod telemetry;

pub use config::{RuntimeConfig, TelemetryConfig};
pub use error::RuntimeError;
pub use runtime::{EventListener, RuntimeReport, SessionSupervisor};
