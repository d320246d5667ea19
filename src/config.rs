//! Process-wide runtime and telemetry settings.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const ENV_TICK_MS: &str = "FACILITATION_TICK_MS";
pub const ENV_LISTENER_TIMEOUT_MS: &str = "FACILITATION_LISTENER_TIMEOUT_MS";
pub const ENV_EVENT_BUFFER: &str = "FACILITATION_EVENT_BUFFER";
pub const ENV_LOG_JSON: &str = "FACILITATION_LOG_JSON";
pub const ENV_LOG_DIR: &str = "FACILITATION_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Scheduler cadence. Session time itself is measured, not counted in ticks.
    pub tick_interval: Duration,
    pub listener_timeout: Duration,
    pub event_buffer: usize,
    pub lifecycle_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            listener_timeout: Duration::from_millis(250),
            event_buffer: 256,
            lifecycle_buffer: 32,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse_env::<u64>(ENV_TICK_MS).filter(|ms| *ms > 0) {
            config.tick_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_env::<u64>(ENV_LISTENER_TIMEOUT_MS) {
            config.listener_timeout = Duration::from_millis(ms);
        }
        if let Some(capacity) = parse_env::<usize>(ENV_EVENT_BUFFER).filter(|cap| *cap > 0) {
            config.event_buffer = capacity;
        }

        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Used when `RUST_LOG` is unset.
    pub default_filter: String,
    pub json: bool,
    /// Daily-rolling log files are written here when set.
    pub log_dir: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let json = env::var(ENV_LOG_JSON)
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let log_dir = env::var(ENV_LOG_DIR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Self {
            json,
            log_dir,
            ..Self::default()
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(target: "session_supervisor", var = name, value = %raw, "ignoring malformed setting");
            None
        }
    }
}
