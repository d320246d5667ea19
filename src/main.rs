use std::sync::Arc;

use anyhow::{Context, Result};
use facilitation_core::telemetry::init_tracing;
use facilitation_core::{RuntimeConfig, SessionSupervisor, TelemetryConfig};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

const TARGET: &str = "facilitation_core";

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_tracing(&TelemetryConfig::from_env())?;

    let supervisor = Arc::new(SessionSupervisor::new(RuntimeConfig::from_env()));
    let mut events = supervisor.subscribe_events();
    let mut lifecycle = supervisor.subscribe_lifecycle();

    let event_log = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => debug!(
                    target: TARGET,
                    session_id = %event.session_id,
                    event_type = event.event_type(),
                    "session event"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: TARGET, skipped, "event log fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let lifecycle_log = tokio::spawn(async move {
        loop {
            match lifecycle.recv().await {
                Ok(update) => info!(
                    target: TARGET,
                    session_id = %update.session_id,
                    phase = update.phase.as_str(),
                    "session lifecycle"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: TARGET, skipped, "lifecycle log fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    info!(target: TARGET, tick = ?supervisor.config().tick_interval, "session runtime supervisor ready");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    let reports = supervisor.stop_all().await;
    info!(target: TARGET, stopped = reports.len(), "shutting down");

    event_log.abort();
    lifecycle_log.abort();
    Ok(())
}
