mod fanout;
mod handle;
mod report;
mod scheduler;
mod state;
mod supervisor;
mod traits;

pub use report::RuntimeReport;
pub use supervisor::SessionSupervisor;
pub use traits::EventListener;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use self::fanout::EventFanout;
use self::handle::SessionRuntimeHandle;
use self::state::SessionRuntimeState;

/// Current instant on tokio's clock, so a paused test runtime drives session time.
pub(crate) fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

pub(crate) fn spawn_runtime(
    state: SessionRuntimeState,
    fanout: EventFanout,
    tick_interval: Duration,
) -> SessionRuntimeHandle {
    let state = Arc::new(Mutex::new(state));
    let scheduler = tokio::spawn(scheduler::run_scheduler(
        Arc::downgrade(&state),
        fanout,
        tick_interval,
    ));
    SessionRuntimeHandle::new(state, scheduler)
}

#[cfg(test)]
mod tests;
