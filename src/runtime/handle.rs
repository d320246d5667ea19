use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::state::SessionRuntimeState;

/// Owns a session's state and its scheduler task. Dropping the handle
/// cancels the scheduler.
pub(crate) struct SessionRuntimeHandle {
    state: Arc<Mutex<SessionRuntimeState>>,
    scheduler: Option<JoinHandle<()>>,
}

impl SessionRuntimeHandle {
    pub(super) fn new(state: Arc<Mutex<SessionRuntimeState>>, scheduler: JoinHandle<()>) -> Self {
        Self {
            state,
            scheduler: Some(scheduler),
        }
    }

    pub(crate) fn state(&self) -> Arc<Mutex<SessionRuntimeState>> {
        Arc::clone(&self.state)
    }

    pub(crate) fn is_scheduler_running(&self) -> bool {
        self.scheduler
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for SessionRuntimeHandle {
    fn drop(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.abort();
        }
    }
}
