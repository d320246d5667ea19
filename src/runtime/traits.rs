use anyhow::Result;
use async_trait::async_trait;

use crate::session::SessionEvent;

/// Per-session consumer of outbound events, e.g. a websocket connection.
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn deliver(&self, event: &SessionEvent) -> Result<()>;
}
