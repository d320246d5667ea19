//! 会话运行时生命周期广播负载定义。

use std::time::SystemTime;

use super::timer::SessionClock;

/// 运行时生命周期的阶段划分。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLifecyclePhase {
    Started,
    Paused,
    Resumed,
    Expired,
    Stopped,
}

impl SessionLifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionLifecyclePhase::Started => "started",
            SessionLifecyclePhase::Paused => "paused",
            SessionLifecyclePhase::Resumed => "resumed",
            SessionLifecyclePhase::Expired => "expired",
            SessionLifecyclePhase::Stopped => "stopped",
        }
    }
}

/// 生命周期事件的附加信息。
#[derive(Debug, Clone, Default)]
pub enum SessionLifecyclePayload {
    #[default]
    None,
    Progress(ProgressPayload),
    Stopped(StopPayload),
}

/// 阶段切换时的计时快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPayload {
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
}

impl From<&SessionClock> for ProgressPayload {
    fn from(clock: &SessionClock) -> Self {
        Self {
            elapsed_seconds: clock.elapsed.as_secs(),
            remaining_seconds: clock.remaining.as_secs(),
        }
    }
}

/// 停止阶段的统计摘要。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPayload {
    pub interventions: u64,
    pub elapsed_seconds: u64,
}

/// 生命周期事件。
#[derive(Debug, Clone)]
pub struct SessionLifecycleUpdate {
    pub session_id: String,
    pub phase: SessionLifecyclePhase,
    pub issued_at: SystemTime,
    pub payload: SessionLifecyclePayload,
}

impl SessionLifecycleUpdate {
    /// 构造一个空载荷的事件。
    pub fn new<S: Into<String>>(session_id: S, phase: SessionLifecyclePhase) -> Self {
        Self {
            session_id: session_id.into(),
            phase,
            issued_at: SystemTime::now(),
            payload: SessionLifecyclePayload::None,
        }
    }

    /// 携带计时快照的阶段事件（暂停、恢复、到期）。
    pub fn progress<S: Into<String>>(
        session_id: S,
        phase: SessionLifecyclePhase,
        clock: &SessionClock,
    ) -> Self {
        Self {
            payload: SessionLifecyclePayload::Progress(clock.into()),
            ..Self::new(session_id, phase)
        }
    }

    /// 声明运行时已停止并附带统计。
    pub fn stopped<S: Into<String>>(session_id: S, interventions: u64, elapsed_seconds: u64) -> Self {
        Self {
            payload: SessionLifecyclePayload::Stopped(StopPayload {
                interventions,
                elapsed_seconds,
            }),
            ..Self::new(session_id, SessionLifecyclePhase::Stopped)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::session::SessionTimer;

    #[test]
    fn progress_helper_captures_clock() {
        let start = Instant::now();
        let timer = SessionTimer::new(start, Duration::from_secs(300));
        let clock = timer.clock(start + Duration::from_secs(120));
        let update = SessionLifecycleUpdate::progress("session", SessionLifecyclePhase::Paused, &clock);

        assert_eq!(update.phase, SessionLifecyclePhase::Paused);
        match update.payload {
            SessionLifecyclePayload::Progress(payload) => {
                assert_eq!(payload.elapsed_seconds, 120);
                assert_eq!(payload.remaining_seconds, 180);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn stopped_helper_sets_summary() {
        let update = SessionLifecycleUpdate::stopped("session", 4, 900);

        assert_eq!(update.phase.as_str(), "stopped");
        match update.payload {
            SessionLifecyclePayload::Stopped(payload) => {
                assert_eq!(payload.interventions, 4);
                assert_eq!(payload.elapsed_seconds, 900);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn new_has_empty_payload() {
        let update = SessionLifecycleUpdate::new("session", SessionLifecyclePhase::Started);
        assert!(matches!(update.payload, SessionLifecyclePayload::None));
    }
}
