use std::time::{Duration, Instant};

/// Pause-aware session time at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    pub now: Instant,
    pub elapsed: Duration,
    pub remaining: Duration,
    pub duration: Duration,
}

impl SessionClock {
    /// Share of the planned duration already used, capped at 100.
    pub fn percent_complete(&self) -> u8 {
        if self.duration.is_zero() {
            return 100;
        }
        let percent = self.elapsed.as_millis() * 100 / self.duration.as_millis();
        percent.min(100) as u8
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Elapsed/remaining session time that stops advancing while paused.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    started_at: Instant,
    paused_at: Option<Instant>,
    paused_accumulated: Duration,
    duration: Duration,
}

impl SessionTimer {
    pub fn new(started_at: Instant, duration: Duration) -> Self {
        Self {
            started_at,
            paused_at: None,
            paused_accumulated: Duration::ZERO,
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Freezes elapsed time. Pausing an already paused timer keeps the original pause instant.
    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_accumulated += now.saturating_duration_since(paused_at);
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        let reference = self.paused_at.unwrap_or(now);
        reference
            .saturating_duration_since(self.started_at)
            .saturating_sub(self.paused_accumulated)
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration.saturating_sub(self.elapsed(now))
    }

    pub fn clock(&self, now: Instant) -> SessionClock {
        let elapsed = self.elapsed(now);
        SessionClock {
            now,
            elapsed,
            remaining: self.duration.saturating_sub(elapsed),
            duration: self.duration,
        }
    }
}
