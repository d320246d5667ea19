use std::time::{Duration, Instant};

/// Tracks how long a condition has held without interruption.
///
/// The first positive observation anchors the start instant; any negative
/// observation clears it, so sustained time never carries partial credit
/// across a break.
#[derive(Debug, Default, Clone)]
pub(crate) struct SustainedCondition {
    since: Option<Instant>,
}

impl SustainedCondition {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records one observation and returns the unbroken duration when the
    /// condition holds.
    pub(crate) fn observe(&mut self, active: bool, now: Instant) -> Option<Duration> {
        if !active {
            self.since = None;
            return None;
        }

        match self.since {
            Some(since) => Some(now.saturating_duration_since(since)),
            None => {
                self.since = Some(now);
                Some(Duration::ZERO)
            }
        }
    }

    /// Observes the condition and reports whether it has held for at least
    /// `threshold`. The first observation never reaches the threshold.
    pub(crate) fn held_for(&mut self, active: bool, now: Instant, threshold: Duration) -> bool {
        match self.observe(active, now) {
            Some(sustained) => !sustained.is_zero() && sustained >= threshold,
            None => false,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_anchors_without_firing() {
        let start = Instant::now();
        let mut condition = SustainedCondition::new();

        assert!(!condition.held_for(true, start, Duration::ZERO));
        assert_eq!(condition.since, Some(start));
        assert!(condition.held_for(true, start + Duration::from_secs(1), Duration::ZERO));
    }

    #[test]
    fn negative_observation_clears_progress() {
        let start = Instant::now();
        let threshold = Duration::from_secs(30);
        let mut condition = SustainedCondition::new();

        condition.observe(true, start);
        assert!(!condition.held_for(true, start + Duration::from_secs(29), threshold));
        assert!(!condition.held_for(false, start + Duration::from_secs(30), threshold));
        assert!(condition.since.is_none());

        assert!(!condition.held_for(true, start + Duration::from_secs(31), threshold));
        assert!(!condition.held_for(true, start + Duration::from_secs(60), threshold));
        assert!(condition.held_for(true, start + Duration::from_secs(61), threshold));
    }
}
