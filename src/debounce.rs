use std::time::{Duration, Instant};

/// Debounce filter.
///
/// Suppresses proposed transitions that arrive closer together than the
/// configured minimum interval. The filter only knows about timestamps; it
/// has no idea what a transition does.
#[derive(Debug)]
pub struct Debounce {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl Debounce {
    /// Create a filter with the given minimum interval between accepted
    /// transitions. A zero interval accepts everything.
    pub fn new(min_interval: Duration) -> Self {
        Debounce {
            min_interval,
            last_accepted: None,
        }
    }

    /// Create a filter that accepts every transition.
    pub fn disabled() -> Self {
        Debounce::new(Duration::ZERO)
    }

    /// Change the minimum interval. Does not reset the last-accepted
    /// timestamp.
    pub fn set_min_interval(&mut self, min_interval: Duration) {
        self.min_interval = min_interval;
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Decide whether a transition proposed at `now` passes the filter.
    ///
    /// Accepting records `now` as the new last-accepted timestamp; rejecting
    /// leaves the filter untouched. The first proposal is always accepted.
    pub fn accept(&mut self, now: Instant) -> bool {
        if !self.min_interval.is_zero() {
            if let Some(last) = self.last_accepted {
                if now.duration_since(last) < self.min_interval {
                    return false;
                }
            }
        }
        self.last_accepted = Some(now);
        true
    }
}
