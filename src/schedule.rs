use std::time::{Duration, Instant};

/// How a [`Schedule`] behaves once its deadline elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireMode {
    /// Fire a single time, then become inert.
    Once,
    /// Re-arm after every fire with the given interval, until cancelled.
    Every(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Armed,
    Fired,
    Cancelled,
}

/// A cancellable deferred action.
///
/// The schedule never waits by itself: the surrounding event loop supplies
/// time by calling [`Schedule::fire_due`], so a "delay" is a deferred
/// re-entry, not a sleep. Cancellation is cooperative and observed at the
/// next fire boundary.
#[derive(Debug)]
pub struct Schedule {
    state: State,
    mode: FireMode,
    deadline: Option<Instant>,
}

impl Schedule {
    pub fn idle() -> Self {
        Schedule {
            state: State::Idle,
            mode: FireMode::Once,
            deadline: None,
        }
    }

    /// Arm the schedule to fire `delay` after `now`.
    ///
    /// Arming while already armed drops the outstanding deadline and starts
    /// the cycle over from `now`, so there is never more than one pending
    /// fire and no drift accumulates across re-arms.
    pub fn arm(&mut self, now: Instant, delay: Duration, mode: FireMode) {
        if self.state == State::Armed {
            trace!("re-arming an armed schedule, dropping the old deadline");
        }
        self.state = State::Armed;
        self.mode = mode;
        self.deadline = Some(now + delay);
    }

    /// Request cancellation. A no-op unless the schedule is armed; in
    /// particular cancelling after a one-shot fire is harmless.
    pub fn cancel(&mut self) {
        if self.state == State::Armed {
            self.state = State::Cancelled;
            self.deadline = None;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state == State::Armed
    }

    /// Report whether the deadline has elapsed at `now` and advance the
    /// state machine.
    ///
    /// One-shot schedules become terminal after firing. Periodic schedules
    /// re-arm with the next fire anchored to the previous deadline so the
    /// cadence does not drift; if the event loop fell behind a whole
    /// interval, the cycle restarts from `now` instead of bursting to catch
    /// up.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        if self.state != State::Armed {
            return false;
        }
        let Some(deadline) = self.deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }

        match self.mode {
            FireMode::Once => {
                self.state = State::Fired;
                self.deadline = None;
            }
            FireMode::Every(interval) => {
                let next = deadline + interval;
                self.deadline = Some(if next <= now { now + interval } else { next });
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn test_should_not_fire_when_idle() {
        let mut schedule = Schedule::idle();
        assert!(!schedule.is_armed());
        assert!(!schedule.fire_due(Instant::now()));
    }

    #[test]
    fn test_should_fire_one_shot_exactly_once() {
        let base = Instant::now();
        let mut schedule = Schedule::idle();
        schedule.arm(base, MS_100, FireMode::Once);

        assert!(!schedule.fire_due(at(base, 99)));
        assert!(schedule.fire_due(at(base, 100)));
        // terminal after firing
        assert!(!schedule.fire_due(at(base, 500)));
        assert!(!schedule.is_armed());
    }

    #[test]
    fn test_should_refire_periodic_every_interval() {
        let base = Instant::now();
        let mut schedule = Schedule::idle();
        schedule.arm(base, MS_100, FireMode::Every(MS_100));

        for n in 1..=5u64 {
            assert!(!schedule.fire_due(at(base, n * 100 - 1)));
            assert!(schedule.fire_due(at(base, n * 100)));
        }
        assert!(schedule.is_armed());
    }

    #[test]
    fn test_should_not_fire_after_cancel() {
        let base = Instant::now();
        let mut schedule = Schedule::idle();
        schedule.arm(base, MS_100, FireMode::Every(MS_100));

        assert!(schedule.fire_due(at(base, 100)));
        schedule.cancel();
        assert!(!schedule.is_armed());
        assert!(!schedule.fire_due(at(base, 200)));
        assert!(!schedule.fire_due(at(base, 1000)));
    }

    #[test]
    fn test_should_restart_cycle_on_rearm() {
        let base = Instant::now();
        let mut schedule = Schedule::idle();
        schedule.arm(base, MS_100, FireMode::Once);

        // last write wins: the original deadline is gone
        schedule.arm(at(base, 50), MS_100, FireMode::Once);
        assert!(!schedule.fire_due(at(base, 100)));
        assert!(schedule.fire_due(at(base, 150)));
    }

    #[test]
    fn test_should_ignore_cancel_after_one_shot_fired() {
        let base = Instant::now();
        let mut schedule = Schedule::idle();
        schedule.arm(base, MS_100, FireMode::Once);

        assert!(schedule.fire_due(at(base, 100)));
        schedule.cancel();
        // can still be re-armed afterwards
        schedule.arm(at(base, 200), MS_100, FireMode::Once);
        assert!(schedule.fire_due(at(base, 300)));
    }

    #[test]
    fn test_should_restart_from_now_when_loop_fell_behind() {
        let base = Instant::now();
        let mut schedule = Schedule::idle();
        schedule.arm(base, MS_100, FireMode::Every(MS_100));

        // the loop shows up 350ms late; one fire, then the cadence restarts
        assert!(schedule.fire_due(at(base, 450)));
        assert!(!schedule.fire_due(at(base, 500)));
        assert!(schedule.fire_due(at(base, 550)));
    }
}
