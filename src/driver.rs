use std::time::{Duration, Instant};

use thiserror::Error;

use crate::debounce::Debounce;
use crate::gpio::{LineError, LineProvider, OutputLine};
use crate::registrar::{Registrar, VirtualKey};
use crate::schedule::{FireMode, Schedule};

/// Cadence of the repeating toggle. Driver policy, not user-configurable.
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum DriverError {
    /// The line could not be opened, or was closed before use.
    #[error("hardware unavailable: {0}")]
    HardwareUnavailable(#[from] LineError),
    /// `register` was called twice.
    #[error("driver is already registered")]
    AlreadyRegistered,
    /// `close` was called twice.
    #[error("driver is already closed")]
    AlreadyClosed,
}

/// Output scheduling driver.
///
/// Owns one digital output line and exposes a toggle surface guarded by
/// three timing policies: a debounce filter on immediate toggles, a periodic
/// repeat and a one-shot auto-off delay. The driver never blocks; the
/// surrounding event loop supplies time through [`OutputDriver::tick`], and
/// all operations on one driver are strictly ordered by arrival on that
/// loop.
///
/// While registered, every accepted flip is reported through the
/// [`Registrar`] as a key transition: high is a key down, low a key up.
#[derive(Debug)]
pub struct OutputDriver<L: OutputLine> {
    identifier: String,
    key: VirtualKey,
    line: Option<L>,
    high: bool,
    debounce: Debounce,
    repeat: Schedule,
    timeout: Schedule,
    registrar: Registrar,
    registered: bool,
}

impl<L: OutputLine> OutputDriver<L> {
    /// Open the line named by `identifier` and bind it to `key`.
    ///
    /// The line starts low. Fails with [`DriverError::HardwareUnavailable`]
    /// when the line does not exist, is already claimed by another driver,
    /// or faults; a failed construction claims nothing.
    pub fn open<P>(
        provider: &P,
        identifier: &str,
        key: VirtualKey,
        registrar: Registrar,
    ) -> Result<Self, DriverError>
    where
        P: LineProvider<Line = L>,
    {
        let line = provider.open_line(identifier)?;
        debug!("opened output driver on {identifier} as {key}");
        Ok(OutputDriver {
            identifier: identifier.to_string(),
            key,
            line: Some(line),
            high: false,
            debounce: Debounce::disabled(),
            repeat: Schedule::idle(),
            timeout: Schedule::idle(),
            registrar,
            registered: false,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn virtual_key(&self) -> VirtualKey {
        self.key
    }

    /// Current logical state of the line.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Set the minimum interval between accepted immediate toggles. Intended
    /// to be called before [`OutputDriver::register`]; a zero delay disables
    /// debouncing.
    pub fn set_debounce_delay(&mut self, delay: Duration) {
        self.debounce.set_min_interval(delay);
    }

    /// Activate key reporting for this driver's virtual key.
    pub fn register(&mut self) -> Result<(), DriverError> {
        if self.line.is_none() {
            return Err(DriverError::HardwareUnavailable(LineError::Closed));
        }
        if self.registered {
            return Err(DriverError::AlreadyRegistered);
        }
        self.registrar.register(self.key);
        self.registered = true;
        Ok(())
    }

    /// Flip the line once, then keep flipping it every [`REPEAT_INTERVAL`]
    /// until cancelled.
    ///
    /// The immediate flip goes through the debounce filter; the repeating
    /// flips do not, they are already spaced by the interval. Calling this
    /// while already repeating drops the old cycle and restarts from now, so
    /// there is never a duplicate timer.
    pub fn toggle_repeat(&mut self, now: Instant) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.debounced_toggle(now)?;
        debug!("{}: arming repeat every {:?}", self.identifier, REPEAT_INTERVAL);
        self.repeat
            .arm(now, REPEAT_INTERVAL, FireMode::Every(REPEAT_INTERVAL));
        Ok(())
    }

    /// Flip the line once, then flip it back exactly once after `delay`.
    ///
    /// The immediate flip goes through the debounce filter; the delayed flip
    /// does not. Calling this while an auto-off is pending cancels it and
    /// restarts the delay from now (last write wins, never two flips).
    pub fn toggle_timeout(&mut self, now: Instant, delay: Duration) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.debounced_toggle(now)?;
        debug!("{}: arming auto-off in {:?}", self.identifier, delay);
        self.timeout.arm(now, delay, FireMode::Once);
        Ok(())
    }

    /// Cancel any pending repeat or auto-off callback without touching the
    /// output state. A no-op when nothing is pending.
    pub fn cancel_callbacks(&mut self) {
        self.repeat.cancel();
        self.timeout.cancel();
    }

    /// Deactivate key reporting. Does not flip the line and does not cancel
    /// pending callbacks; cancel first if that matters.
    pub fn unregister(&mut self) {
        if self.registered {
            self.registrar.unregister(self.key);
            self.registered = false;
        }
    }

    /// Cancel all pending callbacks and release the line.
    ///
    /// A second close fails with [`DriverError::AlreadyClosed`] but performs
    /// no action.
    pub fn close(&mut self) -> Result<(), DriverError> {
        if self.line.is_none() {
            return Err(DriverError::AlreadyClosed);
        }
        // cancel before releasing so no fire can hit a closed line
        self.cancel_callbacks();
        self.line = None;
        debug!("closed output driver on {}", self.identifier);
        Ok(())
    }

    /// Fire whichever schedules came due at `now`.
    ///
    /// Called by the surrounding event loop; never blocks. A fire racing a
    /// close is swallowed as a no-op rather than faulting.
    pub fn tick(&mut self, now: Instant) {
        if self.repeat.fire_due(now) {
            self.fire_toggle();
        }
        if self.timeout.fire_due(now) {
            self.fire_toggle();
        }
    }

    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.line.is_none() {
            return Err(DriverError::HardwareUnavailable(LineError::Closed));
        }
        Ok(())
    }

    /// An immediate toggle: dropped silently when it arrives inside the
    /// debounce window.
    fn debounced_toggle(&mut self, now: Instant) -> Result<(), DriverError> {
        if !self.debounce.accept(now) {
            trace!("{}: toggle debounced", self.identifier);
            return Ok(());
        }
        self.apply_toggle()
    }

    /// A schedule-driven toggle: bypasses debounce, suppressed on a closed
    /// line.
    fn fire_toggle(&mut self) {
        if self.line.is_none() {
            debug!("{}: suppressing fire on closed line", self.identifier);
            return;
        }
        if let Err(e) = self.apply_toggle() {
            error!("{}: scheduled toggle failed: {e}", self.identifier);
        }
    }

    fn apply_toggle(&mut self) -> Result<(), DriverError> {
        let line = self
            .line
            .as_mut()
            .ok_or(DriverError::HardwareUnavailable(LineError::Closed))?;
        let next = !self.high;
        line.set_state(next)?;
        self.high = next;
        if self.registered {
            self.registrar.report(self.key, next);
        }
        Ok(())
    }
}

impl<L: OutputLine> Drop for OutputDriver<L> {
    fn drop(&mut self) {
        self.unregister();
        let _ = self.close();
    }
}
