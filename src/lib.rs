//! GPIO output scheduling driver.
//!
//! An [`OutputDriver`] owns one digital output line and flips it under three
//! competing timing policies: a debounce filter on immediate toggles, a
//! fixed-cadence repeat and a one-shot auto-off delay. Everything runs on a
//! single cooperative event loop; the driver never blocks and the loop
//! supplies time through [`OutputDriver::tick`].
//!
//! While registered with the [`Registrar`], every accepted flip is reported
//! to the controller as a virtual key transition, so a controller can react
//! to its own LEDs the way it reacts to buttons.

#[macro_use]
extern crate log;

pub mod debounce;
pub mod driver;
pub mod gpio;
pub mod registrar;
pub mod schedule;

pub use self::debounce::Debounce;
pub use self::driver::{DriverError, OutputDriver, REPEAT_INTERVAL};
pub use self::gpio::{LineError, LineProvider, OutputLine};
pub use self::registrar::{KeyHandler, Registrar, VirtualKey};
pub use self::schedule::{FireMode, Schedule};
