pub mod mem;
pub mod rpi;

use thiserror::Error;

/// Errors raised by the peripheral access layer.
#[derive(Debug, Error)]
pub enum LineError {
    /// The identifier does not name an output line on this board.
    #[error("no such output line: {0}")]
    NoSuchLine(String),
    /// The line is already claimed by another driver.
    #[error("output line {0} is already claimed")]
    Claimed(String),
    /// The line was closed before use.
    #[error("output line is closed")]
    Closed,
    /// The underlying peripheral reported an I/O fault.
    #[error("gpio fault: {0}")]
    Gpio(String),
}

/// A single digital output line.
///
/// A line is exclusively owned by whoever opened it; dropping the handle
/// releases the claim.
pub trait OutputLine {
    /// Drive the line high (`true`) or low (`false`).
    fn set_state(&mut self, high: bool) -> Result<(), LineError>;
}

/// Peripheral access collaborator: hands out exclusively-owned output lines.
pub trait LineProvider {
    type Line: OutputLine;

    /// Open the line named by `identifier`, initially driven low.
    ///
    /// Opening a line that is already claimed fails with
    /// [`LineError::Claimed`]; two drivers can never alias the same physical
    /// line.
    fn open_line(&self, identifier: &str) -> Result<Self::Line, LineError>;
}
