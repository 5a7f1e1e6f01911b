use rppal::gpio::{Gpio, OutputPin};

use super::{LineError, LineProvider, OutputLine};

/// Raspberry Pi line provider backed by rppal.
///
/// Identifiers use BCM numbering, either as `BCM<n>` or a bare pin number.
/// Exclusive ownership is enforced by rppal's in-process pin claiming:
/// opening a pin that another driver holds fails instead of aliasing it.
pub struct RaspberryProvider {
    gpio: Gpio,
}

impl RaspberryProvider {
    pub fn new() -> Result<Self, LineError> {
        let gpio = Gpio::new().map_err(|e| LineError::Gpio(e.to_string()))?;
        Ok(RaspberryProvider { gpio })
    }
}

impl LineProvider for RaspberryProvider {
    type Line = RaspberryLine;

    fn open_line(&self, identifier: &str) -> Result<RaspberryLine, LineError> {
        let pin = parse_bcm(identifier)
            .ok_or_else(|| LineError::NoSuchLine(identifier.to_string()))?;
        let pin = self.gpio.get(pin).map_err(|e| match e {
            rppal::gpio::Error::PinUsed(_) => LineError::Claimed(identifier.to_string()),
            rppal::gpio::Error::PinNotAvailable(_) => {
                LineError::NoSuchLine(identifier.to_string())
            }
            e => LineError::Gpio(e.to_string()),
        })?;
        debug!("claimed gpio line {identifier}");
        Ok(RaspberryLine {
            pin: pin.into_output_low(),
        })
    }
}

/// An rppal-backed output line. Dropping it releases the pin.
pub struct RaspberryLine {
    pin: OutputPin,
}

impl OutputLine for RaspberryLine {
    fn set_state(&mut self, high: bool) -> Result<(), LineError> {
        if high {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

fn parse_bcm(identifier: &str) -> Option<u8> {
    identifier
        .strip_prefix("BCM")
        .unwrap_or(identifier)
        .parse()
        .ok()
}
