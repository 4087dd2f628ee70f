//! Relay output
//!
//! Drives a relay, SSR or contactor coil from a GPIO pin. The pin can be
//! wired active-high or active-low (common on opto-isolated relay boards).

use embedded_hal::digital::OutputPin;
use hearth_core::config::Polarity;
use hearth_core::traits::SwitchOutput;

/// Relay on a GPIO pin
pub struct Relay<P> {
    pin: P,
    polarity: Polarity,
    /// Current logical state (true = energized)
    on: bool,
    /// Last pin write failed
    write_failed: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Create a relay output, released
    pub fn new(pin: P, polarity: Polarity) -> Self {
        let mut relay = Self {
            pin,
            polarity,
            on: true,
            write_failed: false,
        };
        // Ensure the relay starts released
        relay.set_on(false);
        relay
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, Polarity::ActiveHigh)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, Polarity::ActiveLow)
    }

    /// The last pin write returned an error
    pub fn write_failed(&self) -> bool {
        self.write_failed
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> SwitchOutput for Relay<P> {
    fn set_on(&mut self, on: bool) {
        // Written every call so a glitched pin is corrected on the next tick
        let result = if self.polarity.level_for(on) {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        self.write_failed = result.is_err();
        self.on = on;
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

    /// Mock GPIO pin for testing
    pub struct MockPin {
        pub high: bool,
        pub writes: u32,
    }

    impl MockPin {
        pub fn new() -> Self {
            Self {
                high: false,
                writes: 0,
            }
        }
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }
    }

    #[derive(Debug)]
    pub struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Pin whose writes always fail
    pub struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = PinFault;
    }

    impl OutputPin for BrokenPin {
        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(PinFault)
        }

        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(PinFault)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{BrokenPin, MockPin};
    use super::*;

    #[test]
    fn test_active_high_relay() {
        let mut relay = Relay::new_active_high(MockPin::new());

        // Initially released
        assert!(!relay.is_on());
        assert!(!relay.pin.high);

        relay.set_on(true);
        assert!(relay.is_on());
        assert!(relay.pin.high);

        relay.set_on(false);
        assert!(!relay.is_on());
        assert!(!relay.pin.high);
    }

    #[test]
    fn test_active_low_relay() {
        let mut relay = Relay::new_active_low(MockPin::new());

        // Released means pin high for active-low
        assert!(!relay.is_on());
        assert!(relay.pin.high);

        relay.set_on(true);
        assert!(relay.is_on());
        assert!(!relay.pin.high);
    }

    #[test]
    fn test_rewrites_every_call() {
        let mut relay = Relay::new_active_high(MockPin::new());
        relay.set_on(true);
        relay.set_on(true);
        let pin = relay.release();
        assert_eq!(pin.writes, 3);
    }

    #[test]
    fn test_write_failure_reported() {
        let mut relay = Relay::new_active_high(BrokenPin);
        assert!(relay.write_failed());
        relay.set_on(true);
        assert!(relay.write_failed());
    }
}
