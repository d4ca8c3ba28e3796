//! GPIO pin abstractions
//!
//! Provides the digital input trait used by the button panel.

/// Digital input pin
///
/// Implementations read the actual hardware level for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Check if the pin is at its asserted level
    ///
    /// Buttons wired to ground with a pull-up are `active_low`.
    fn is_asserted(&self, active_low: bool) -> bool {
        if active_low {
            self.is_low()
        } else {
            self.is_high()
        }
    }
}

impl<T: InputPin + ?Sized> InputPin for &T {
    fn is_high(&self) -> bool {
        (**self).is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Level(bool);

    impl InputPin for Level {
        fn is_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_active_low_asserted() {
        assert!(Level(false).is_asserted(true));
        assert!(!Level(true).is_asserted(true));
    }

    #[test]
    fn test_active_high_asserted() {
        assert!(Level(true).is_asserted(false));
        assert!(!Level(false).is_asserted(false));
    }

    #[test]
    fn test_reference_forwarding() {
        let pin = Level(true);
        let by_ref = &pin;
        assert!(by_ref.is_high());
        assert!(!by_ref.is_low());
    }
}
