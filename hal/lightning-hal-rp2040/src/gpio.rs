//! Button inputs
//!
//! Wraps embassy-rp input pins so the core button panel can poll them.

use embassy_rp::gpio::{Input, Pin, Pull};
use embassy_rp::Peri;

use lightning_hal::InputPin;

/// A momentary push button on a GPIO pin
pub struct Button<'d> {
    input: Input<'d>,
}

impl<'d> Button<'d> {
    /// Configure a pin as a button input
    ///
    /// Active-low buttons need the internal pull-up; active-high ones
    /// get a pull-down so an open contact reads as released.
    pub fn new(pin: Peri<'d, impl Pin>, active_low: bool) -> Self {
        let pull = if active_low { Pull::Up } else { Pull::Down };
        Self {
            input: Input::new(pin, pull),
        }
    }
}

impl InputPin for Button<'_> {
    fn is_high(&self) -> bool {
        self.input.is_high()
    }
}
