//! Button panel
//!
//! Four momentary buttons labelled A, B, X, Y are polled in that order.
//! Each reports a press edge, and after being held long enough it repeats
//! at a fixed rate. Polling stops at the first button that fires; the
//! remaining buttons are left untouched so their edges surface on the next
//! poll.

use lightning_hal::gpio::InputPin;

/// Action bound to a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonAction {
    Prev,
    Next,
    Confirm,
}

/// Action bindings for the four buttons
///
/// `None` leaves a button unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonMap {
    pub a: Option<ButtonAction>,
    pub b: Option<ButtonAction>,
    pub x: Option<ButtonAction>,
    pub y: Option<ButtonAction>,
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            a: Some(ButtonAction::Confirm),
            b: Some(ButtonAction::Prev),
            x: Some(ButtonAction::Confirm),
            y: Some(ButtonAction::Next),
        }
    }
}

impl ButtonMap {
    /// Bindings in poll order
    pub fn in_order(&self) -> [Option<ButtonAction>; 4] {
        [self.a, self.b, self.x, self.y]
    }
}

/// Hold-to-repeat timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RepeatTiming {
    /// Time a button must be held before it starts repeating
    pub hold_ms: u32,
    /// Interval between repeats; 0 disables repeating
    pub repeat_ms: u32,
}

impl Default for RepeatTiming {
    fn default() -> Self {
        Self {
            hold_ms: 1000,
            repeat_ms: 200,
        }
    }
}

/// Edge and repeat tracking for one button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tracker {
    pressed: bool,
    pressed_at_ms: u64,
    last_fire_ms: u64,
}

impl Tracker {
    /// Returns true when the button fires at `now_ms`
    fn update(&mut self, asserted: bool, now_ms: u64, timing: &RepeatTiming) -> bool {
        if !asserted {
            self.pressed = false;
            return false;
        }

        if !self.pressed {
            self.pressed = true;
            self.pressed_at_ms = now_ms;
            self.last_fire_ms = now_ms;
            return true;
        }

        if timing.repeat_ms == 0 {
            return false;
        }
        let held = now_ms.saturating_sub(self.pressed_at_ms);
        let since_fire = now_ms.saturating_sub(self.last_fire_ms);
        if held >= timing.hold_ms as u64 && since_fire >= timing.repeat_ms as u64 {
            self.last_fire_ms = now_ms;
            return true;
        }
        false
    }
}

/// Four buttons polled in priority order
pub struct ButtonPanel<P: InputPin> {
    pins: [P; 4],
    actions: [Option<ButtonAction>; 4],
    trackers: [Tracker; 4],
    active_low: bool,
    timing: RepeatTiming,
}

impl<P: InputPin> ButtonPanel<P> {
    /// Create a panel from pins in A, B, X, Y order
    pub fn new(pins: [P; 4], map: ButtonMap, active_low: bool, timing: RepeatTiming) -> Self {
        Self {
            pins,
            actions: map.in_order(),
            trackers: [Tracker::default(); 4],
            active_low,
            timing,
        }
    }

    /// Poll the buttons once
    ///
    /// Returns the action of the first bound button that fires.
    pub fn poll(&mut self, now_ms: u64) -> Option<ButtonAction> {
        for ((pin, action), tracker) in self
            .pins
            .iter()
            .zip(self.actions.iter())
            .zip(self.trackers.iter_mut())
        {
            let asserted = pin.is_asserted(self.active_low);
            if tracker.update(asserted, now_ms, &self.timing) {
                if let Some(action) = action {
                    return Some(*action);
                }
            }
        }
        None
    }
}
