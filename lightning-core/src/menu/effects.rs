//! Effects emitted by the menu
//!
//! Menu operations are pure: they update the selection and return the list
//! of outward actions for the caller to carry out, in order.

use heapless::Vec;

use super::options::ModeId;

/// Upper bound on effects from a single menu operation
pub const MAX_EFFECTS: usize = 8;

/// Ordered effects of one operation
pub type Effects = Vec<Effect, MAX_EFFECTS>;

/// How a single option row is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HighlightStyle {
    /// Unselected row
    Normal,
    /// Row of the current selection
    Selected,
    /// Confirmation flash
    Flash,
}

/// One outward action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Clear and redraw the whole list with one row highlighted
    Redraw { highlighted: ModeId },
    /// Redraw a single row in the given style
    Highlight { id: ModeId, style: HighlightStyle },
    /// Keep the current picture for this long before the next effect
    Hold { ms: u32 },
    /// Send the mode's label to the serial peer
    Transmit(ModeId),
    /// Publish the mode's label as the retained state
    Publish(ModeId),
}

impl Effect {
    /// Returns true for effects handled by the render surface
    pub fn is_render(&self) -> bool {
        matches!(self, Effect::Redraw { .. } | Effect::Highlight { .. })
    }
}

/// Append `more`; a menu operation never emits more than `MAX_EFFECTS`
pub(crate) fn extend(effects: &mut Effects, more: &[Effect]) {
    let result = effects.extend_from_slice(more);
    debug_assert!(result.is_ok(), "menu operation exceeded MAX_EFFECTS");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_to_capacity() {
        let mut effects = Effects::new();
        extend(&mut effects, &[Effect::Hold { ms: 1 }; MAX_EFFECTS - 1]);
        extend(&mut effects, &[Effect::Transmit(0)]);
        assert_eq!(effects.len(), MAX_EFFECTS);
        assert_eq!(effects[MAX_EFFECTS - 1], Effect::Transmit(0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exceeded MAX_EFFECTS")]
    fn test_extend_past_capacity_is_caught() {
        let mut effects = Effects::new();
        extend(&mut effects, &[Effect::Hold { ms: 1 }; MAX_EFFECTS]);
        extend(&mut effects, &[Effect::Transmit(0)]);
    }
}
