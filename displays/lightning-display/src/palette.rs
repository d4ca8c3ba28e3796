//! Stripe colours

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;
use lightning_core::menu::HighlightStyle;

/// Colour scheme for the stripe list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb565,
    /// Text of unselected stripes and fill of the selected stripe
    pub accent: Rgb565,
    /// Fill of the stripe during the confirmation flash
    pub flash: Rgb565,
}

impl Palette {
    /// Cyan on black with a yellow flash
    pub const LIGHTNING: Palette = Palette {
        // #21B1FF
        accent: Rgb565::new(4, 44, 31),
        // #FFD800
        flash: Rgb565::new(31, 54, 0),
        background: Rgb565::BLACK,
    };

    /// (fill, text) colours for a stripe drawn in `style`
    pub fn colors(&self, style: HighlightStyle) -> (Rgb565, Rgb565) {
        match style {
            HighlightStyle::Normal => (self.background, self.accent),
            HighlightStyle::Selected => (self.accent, self.background),
            HighlightStyle::Flash => (self.flash, self.background),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::LIGHTNING
    }
}
