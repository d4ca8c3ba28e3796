//! Stripe geometry
//!
//! The screen is split into one stripe per mode, top to bottom. Stripe
//! height is the screen height divided by the mode count, rounded to the
//! nearest pixel, so the last stripe may be clipped or leave a sliver.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

/// Offset of the label from the stripe's top-left corner
pub const TEXT_INSET: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripeLayout {
    width: u32,
    stripe_height: u32,
}

impl StripeLayout {
    /// Layout for `count` stripes on a `size` screen
    pub fn new(size: Size, count: usize) -> Self {
        let count = count.max(1) as u32;
        let stripe_height = (2 * size.height + count) / (2 * count);
        Self {
            width: size.width,
            stripe_height,
        }
    }

    pub fn stripe_height(&self) -> u32 {
        self.stripe_height
    }

    /// Area covered by stripe `index`
    pub fn stripe(&self, index: usize) -> Rectangle {
        let top = (self.stripe_height as usize * index) as i32;
        Rectangle::new(
            Point::new(0, top),
            Size::new(self.width, self.stripe_height),
        )
    }

    /// Top-left corner of the label in stripe `index`
    pub fn text_origin(&self, index: usize) -> Point {
        self.stripe(index).top_left + Point::new(TEXT_INSET, TEXT_INSET)
    }
}
