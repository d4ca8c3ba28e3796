//! Render surface over an embedded-graphics draw target

use embedded_graphics::draw_target::{DrawTarget, DrawTargetExt};
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use lightning_core::menu::{HighlightStyle, ModeId, ModeOption};
use lightning_core::traits::RenderSurface;

use crate::layout::StripeLayout;
use crate::palette::Palette;

/// Draws the mode list as stripes on `D`
///
/// Drawing goes straight to the target, so `flush` is a no-op; targets that
/// buffer frames should be flushed by their owner.
pub struct StripeSurface<D> {
    target: D,
    palette: Palette,
}

impl<D> StripeSurface<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: D, palette: Palette) -> Self {
        Self { target, palette }
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    fn layout(&self, count: usize) -> StripeLayout {
        StripeLayout::new(self.target.bounding_box().size, count)
    }

    fn draw_stripe(
        &mut self,
        layout: &StripeLayout,
        option: &ModeOption,
        style: HighlightStyle,
    ) -> Result<(), D::Error> {
        let index = option.id as usize;
        let (fill, text) = self.palette.colors(style);
        let area = layout
            .stripe(index)
            .intersection(&self.target.bounding_box());
        if area.is_zero_sized() {
            return Ok(());
        }

        self.target.fill_solid(&area, fill)?;

        let mut clipped = self.target.clipped(&area);
        Text::with_baseline(
            option.label.as_str(),
            layout.text_origin(index),
            MonoTextStyle::new(&FONT_10X20, text),
            Baseline::Top,
        )
        .draw(&mut clipped)?;
        Ok(())
    }
}

impl<D> RenderSurface for StripeSurface<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Error = D::Error;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.target.clear(self.palette.background)
    }

    fn draw_option_list(
        &mut self,
        options: &[ModeOption],
        highlighted: ModeId,
    ) -> Result<(), Self::Error> {
        let layout = self.layout(options.len());
        for option in options {
            let style = if option.id == highlighted {
                HighlightStyle::Selected
            } else {
                HighlightStyle::Normal
            };
            self.draw_stripe(&layout, option, style)?;
        }
        Ok(())
    }

    fn draw_transient_highlight(
        &mut self,
        options: &[ModeOption],
        id: ModeId,
        style: HighlightStyle,
    ) -> Result<(), Self::Error> {
        let layout = self.layout(options.len());
        match options.iter().find(|option| option.id == id) {
            Some(option) => self.draw_stripe(&layout, option, style),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
