//! Render surface trait for the mode list

use crate::menu::{Effect, HighlightStyle, ModeId, ModeOption, ModeTable};

/// A screen that shows the mode list as full-width stripes
///
/// Every call receives the full option list so implementations can derive
/// the layout without keeping menu state of their own.
pub trait RenderSurface {
    type Error;

    /// Fill the screen with the background colour
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Draw every option, with `highlighted` in the selected style
    fn draw_option_list(
        &mut self,
        options: &[ModeOption],
        highlighted: ModeId,
    ) -> Result<(), Self::Error>;

    /// Redraw one option's stripe in `style`
    fn draw_transient_highlight(
        &mut self,
        options: &[ModeOption],
        id: ModeId,
        style: HighlightStyle,
    ) -> Result<(), Self::Error>;

    /// Push pending drawing to the panel
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Carry out a render effect on `surface`
///
/// Non-render effects are ignored and return `Ok(false)`.
pub fn apply_render<S: RenderSurface + ?Sized>(
    surface: &mut S,
    table: &ModeTable,
    effect: &Effect,
) -> Result<bool, S::Error> {
    match *effect {
        Effect::Redraw { highlighted } => {
            surface.clear()?;
            surface.draw_option_list(table.options(), highlighted)?;
        }
        Effect::Highlight { id, style } => {
            surface.draw_transient_highlight(table.options(), id, style)?;
        }
        _ => return Ok(false),
    }
    surface.flush()?;
    Ok(true)
}
