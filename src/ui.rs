//! Two-zone key face: Escape on the left half, Shift on the right.

use embedded_graphics::{
    pixelcolor::{raw::RawU16, Rgb565},
    prelude::*,
    primitives::Rectangle,
};
use u8g2_fonts::{
    fonts,
    types::{FontColor, HorizontalAlignment, VerticalPosition},
    Error as FontError, FontRenderer,
};

use crate::dial::TouchZone;

pub const ESCAPE_COLOR: u16 = 0xF800;
pub const SHIFT_COLOR: u16 = 0x001F;
pub const SHIFT_LOCK_COLOR: u16 = 0x021F;
pub const PRESSED_FACTOR: f32 = 0.7;
const LOCK_LINE_OFFSET: i32 = 12;
const LABEL_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvB12_tf>();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZonePalette {
    pub escape: Rgb565,
    pub shift: Rgb565,
}

pub fn zone_palette(pressed: TouchZone, shift_locked: bool) -> ZonePalette {
    let escape = rgb565(ESCAPE_COLOR);
    let shift = rgb565(if shift_locked {
        SHIFT_LOCK_COLOR
    } else {
        SHIFT_COLOR
    });

    ZonePalette {
        escape: if pressed == TouchZone::Escape {
            darken(escape, PRESSED_FACTOR)
        } else {
            escape
        },
        shift: if pressed == TouchZone::Shift {
            darken(shift, PRESSED_FACTOR)
        } else {
            shift
        },
    }
}

/// Scales each channel and truncates, component-wise in 5/6/5 space.
pub fn darken(color: Rgb565, factor: f32) -> Rgb565 {
    let scale = |channel: u8| (f32::from(channel) * factor) as u8;
    Rgb565::new(scale(color.r()), scale(color.g()), scale(color.b()))
}

fn rgb565(raw: u16) -> Rgb565 {
    Rgb565::from(RawU16::new(raw))
}

pub fn draw_zones<D>(display: &mut D, pressed: TouchZone, shift_locked: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let bounds = display.bounding_box();
    let width = bounds.size.width as i32;
    let height = bounds.size.height as i32;
    let half = width / 2;
    let palette = zone_palette(pressed, shift_locked);

    display.fill_solid(
        &Rectangle::new(bounds.top_left, Size::new(half as u32, height as u32)),
        palette.escape,
    )?;
    display.fill_solid(
        &Rectangle::new(
            bounds.top_left + Point::new(half, 0),
            Size::new((width - half) as u32, height as u32),
        ),
        palette.shift,
    )?;

    let center_y = bounds.top_left.y + height / 2;
    let escape_x = bounds.top_left.x + half / 2;
    let shift_x = bounds.top_left.x + half + (width - half) / 2;

    draw_label(display, "ESC", Point::new(escape_x, center_y))?;
    if shift_locked {
        draw_label(
            display,
            "Shift",
            Point::new(shift_x, center_y - LOCK_LINE_OFFSET),
        )?;
        draw_label(
            display,
            "Lock",
            Point::new(shift_x, center_y + LOCK_LINE_OFFSET),
        )
    } else {
        draw_label(display, "Shift", Point::new(shift_x, center_y))
    }
}

fn draw_label<D>(display: &mut D, text: &str, center: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    match LABEL_FONT.render_aligned(
        text,
        center,
        VerticalPosition::Center,
        HorizontalAlignment::Center,
        FontColor::Transparent(Rgb565::WHITE),
        display,
    ) {
        Ok(_) => Ok(()),
        Err(FontError::DisplayError(err)) => Err(err),
        // Labels are fixed ASCII in a font that carries them.
        Err(_) => Ok(()),
    }
}
