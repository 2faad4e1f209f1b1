use embedded_graphics::{
    image::{Image, ImageDrawableExt},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
};
use tinybmp::Bmp;

use crate::layout::ICON_SIZE;

/// OpenWeatherMap condition prefixes, in sprite-sheet row order.
pub const ICON_PREFIXES: [&str; 9] = ["01", "02", "03", "04", "09", "10", "11", "13", "50"];

/// Number of frames in the sheet: one day and one night column per row.
pub const ICON_FRAMES: u8 = (ICON_PREFIXES.len() * 2) as u8;

// 32x144 sheet: column 0 day, column 1 night, 16x16 per frame.
static ICON_SHEET: &[u8] = include_bytes!("icons/weather_icons.bmp");

/// Map an icon code such as `"10n"` to its sprite frame.
///
/// Returns `None` for codes whose two-digit prefix is not in the table.
pub fn icon_index(code: &str) -> Option<u8> {
    let prefix = code.get(0..2)?;
    let row = ICON_PREFIXES.iter().position(|p| *p == prefix)?;
    let night = code.as_bytes().get(2) == Some(&b'n');
    Some(row as u8 * 2 + u8::from(night))
}

/// Area of `frame` inside the sprite sheet.
fn frame_area(frame: u8) -> Rectangle {
    let col = (frame % 2) as i32;
    let row = (frame / 2) as i32;
    let size = ICON_SIZE as i32;
    Rectangle::new(
        Point::new(col * size, row * size),
        Size::new(ICON_SIZE, ICON_SIZE),
    )
}

/// Draw one 16x16 frame with its top-left corner at `(x, y)`.
///
/// Out-of-range frames draw nothing.
pub fn draw_icon<D>(target: &mut D, frame: u8, x: i32, y: i32)
where
    D: DrawTarget<Color = Rgb565>,
{
    if frame >= ICON_FRAMES {
        return;
    }
    if let Ok(sheet) = Bmp::<Rgb565>::from_slice(ICON_SHEET) {
        let sprite = sheet.sub_image(&frame_area(frame));
        Image::new(&sprite, Point::new(x, y)).draw(target).ok();
    }
}
