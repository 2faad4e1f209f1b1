use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

/// Convert 8-bit RGB to Rgb565.
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

// ── Palette (each LED is effectively off / low / high per channel) ──

pub const COLOR_AQUA: Rgb565 = rgb(0x00, 0xA2, 0xFF);
pub const COLOR_BLUE_ROYAL: Rgb565 = rgb(0x00, 0x55, 0xFF);
pub const COLOR_GREY: Rgb565 = rgb(0x55, 0x55, 0x55);
pub const COLOR_LIME: Rgb565 = rgb(0x55, 0xA2, 0x00);
pub const COLOR_LIME_LIGHT: Rgb565 = rgb(0x90, 0xFF, 0x90);
pub const COLOR_PURPLE: Rgb565 = rgb(0x90, 0x00, 0xFF);
pub const COLOR_WHITE: Rgb565 = rgb(0xFF, 0xFF, 0xFF);
pub const COLOR_YELLOW: Rgb565 = rgb(0xFF, 0xA8, 0x00);

pub const BG_COLOR: Rgb565 = Rgb565::BLACK;

pub const TEMP_COLOR: Rgb565 = COLOR_YELLOW;
pub const WIND_COLOR: Rgb565 = COLOR_LIME_LIGHT;
pub const DESCRIPTION_COLOR: Rgb565 = COLOR_AQUA;
pub const CITY_COLOR: Rgb565 = COLOR_PURPLE;
pub const SPLASH_COLOR: Rgb565 = COLOR_BLUE_ROYAL;

/// Clock colors by time-of-day band: night, day, evening.
pub const TIME_COLORS: [Rgb565; 3] = [COLOR_LIME, COLOR_WHITE, COLOR_GREY];

// ── Geometry (64x32 HUB75 panel) ────────────────────────────────────

pub const SCREEN_W: i32 = 64;
pub const SCREEN_H: i32 = 32;

pub const ICON_SIZE: u32 = 16;
pub const ICON_X: i32 = SCREEN_W - ICON_SIZE as i32;
pub const ICON_Y: i32 = 0;

/// Top-left of the clock digits.
pub const CLOCK_X: i32 = 0;
pub const CLOCK_Y: i32 = 0;

/// Top of the temperature (left) and wind (right-aligned) row.
pub const DETAIL_ROW_Y: i32 = 17;

/// Top of the scrolling marquee row (city + description).
pub const MARQUEE_Y: i32 = 25;
pub const MARQUEE_GAP: &str = "  ";

/// Glyph width of the small Latin-1 font used for detail rows.
pub const SMALL_GLYPH_W: i32 = 4;
