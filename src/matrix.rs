use anyhow::Result;
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    mono_font::{iso_8859_1::FONT_4X6, MonoTextStyle},
    pixelcolor::{raw::RawU16, Rgb565},
    prelude::*,
    primitives::Rectangle,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
    Pixel,
};
use profont::PROFONT_12_POINT;

use crate::layout::*;
use crate::surface::{RenderSurface, Slot};
use crate::weather_icons::draw_icon;

/// Sink for finished frames (the HUB75 driver on hardware).
pub trait MatrixPanel {
    /// Push one full frame of RGB565 pixels, row-major.
    fn draw_frame(&mut self, pixels: &[u16], width: u32, height: u32) -> Result<()>;
}

/// RGB565 framebuffer for the whole matrix.
pub struct MatrixFramebuffer {
    buf: Vec<u16>,
    width: u32,
    height: u32,
}

impl MatrixFramebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: vec![0; (width * height) as usize],
            width,
            height,
        }
    }

    pub fn clear_color(&mut self, color: Rgb565) {
        let raw = RawU16::from(color).into_inner();
        self.buf.fill(raw);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let raw = self.buf[(y as u32 * self.width + x as u32) as usize];
        Some(Rgb565::from(RawU16::new(raw)))
    }

    /// True if any pixel inside `area` differs from `color`.
    pub fn any_pixel_not(&self, area: &Rectangle, color: Rgb565) -> bool {
        area.points()
            .filter_map(|p| self.pixel(p.x, p.y))
            .any(|c| c != color)
    }

    pub fn flush_to_panel<P: MatrixPanel>(&self, panel: &mut P) -> Result<()> {
        panel.draw_frame(&self.buf, self.width, self.height)
    }
}

impl OriginDimensions for MatrixFramebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for MatrixFramebuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.width;
        let h = self.height;
        for Pixel(point, color) in pixels {
            let x = point.x;
            let y = point.y;
            if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
                let idx = (y as u32 * w + x as u32) as usize;
                self.buf[idx] = RawU16::from(color).into_inner();
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let raw = RawU16::from(color).into_inner();
        let display = self.bounding_box();
        let area = area.intersection(&display);
        let w = self.width;
        for y in area.rows() {
            let row_start = (y as u32 * w) as usize;
            for x in area.columns() {
                self.buf[row_start + x as usize] = raw;
            }
        }
        Ok(())
    }
}

/// Render surface backed by a framebuffer and a panel.
///
/// Slot contents are staged by the views and composed into a complete frame
/// on `commit`. City and description share the bottom row as a marquee.
pub struct MatrixSurface<P: MatrixPanel> {
    panel: P,
    fb: MatrixFramebuffer,
    texts: [String; Slot::ALL.len()],
    colors: [Rgb565; Slot::ALL.len()],
    icon: Option<u8>,
    marquee_offset: i32,
}

impl<P: MatrixPanel> MatrixSurface<P> {
    pub fn new(panel: P) -> Self {
        let mut colors = [COLOR_WHITE; Slot::ALL.len()];
        colors[Slot::Clock.index()] = TIME_COLORS[0];
        colors[Slot::Temperature.index()] = TEMP_COLOR;
        colors[Slot::Wind.index()] = WIND_COLOR;
        colors[Slot::Description.index()] = DESCRIPTION_COLOR;
        colors[Slot::City.index()] = CITY_COLOR;
        Self {
            panel,
            fb: MatrixFramebuffer::new(SCREEN_W as u32, SCREEN_H as u32),
            texts: Default::default(),
            colors,
            icon: None,
            marquee_offset: 0,
        }
    }

    pub fn framebuffer(&self) -> &MatrixFramebuffer {
        &self.fb
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Boot screen shown until the first real frame.
    pub fn show_splash(&mut self, status: &str) -> Result<()> {
        self.fb.clear_color(BG_COLOR);
        let title = MonoTextStyle::new(&FONT_4X6, SPLASH_COLOR);
        Text::with_baseline("Weather", Point::new(2, 4), title, Baseline::Top)
            .draw(&mut self.fb)
            .ok();
        Text::with_baseline("Clock", Point::new(2, 11), title, Baseline::Top)
            .draw(&mut self.fb)
            .ok();
        let status_style = MonoTextStyle::new(&FONT_4X6, COLOR_GREY);
        Text::with_baseline(status, Point::new(2, MARQUEE_Y), status_style, Baseline::Top)
            .draw(&mut self.fb)
            .ok();
        self.fb.flush_to_panel(&mut self.panel)
    }

    fn text(&self, slot: Slot) -> &str {
        &self.texts[slot.index()]
    }

    fn color(&self, slot: Slot) -> Rgb565 {
        self.colors[slot.index()]
    }

    /// Pixel width of the marquee text, without the wrap gap.
    fn marquee_width(&self) -> i32 {
        self.marquee_segments()
            .iter()
            .map(|(text, _)| text.chars().count() as i32 * SMALL_GLYPH_W)
            .sum()
    }

    fn marquee_segments(&self) -> Vec<(String, Rgb565)> {
        let mut segments = Vec::new();
        for slot in [Slot::City, Slot::Description] {
            let text = self.text(slot);
            if text.is_empty() {
                continue;
            }
            if !segments.is_empty() {
                segments.push((MARQUEE_GAP.to_string(), BG_COLOR));
            }
            segments.push((text.to_string(), self.color(slot)));
        }
        segments
    }

    fn marquee_cycle(&self) -> i32 {
        self.marquee_width() + MARQUEE_GAP.len() as i32 * SMALL_GLYPH_W
    }

    fn draw_marquee(&mut self) {
        let width = self.marquee_width();
        let starts = if width <= SCREEN_W {
            vec![0]
        } else {
            let cycle = self.marquee_cycle();
            vec![-self.marquee_offset, cycle - self.marquee_offset]
        };
        let segments = self.marquee_segments();
        for start in starts {
            let mut x = start;
            for (text, color) in &segments {
                let style = MonoTextStyle::new(&FONT_4X6, *color);
                Text::with_baseline(text, Point::new(x, MARQUEE_Y), style, Baseline::Top)
                    .draw(&mut self.fb)
                    .ok();
                x += text.chars().count() as i32 * SMALL_GLYPH_W;
            }
        }
    }

    fn render(&mut self) {
        self.fb.clear_color(BG_COLOR);

        if let Some(frame) = self.icon {
            draw_icon(&mut self.fb, frame, ICON_X, ICON_Y);
        }

        let clock_style = MonoTextStyle::new(&PROFONT_12_POINT, self.color(Slot::Clock));
        Text::with_baseline(
            &self.texts[Slot::Clock.index()],
            Point::new(CLOCK_X, CLOCK_Y),
            clock_style,
            Baseline::Top,
        )
        .draw(&mut self.fb)
        .ok();

        let temp_style = MonoTextStyle::new(&FONT_4X6, self.color(Slot::Temperature));
        Text::with_baseline(
            &self.texts[Slot::Temperature.index()],
            Point::new(0, DETAIL_ROW_Y),
            temp_style,
            Baseline::Top,
        )
        .draw(&mut self.fb)
        .ok();

        let wind_style = MonoTextStyle::new(&FONT_4X6, self.color(Slot::Wind));
        let right = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Top)
            .build();
        Text::with_text_style(
            &self.texts[Slot::Wind.index()],
            Point::new(SCREEN_W - 1, DETAIL_ROW_Y),
            wind_style,
            right,
        )
        .draw(&mut self.fb)
        .ok();

        self.draw_marquee();
    }
}

impl<P: MatrixPanel> RenderSurface for MatrixSurface<P> {
    fn set_text(&mut self, slot: Slot, text: &str) {
        if matches!(slot, Slot::City | Slot::Description) {
            self.marquee_offset = 0;
        }
        self.texts[slot.index()] = text.to_string();
    }

    fn set_color(&mut self, slot: Slot, color: Rgb565) {
        self.colors[slot.index()] = color;
    }

    fn set_icon_frame(&mut self, frame: Option<u8>) {
        self.icon = frame;
    }

    fn commit(&mut self) -> Result<()> {
        self.render();
        self.fb.flush_to_panel(&mut self.panel)
    }

    fn scroll(&mut self) -> Result<bool> {
        if self.marquee_width() <= SCREEN_W {
            return Ok(false);
        }
        self.marquee_offset = (self.marquee_offset + 1) % self.marquee_cycle();
        self.commit()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingPanel {
        frames: Vec<Vec<u16>>,
    }

    impl MatrixPanel for RecordingPanel {
        fn draw_frame(&mut self, pixels: &[u16], width: u32, height: u32) -> Result<()> {
            assert_eq!(pixels.len(), (width * height) as usize);
            self.frames.push(pixels.to_vec());
            Ok(())
        }
    }

    fn icon_area() -> Rectangle {
        Rectangle::new(Point::new(ICON_X, ICON_Y), Size::new(ICON_SIZE, ICON_SIZE))
    }

    #[test]
    fn test_framebuffer_clips_out_of_bounds() {
        let mut fb = MatrixFramebuffer::new(4, 2);
        fb.draw_iter([
            Pixel(Point::new(1, 1), Rgb565::RED),
            Pixel(Point::new(-1, 0), Rgb565::RED),
            Pixel(Point::new(4, 0), Rgb565::RED),
        ])
        .unwrap();
        assert_eq!(fb.pixel(1, 1), Some(Rgb565::RED));
        assert_eq!(fb.pixel(0, 0), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(4, 0), None);
    }

    #[test]
    fn test_commit_flushes_one_frame() {
        let mut surface = MatrixSurface::new(RecordingPanel::default());
        surface.set_text(Slot::Clock, "12 34");
        surface.commit().unwrap();

        assert_eq!(surface.panel().frames.len(), 1);
        let clock_area = Rectangle::new(Point::zero(), Size::new(40, 16));
        assert!(surface.framebuffer().any_pixel_not(&clock_area, BG_COLOR));
    }

    #[test]
    fn test_icon_overlay_follows_frame() {
        let mut surface = MatrixSurface::new(RecordingPanel::default());
        surface.set_icon_frame(Some(11));
        surface.commit().unwrap();
        assert!(surface.framebuffer().any_pixel_not(&icon_area(), BG_COLOR));

        surface.set_icon_frame(None);
        surface.commit().unwrap();
        assert!(!surface.framebuffer().any_pixel_not(&icon_area(), BG_COLOR));
    }

    #[test]
    fn test_short_marquee_does_not_scroll() {
        let mut surface = MatrixSurface::new(RecordingPanel::default());
        surface.set_text(Slot::City, "Oslo, NO");
        surface.commit().unwrap();
        assert!(!surface.scroll().unwrap());
        assert_eq!(surface.panel().frames.len(), 1);
    }

    #[test]
    fn test_long_marquee_scrolls_and_repaints() {
        let mut surface = MatrixSurface::new(RecordingPanel::default());
        surface.set_text(Slot::City, "Oakland, US");
        surface.set_text(Slot::Description, "Light rain, 64% humidity");
        surface.commit().unwrap();

        assert!(surface.scroll().unwrap());
        let frames = &surface.panel().frames;
        assert_eq!(frames.len(), 2);
        assert_ne!(frames[0], frames[1]);
    }

    #[test]
    fn test_new_marquee_text_restarts_scroll() {
        let mut surface = MatrixSurface::new(RecordingPanel::default());
        surface.set_text(Slot::Description, "Scattered clouds, 40% humidity");
        surface.commit().unwrap();
        surface.scroll().unwrap();
        surface.scroll().unwrap();
        assert_eq!(surface.marquee_offset, 2);

        surface.set_text(Slot::Description, "Clear sky, 20% humidity");
        assert_eq!(surface.marquee_offset, 0);
    }

    #[test]
    fn test_splash_reaches_panel() {
        let mut surface = MatrixSurface::new(RecordingPanel::default());
        surface.show_splash("Connecting...").unwrap();
        assert_eq!(surface.panel().frames.len(), 1);
        let full = Rectangle::new(Point::zero(), Size::new(64, 32));
        assert!(surface.framebuffer().any_pixel_not(&full, BG_COLOR));
    }
}
