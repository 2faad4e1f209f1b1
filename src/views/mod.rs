pub mod clock;
pub mod weather;

use serde_json::Value;

use crate::config::UnitConfig;
use crate::error::ClockError;
use crate::surface::RenderSurface;

use self::clock::ClockView;
use self::weather::WeatherView;

/// The single screen: clock and weather view states over an owned surface.
pub struct MatrixDisplay<S: RenderSurface> {
    surface: S,
    clock: ClockView,
    weather: WeatherView,
}

impl<S: RenderSurface> MatrixDisplay<S> {
    pub fn new(surface: S, units: UnitConfig) -> Self {
        Self {
            surface,
            clock: ClockView::new(),
            weather: WeatherView::new(units),
        }
    }

    /// Returns true if any weather slot changed.
    pub fn update_weather(&mut self, payload: &Value) -> Result<bool, ClockError> {
        self.weather.update(&mut self.surface, payload)
    }

    /// Returns the newly drawn `(hour, minute)`, or `None` if unchanged.
    pub fn update_clock(&mut self, hour: u8, minute: u8) -> Option<(u8, u8)> {
        self.clock.update(&mut self.surface, hour, minute)
    }

    pub fn commit(&mut self) -> Result<(), ClockError> {
        self.surface.commit().map_err(ClockError::Render)
    }

    pub fn scroll(&mut self) -> Result<bool, ClockError> {
        self.surface.scroll().map_err(ClockError::Render)
    }

    pub fn units(&self) -> UnitConfig {
        self.weather.units()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::RecordingSurface;
    use crate::surface::Slot;

    #[test]
    fn test_views_share_one_surface() {
        let mut display = MatrixDisplay::new(RecordingSurface::default(), UnitConfig::METRIC);
        assert_eq!(display.update_clock(6, 30), Some((6, 30)));
        display.commit().unwrap();
        assert_eq!(display.surface().last_text(Slot::Clock).as_deref(), Some("06 30"));
        assert_eq!(display.surface().commits(), 1);
    }

    #[test]
    fn test_commit_failure_is_render_error() {
        let mut display = MatrixDisplay::new(RecordingSurface::default(), UnitConfig::METRIC);
        display.surface_mut().fail_commit = true;
        assert!(matches!(display.commit(), Err(ClockError::Render(_))));
    }
}
