use embedded_graphics::pixelcolor::Rgb565;
use serde_json::Value;

use crate::config::UnitConfig;
use crate::error::ClockError;
use crate::layout::{CITY_COLOR, DESCRIPTION_COLOR, TEMP_COLOR, WIND_COLOR};
use crate::surface::{RenderSurface, Slot};
use crate::weather::WeatherSnapshot;
use crate::weather_icons::icon_index;

const KMH_PER_MPS: f64 = 3.6;

// ── Formatting ──────────────────────────────────────────────────────

/// Whole degrees, padded on the right to two columns, with unit suffix.
pub fn format_temperature(temperature: f64, celsius: bool) -> String {
    let unit = if celsius { "°C" } else { "°F" };
    format!("{:<2}{}", temperature.round() as i64, unit)
}

/// Wind speed rounded to a whole raw unit, then converted for display.
///
/// In km/h mode the raw value is m/s.
pub fn format_wind(speed: f64, kmh: bool) -> String {
    let whole = speed.round();
    if kmh {
        format!("{:>3.1} km/h", whole * KMH_PER_MPS)
    } else {
        format!("{} mph", whole as i64)
    }
}

/// `"Light rain, 64% humidity"`.
pub fn format_description(description: &str, humidity: f64) -> String {
    let mut chars = description.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{}, {}% humidity", capitalized, humidity.round() as i64)
}

// ── View state ──────────────────────────────────────────────────────

const WEATHER_SLOTS: [(Slot, Rgb565); 4] = [
    (Slot::Temperature, TEMP_COLOR),
    (Slot::Wind, WIND_COLOR),
    (Slot::Description, DESCRIPTION_COLOR),
    (Slot::City, CITY_COLOR),
];

/// Last values pushed to the surface for the weather slots.
#[derive(Debug, Default)]
struct Rendered {
    temperature: Option<String>,
    wind: Option<String>,
    description: Option<String>,
    city: Option<String>,
    /// Outer `None` until the first draw.
    icon: Option<Option<u8>>,
}

impl Rendered {
    fn text_mut(&mut self, slot: Slot) -> Option<&mut Option<String>> {
        match slot {
            Slot::Temperature => Some(&mut self.temperature),
            Slot::Wind => Some(&mut self.wind),
            Slot::Description => Some(&mut self.description),
            Slot::City => Some(&mut self.city),
            Slot::Clock => None,
        }
    }
}

/// Weather fields on screen, diffed per slot.
#[derive(Debug)]
pub struct WeatherView {
    units: UnitConfig,
    rendered: Rendered,
    colors_applied: bool,
}

impl WeatherView {
    pub fn new(units: UnitConfig) -> Self {
        Self {
            units,
            rendered: Rendered::default(),
            colors_applied: false,
        }
    }

    pub fn units(&self) -> UnitConfig {
        self.units
    }

    /// Parse a current-weather payload and push whatever changed.
    ///
    /// On a malformed payload nothing is drawn and the previous values stay.
    pub fn update<S: RenderSurface>(&mut self, surface: &mut S, payload: &Value) -> Result<bool, ClockError> {
        let snapshot = WeatherSnapshot::from_payload(payload, self.units)?;
        Ok(self.apply(surface, &snapshot))
    }

    /// Push the fields of `snapshot` that differ from the last draw.
    /// Returns true if anything was pushed.
    pub fn apply<S: RenderSurface>(&mut self, surface: &mut S, snapshot: &WeatherSnapshot) -> bool {
        if !self.colors_applied {
            for (slot, color) in WEATHER_SLOTS {
                surface.set_color(slot, color);
            }
            self.colors_applied = true;
        }

        let fields = [
            (
                Slot::Temperature,
                format_temperature(snapshot.temperature, self.units.celsius),
            ),
            (Slot::Wind, format_wind(snapshot.wind_speed, self.units.kmh)),
            (
                Slot::Description,
                format_description(&snapshot.description, snapshot.humidity),
            ),
            (Slot::City, snapshot.city_label()),
        ];

        let mut changed = false;
        for (slot, text) in fields {
            let Some(last) = self.rendered.text_mut(slot) else {
                continue;
            };
            if last.as_deref() != Some(text.as_str()) {
                surface.set_text(slot, &text);
                *last = Some(text);
                changed = true;
            }
        }

        let icon = icon_index(&snapshot.icon_code);
        if self.rendered.icon != Some(icon) {
            surface.set_icon_frame(icon);
            self.rendered.icon = Some(icon);
            changed = true;
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::testing::{DrawCall, RecordingSurface};
    use serde_json::json;

    fn payload(temp: f64, wind: f64, icon: &str) -> Value {
        json!({
            "name": "Oakland",
            "sys": { "country": "US" },
            "main": { "temp": temp, "humidity": 64 },
            "wind": { "speed": wind },
            "weather": [{ "description": "light rain", "icon": icon }]
        })
    }

    #[test]
    fn test_temperature_format() {
        assert_eq!(format_temperature(20.0, true), "20°C");
        assert_eq!(format_temperature(71.6, false), "72°F");
        assert_eq!(format_temperature(4.8, true), "5 °C");
        assert_eq!(format_temperature(-12.3, true), "-12°C");
    }

    #[test]
    fn test_wind_format() {
        assert_eq!(format_wind(5.0, true), "18.0 km/h");
        assert_eq!(format_wind(5.4, true), "18.0 km/h");
        assert_eq!(format_wind(0.2, true), "0.0 km/h");
        assert_eq!(format_wind(12.6, false), "13 mph");
    }

    #[test]
    fn test_description_format() {
        assert_eq!(
            format_description("light rain", 64.0),
            "Light rain, 64% humidity"
        );
        assert_eq!(format_description("", 10.0), ", 10% humidity");
    }

    #[test]
    fn test_first_update_draws_everything() {
        let mut surface = RecordingSurface::default();
        let mut view = WeatherView::new(UnitConfig::METRIC);

        let changed = view.update(&mut surface, &payload(20.0, 5.0, "10n")).unwrap();

        assert!(changed);
        assert_eq!(surface.last_text(Slot::Temperature).as_deref(), Some("20°C"));
        assert_eq!(surface.last_text(Slot::Wind).as_deref(), Some("18.0 km/h"));
        assert_eq!(
            surface.last_text(Slot::Description).as_deref(),
            Some("Light rain, 64% humidity")
        );
        assert_eq!(surface.last_text(Slot::City).as_deref(), Some("Oakland, US"));
        assert!(surface.calls.contains(&DrawCall::Icon(Some(11))));
        assert!(surface.calls.contains(&DrawCall::Color(Slot::Temperature, TEMP_COLOR)));
    }

    #[test]
    fn test_identical_payload_is_noop() {
        let mut surface = RecordingSurface::default();
        let mut view = WeatherView::new(UnitConfig::METRIC);
        view.update(&mut surface, &payload(20.0, 5.0, "10n")).unwrap();
        let before = surface.calls.len();

        let changed = view.update(&mut surface, &payload(20.2, 4.9, "10n")).unwrap();

        assert!(!changed);
        assert_eq!(surface.calls.len(), before);
    }

    #[test]
    fn test_only_changed_fields_are_pushed() {
        let mut surface = RecordingSurface::default();
        let mut view = WeatherView::new(UnitConfig::IMPERIAL);
        view.update(&mut surface, &payload(70.0, 3.0, "01d")).unwrap();
        surface.calls.clear();

        let changed = view.update(&mut surface, &payload(72.0, 3.0, "01d")).unwrap();

        assert!(changed);
        assert_eq!(
            surface.calls,
            vec![DrawCall::Text(Slot::Temperature, "72°F".to_string())]
        );
    }

    #[test]
    fn test_unknown_icon_hides_overlay() {
        let mut surface = RecordingSurface::default();
        let mut view = WeatherView::new(UnitConfig::METRIC);
        view.update(&mut surface, &payload(20.0, 5.0, "01d")).unwrap();
        surface.calls.clear();

        assert!(view.update(&mut surface, &payload(20.0, 5.0, "99d")).unwrap());
        assert_eq!(surface.calls, vec![DrawCall::Icon(None)]);
    }

    #[test]
    fn test_malformed_payload_draws_nothing() {
        let mut surface = RecordingSurface::default();
        let mut view = WeatherView::new(UnitConfig::METRIC);
        let err = view
            .update(&mut surface, &json!({ "name": "Oakland" }))
            .unwrap_err();
        assert!(matches!(err, ClockError::MalformedPayload("sys.country")));
        assert!(surface.calls.is_empty());
    }
}
