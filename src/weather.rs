use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::config::UnitConfig;
use crate::error::ClockError;

const OWM_CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

// ── Data types ──────────────────────────────────────────────────────

/// One successful current-conditions fetch.
///
/// Temperature and wind are kept as the API returned them; the unit flags
/// record how they were requested.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub celsius: bool,
    pub humidity: f64,
    pub wind_speed: f64,
    pub meters_per_sec: bool,
    pub description: String,
    pub icon_code: String,
}

// ── OWM JSON structures ─────────────────────────────────────────────

#[derive(Deserialize)]
struct OwmCurrentRoot {
    main: Option<OwmMain>,
    weather: Option<Vec<OwmWeather>>,
    wind: Option<OwmWind>,
    name: Option<String>,
    sys: Option<OwmSys>,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Deserialize)]
struct OwmWeather {
    icon: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct OwmWind {
    speed: Option<f64>,
}

#[derive(Deserialize)]
struct OwmSys {
    country: Option<String>,
}

// ── Parsing ─────────────────────────────────────────────────────────

impl WeatherSnapshot {
    /// Build a snapshot from the OpenWeatherMap current-weather object.
    ///
    /// Every field the display needs is required; the first missing one is
    /// named in the error.
    pub fn from_payload(payload: &Value, units: UnitConfig) -> Result<Self, ClockError> {
        let root = OwmCurrentRoot::deserialize(payload)
            .map_err(|_| ClockError::MalformedPayload("<root>"))?;

        let city = root.name.ok_or(ClockError::MalformedPayload("name"))?;
        let country = root
            .sys
            .and_then(|s| s.country)
            .ok_or(ClockError::MalformedPayload("sys.country"))?;

        let main = root.main.ok_or(ClockError::MalformedPayload("main"))?;
        let temperature = main.temp.ok_or(ClockError::MalformedPayload("main.temp"))?;
        let humidity = main
            .humidity
            .ok_or(ClockError::MalformedPayload("main.humidity"))?;
        let wind_speed = root
            .wind
            .and_then(|w| w.speed)
            .ok_or(ClockError::MalformedPayload("wind.speed"))?;

        let first = root
            .weather
            .and_then(|arr| arr.into_iter().next())
            .ok_or(ClockError::MalformedPayload("weather[0]"))?;
        let description = first
            .description
            .ok_or(ClockError::MalformedPayload("weather[0].description"))?;
        let icon_code = first
            .icon
            .ok_or(ClockError::MalformedPayload("weather[0].icon"))?;

        info!(
            "weather: {}, {} temp={} hum={} wind={} icon={} desc={}",
            city, country, temperature, humidity, wind_speed, icon_code, description
        );

        Ok(WeatherSnapshot {
            city,
            country,
            temperature,
            celsius: units.celsius,
            humidity,
            wind_speed,
            meters_per_sec: units.kmh,
            description,
            icon_code,
        })
    }

    pub fn city_label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

/// Current-weather URL for a coordinate pair.
pub fn current_weather_url(latitude: &str, longitude: &str, units: UnitConfig, token: &str) -> String {
    format!(
        "{}?lat={}&lon={}&units={}&appid={}",
        OWM_CURRENT_URL,
        latitude,
        longitude,
        units.query_param(),
        token
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn oakland() -> Value {
        json!({
            "name": "Oakland",
            "sys": { "country": "US" },
            "main": { "temp": 20.0, "humidity": 64 },
            "wind": { "speed": 5 },
            "weather": [{ "id": 500, "description": "light rain", "icon": "10n" }]
        })
    }

    #[test]
    fn test_parse_full_payload() {
        let snap = WeatherSnapshot::from_payload(&oakland(), UnitConfig::METRIC).unwrap();
        assert_eq!(snap.city_label(), "Oakland, US");
        assert_eq!(snap.temperature, 20.0);
        assert_eq!(snap.humidity, 64.0);
        assert_eq!(snap.wind_speed, 5.0);
        assert_eq!(snap.icon_code, "10n");
        assert_eq!(snap.description, "light rain");
        assert!(snap.celsius && snap.meters_per_sec);
    }

    #[test]
    fn test_missing_fields_are_named() {
        let cases = [
            ("/main/temp", "main.temp"),
            ("/main/humidity", "main.humidity"),
            ("/wind/speed", "wind.speed"),
            ("/sys/country", "sys.country"),
            ("/weather/0/icon", "weather[0].icon"),
            ("/weather/0/description", "weather[0].description"),
        ];
        for (pointer, field) in cases {
            match WeatherSnapshot::from_payload(&oakland_without(pointer), UnitConfig::METRIC) {
                Err(ClockError::MalformedPayload(f)) => assert_eq!(f, field),
                other => panic!("{}: expected MalformedPayload, got {:?}", pointer, other),
            }
        }
    }

    fn oakland_without(pointer: &str) -> Value {
        let mut payload = oakland();
        let (parent, key) = pointer.rsplit_once('/').unwrap();
        if let Some(obj) = payload.pointer_mut(parent).and_then(Value::as_object_mut) {
            obj.remove(key);
        }
        payload
    }

    #[test]
    fn test_empty_weather_array() {
        let mut payload = oakland();
        payload["weather"] = json!([]);
        assert!(matches!(
            WeatherSnapshot::from_payload(&payload, UnitConfig::IMPERIAL),
            Err(ClockError::MalformedPayload("weather[0]"))
        ));
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let mut payload = oakland();
        payload["main"]["temp"] = json!("warm");
        assert!(matches!(
            WeatherSnapshot::from_payload(&payload, UnitConfig::METRIC),
            Err(ClockError::MalformedPayload(_))
        ));
        assert!(matches!(
            WeatherSnapshot::from_payload(&json!([1, 2]), UnitConfig::METRIC),
            Err(ClockError::MalformedPayload("<root>"))
        ));
    }

    #[test]
    fn test_url_carries_units() {
        let url = current_weather_url("37.8", "-122.26", UnitConfig::IMPERIAL, "abc");
        assert_eq!(
            url,
            "https://api.openweathermap.org/data/2.5/weather?lat=37.8&lon=-122.26&units=imperial&appid=abc"
        );
    }
}
