use std::time::Duration;

use crate::scheduler::{Millis, ONE_HOUR_MS, ONE_MIN_MS};

// Compile-time defaults, overridable from secrets.local.rs via build.rs.
const DEFAULT_WIFI_SSID: &str = match option_env!("LOCAL_WIFI_SSID") {
    Some(v) => v,
    None => "",
};
const DEFAULT_WIFI_PASS: &str = match option_env!("LOCAL_WIFI_PASS") {
    Some(v) => v,
    None => "",
};
const DEFAULT_OPENWEATHER_TOKEN: &str = match option_env!("LOCAL_OPENWEATHER_TOKEN") {
    Some(v) => v,
    None => "",
};
const DEFAULT_LATITUDE: &str = match option_env!("LOCAL_LATITUDE") {
    Some(v) => v,
    None => "37.8",
};
const DEFAULT_LONGITUDE: &str = match option_env!("LOCAL_LONGITUDE") {
    Some(v) => v,
    None => "-122.26",
};
const DEFAULT_TIMEZONE: &str = match option_env!("LOCAL_TIMEZONE") {
    Some(v) => v,
    None => "PST8PDT,M3.2.0,M11.1.0",
};
const DEFAULT_AIO_USERNAME: &str = match option_env!("LOCAL_AIO_USERNAME") {
    Some(v) => v,
    None => "",
};
const DEFAULT_AIO_KEY: &str = match option_env!("LOCAL_AIO_KEY") {
    Some(v) => v,
    None => "",
};

pub const DEVICE_NAME: &str = "matrix-weather-clock";

pub const TIME_SYNC_INTERVAL_MS: Millis = ONE_HOUR_MS;
pub const WEATHER_SYNC_INTERVAL_MS: Millis = 20 * ONE_MIN_MS;
pub const FAULT_BACKOFF: Duration = Duration::from_secs(10);
pub const SCROLL_HOLD: Duration = Duration::from_millis(200);

// ── Units ───────────────────────────────────────────────────────────

/// Display units, fixed at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitConfig {
    /// Degrees Celsius, otherwise Fahrenheit.
    pub celsius: bool,
    /// Wind in km/h (from m/s), otherwise mph.
    pub kmh: bool,
}

impl UnitConfig {
    pub const METRIC: UnitConfig = UnitConfig { celsius: true, kmh: true };
    pub const IMPERIAL: UnitConfig = UnitConfig { celsius: false, kmh: false };

    pub fn from_metric(metric: bool) -> Self {
        if metric {
            Self::METRIC
        } else {
            Self::IMPERIAL
        }
    }

    /// Value for the OpenWeatherMap `units` query parameter.
    pub fn query_param(self) -> &'static str {
        if self.celsius {
            "metric"
        } else {
            "imperial"
        }
    }
}

/// Whatever unit-select hardware the board has, sampled once at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitInput {
    /// Pulled-up jumper: high means metric.
    Jumper { high: bool },
    /// Up/Down buttons, true while held.
    Buttons { down_pressed: bool, up_pressed: bool },
    /// No selector fitted.
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitResolution {
    pub units: UnitConfig,
    /// New latch value to persist, when a button was held at boot.
    pub store: Option<bool>,
}

/// Resolve the unit mode from the boot-time input and the stored latch.
///
/// Holding Down selects metric, holding Up selects imperial; the choice is
/// latched so later boots without a button keep it.
pub fn resolve_units(input: UnitInput, stored_metric: Option<bool>) -> UnitResolution {
    let (metric, store) = match input {
        UnitInput::Jumper { high } => (high, None),
        UnitInput::Buttons { down_pressed: true, .. } => (true, Some(true)),
        UnitInput::Buttons { up_pressed: true, .. } => (false, Some(false)),
        UnitInput::Buttons { .. } => (stored_metric.unwrap_or(true), None),
        UnitInput::Absent => (true, None),
    };
    UnitResolution {
        units: UnitConfig::from_metric(metric),
        store,
    }
}

// ── Application config ──────────────────────────────────────────────

pub struct AppConfig {
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub openweather_token: String,
    pub latitude: String,
    pub longitude: String,
    /// POSIX TZ string applied before SNTP sync.
    pub timezone: String,
    pub aio_username: String,
    pub aio_key: String,
    pub time_sync_interval_ms: Millis,
    pub weather_sync_interval_ms: Millis,
    pub fault_backoff: Duration,
    pub scroll_hold: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: DEFAULT_WIFI_SSID.to_string(),
            wifi_pass: DEFAULT_WIFI_PASS.to_string(),
            openweather_token: DEFAULT_OPENWEATHER_TOKEN.to_string(),
            latitude: DEFAULT_LATITUDE.to_string(),
            longitude: DEFAULT_LONGITUDE.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            aio_username: DEFAULT_AIO_USERNAME.to_string(),
            aio_key: DEFAULT_AIO_KEY.to_string(),
            time_sync_interval_ms: TIME_SYNC_INTERVAL_MS,
            weather_sync_interval_ms: WEATHER_SYNC_INTERVAL_MS,
            fault_backoff: FAULT_BACKOFF,
            scroll_hold: SCROLL_HOLD,
        }
    }
}

impl AppConfig {
    pub fn weather_url(&self, units: UnitConfig) -> String {
        crate::weather::current_weather_url(
            &self.latitude,
            &self.longitude,
            units,
            &self.openweather_token,
        )
    }

    /// Remote log forwarding needs both Adafruit IO credentials.
    pub fn remote_logging_enabled(&self) -> bool {
        !self.aio_username.is_empty() && !self.aio_key.is_empty()
    }

    /// Adafruit IO feed receiving forwarded log records.
    pub fn log_feed_name(&self) -> String {
        format!("{}-logging", DEVICE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jumper_selects_units() {
        let r = resolve_units(UnitInput::Jumper { high: true }, Some(false));
        assert_eq!(r, UnitResolution { units: UnitConfig::METRIC, store: None });
        let r = resolve_units(UnitInput::Jumper { high: false }, None);
        assert_eq!(r.units, UnitConfig::IMPERIAL);
    }

    #[test]
    fn test_buttons_latch_choice() {
        let down = UnitInput::Buttons { down_pressed: true, up_pressed: false };
        assert_eq!(
            resolve_units(down, Some(false)),
            UnitResolution { units: UnitConfig::METRIC, store: Some(true) }
        );

        let up = UnitInput::Buttons { down_pressed: false, up_pressed: true };
        assert_eq!(
            resolve_units(up, Some(true)),
            UnitResolution { units: UnitConfig::IMPERIAL, store: Some(false) }
        );
    }

    #[test]
    fn test_buttons_idle_use_stored_latch() {
        let idle = UnitInput::Buttons { down_pressed: false, up_pressed: false };
        assert_eq!(resolve_units(idle, Some(false)).units, UnitConfig::IMPERIAL);
        assert_eq!(resolve_units(idle, None).units, UnitConfig::METRIC);
        assert_eq!(resolve_units(idle, Some(false)).store, None);
    }

    #[test]
    fn test_no_selector_defaults_metric() {
        assert_eq!(resolve_units(UnitInput::Absent, Some(false)).units, UnitConfig::METRIC);
    }

    #[test]
    fn test_default_intervals() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.time_sync_interval_ms, 60 * 60 * 1000);
        assert_eq!(cfg.weather_sync_interval_ms, 20 * 60 * 1000);
        assert_eq!(cfg.fault_backoff, Duration::from_secs(10));
        assert_eq!(cfg.log_feed_name(), "matrix-weather-clock-logging");
    }

    #[test]
    fn test_weather_url_uses_config() {
        let cfg = AppConfig {
            latitude: "51.5".into(),
            longitude: "-0.12".into(),
            openweather_token: "tok".into(),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.weather_url(UnitConfig::METRIC),
            "https://api.openweathermap.org/data/2.5/weather?lat=51.5&lon=-0.12&units=metric&appid=tok"
        );
    }
}
