use anyhow::Result;
use esp_idf_svc::nvs::{EspNvs, NvsDefault};
use log::info;

use matrix_weather_clock::config::AppConfig;

pub const NS: &str = "app_cfg";

const KEY_WIFI_SSID: &str = "wifi_ssid";
const KEY_WIFI_PASS: &str = "wifi_pass";
const KEY_OWM_TOKEN: &str = "owm_token";
const KEY_LATITUDE: &str = "latitude";
const KEY_LONGITUDE: &str = "longitude";
const KEY_TIMEZONE: &str = "timezone";
const KEY_AIO_USER: &str = "aio_user";
const KEY_AIO_KEY: &str = "aio_key";
const KEY_USE_METRIC: &str = "use_metric";

/// Read a string key, treating missing and empty values alike.
fn nvs_get_str(nvs: &EspNvs<NvsDefault>, key: &str) -> Option<String> {
    let len = match nvs.str_len(key) {
        Ok(Some(len)) => len,
        _ => return None,
    };

    let mut buf = vec![0u8; len];
    match nvs.get_str(key, &mut buf) {
        Ok(Some(val)) => {
            let s = val.trim_end_matches('\0').to_string();
            if s.is_empty() { None } else { Some(s) }
        }
        _ => None,
    }
}

fn override_str(nvs: &EspNvs<NvsDefault>, key: &str, target: &mut String) {
    if let Some(v) = nvs_get_str(nvs, key) {
        *target = v;
    }
}

/// Compile-time defaults with any NVS overrides applied.
///
/// Runs before the logger is installed; see `log_config`.
pub fn load_config(nvs: &EspNvs<NvsDefault>) -> AppConfig {
    let mut cfg = AppConfig::default();
    override_str(nvs, KEY_WIFI_SSID, &mut cfg.wifi_ssid);
    override_str(nvs, KEY_WIFI_PASS, &mut cfg.wifi_pass);
    override_str(nvs, KEY_OWM_TOKEN, &mut cfg.openweather_token);
    override_str(nvs, KEY_LATITUDE, &mut cfg.latitude);
    override_str(nvs, KEY_LONGITUDE, &mut cfg.longitude);
    override_str(nvs, KEY_TIMEZONE, &mut cfg.timezone);
    override_str(nvs, KEY_AIO_USER, &mut cfg.aio_username);
    override_str(nvs, KEY_AIO_KEY, &mut cfg.aio_key);
    cfg
}

pub fn log_config(cfg: &AppConfig) {
    info!("NVS wifi_ssid = {:?}", cfg.wifi_ssid);
    info!("NVS wifi_pass = <{} chars>", cfg.wifi_pass.len());
    info!("NVS owm_token = <{} chars>", cfg.openweather_token.len());
    info!("NVS location = {}, {}", cfg.latitude, cfg.longitude);
    info!("NVS timezone = {:?}", cfg.timezone);
    info!(
        "NVS aio_user = {:?}, aio_key = <{} chars>",
        cfg.aio_username,
        cfg.aio_key.len()
    );
}

/// Unit-mode latch written by the boot buttons, if ever set.
pub fn load_use_metric(nvs: &EspNvs<NvsDefault>) -> Option<bool> {
    let stored = nvs.get_u8(KEY_USE_METRIC).unwrap_or(None).map(|v| v != 0);
    info!("NVS use_metric = {:?}", stored);
    stored
}

pub fn save_use_metric(nvs: &mut EspNvs<NvsDefault>, metric: bool) -> Result<()> {
    nvs.set_u8(KEY_USE_METRIC, if metric { 1 } else { 0 })?;
    info!("NVS saved use_metric={}", metric);
    Ok(())
}
