use anyhow::{Context, Result};
use esp_idf_hal::gpio::{AnyIOPin, PinDriver, Pull};
use esp_idf_svc::sntp::EspSntp;
use log::{debug, info};
use serde_json::Value;

use matrix_weather_clock::app::RemoteDataClient;
use matrix_weather_clock::config::UnitInput;

use crate::http_client;
use crate::time_sync;
use crate::wifi::WifiLink;

/// Sample the Up/Down buttons once. Both are pulled up, pressed reads low.
pub fn read_unit_buttons(up: AnyIOPin, down: AnyIOPin) -> Result<UnitInput> {
    let mut up = PinDriver::input(up)?;
    up.set_pull(Pull::Up)?;
    let mut down = PinDriver::input(down)?;
    down.set_pull(Pull::Up)?;

    let input = UnitInput::Buttons {
        down_pressed: down.is_low(),
        up_pressed: up.is_low(),
    };
    debug!("== Unit buttons: {:?}", input);
    Ok(input)
}

/// Wi-Fi, SNTP and HTTPS behind the loop's client trait.
pub struct NetworkClient {
    wifi: Option<WifiLink>,
    sntp: Option<EspSntp<'static>>,
}

impl NetworkClient {
    pub fn new(wifi: Option<WifiLink>) -> Self {
        Self { wifi, sntp: None }
    }

    fn online(&mut self) -> Result<()> {
        match self.wifi.as_mut() {
            Some(link) => link.ensure_connected(),
            None => anyhow::bail!("no WiFi configured"),
        }
    }
}

impl RemoteDataClient for NetworkClient {
    fn sync_time(&mut self) -> Result<()> {
        self.online()?;
        // A fresh client forces an immediate sync; the completed status is
        // only reported once per client.
        self.sntp = None;
        let sntp = time_sync::start_sntp()?;
        let result = time_sync::wait_for_sync(&sntp);
        self.sntp = Some(sntp);
        result
    }

    fn fetch_json(&mut self, url: &str) -> Result<Value> {
        self.online()?;
        let body = http_client::https_get(url)?;
        let value = serde_json::from_str(&body).context("response is not JSON")?;
        info!("weather payload: {} bytes", body.len());
        Ok(value)
    }
}
