use anyhow::Result;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};
use std::time::Duration;

const CONNECT_ATTEMPTS: u32 = 5;

/// Station-mode Wi-Fi link. Keeps the driver alive for the life of the loop.
pub struct WifiLink {
    wifi: Box<EspWifi<'static>>,
    sysloop: EspSystemEventLoop,
}

fn elapsed_ms(t0: i64) -> i64 {
    (unsafe { esp_idf_sys::esp_timer_get_time() } - t0) / 1000
}

/// Associate and wait for an IP, retrying with a full radio restart between
/// attempts. Returns the IP address on success.
fn associate(wifi: &mut EspWifi<'static>, sysloop: EspSystemEventLoop, label: &str) -> Result<Option<String>> {
    let mut blocking = BlockingWifi::wrap(wifi, sysloop)?;
    let _ = blocking.start();

    for attempt in 1..=CONNECT_ATTEMPTS {
        let t0 = unsafe { esp_idf_sys::esp_timer_get_time() };
        match blocking.connect() {
            Ok(_) => {
                info!("WiFi {} OK on attempt {} ({}ms)", label, attempt, elapsed_ms(t0));
                blocking.wait_netif_up()?;
                let ip_info = blocking.wifi().sta_netif().get_ip_info()?;
                info!("WiFi connected, IP: {}", ip_info.ip);
                return Ok(Some(ip_info.ip.to_string()));
            }
            Err(e) => {
                warn!(
                    "WiFi {} attempt {}/{} failed after {}ms: {}",
                    label,
                    attempt,
                    CONNECT_ATTEMPTS,
                    elapsed_ms(t0),
                    e
                );
                if attempt < CONNECT_ATTEMPTS {
                    let _ = blocking.disconnect();
                    blocking.stop().ok();
                    std::thread::sleep(Duration::from_millis(500));
                    blocking.start().ok();
                    std::thread::sleep(Duration::from_millis(300));
                }
            }
        }
    }
    warn!("WiFi {} failed after {} attempts", label, CONNECT_ATTEMPTS);
    Ok(None)
}

impl WifiLink {
    pub fn connect(modem: Modem, sysloop: EspSystemEventLoop, ssid: &str, password: &str) -> Result<Self> {
        let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), None)?;

        let auth = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let mut wifi_ssid = heapless::String::<32>::new();
        let mut wifi_pass = heapless::String::<64>::new();
        wifi_ssid.push_str(ssid).ok();
        wifi_pass.push_str(password).ok();

        esp_wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: wifi_ssid,
            password: wifi_pass,
            auth_method: auth,
            ..Default::default()
        }))?;

        info!("WiFi connecting to '{}'...", ssid);
        let mut link = Self {
            wifi: Box::new(esp_wifi),
            sysloop,
        };
        // Keep the driver even when association fails so ensure_connected can retry.
        if let Err(e) = associate(&mut link.wifi, link.sysloop.clone(), "connect") {
            warn!("WiFi connect error: {}", e);
        }
        Ok(link)
    }

    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    /// Re-associate if the link dropped. Errors when still offline.
    pub fn ensure_connected(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        info!("WiFi link down; reconnecting...");
        match associate(&mut self.wifi, self.sysloop.clone(), "reconnect")? {
            Some(_) => Ok(()),
            None => anyhow::bail!("WiFi not connected"),
        }
    }
}
