#[cfg(target_os = "espidf")]
mod aio_feed;
#[cfg(target_os = "espidf")]
mod board;
#[cfg(target_os = "espidf")]
mod http_client;
#[cfg(target_os = "espidf")]
mod nvs_store;
#[cfg(target_os = "espidf")]
mod panel;
#[cfg(target_os = "espidf")]
mod time_sync;
#[cfg(target_os = "espidf")]
mod wifi;

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("this firmware only runs on ESP-IDF; build for xtensa-esp32s3-espidf")
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_hal::gpio::{IOPin, OutputPin};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::log::EspLogger;
    use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs};
    use log::{error, info, warn, Level, LevelFilter};

    use matrix_weather_clock::app::WeatherClock;
    use matrix_weather_clock::config::{resolve_units, DEVICE_NAME};
    use matrix_weather_clock::logging::FeedLogger;
    use matrix_weather_clock::matrix::MatrixSurface;
    use matrix_weather_clock::views::MatrixDisplay;

    esp_idf_sys::link_patches();

    // ── 1. NVS config (needed before the logger for AIO credentials) ──
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let mut nvs = EspNvs::new(nvs_partition, nvs_store::NS, true)?;
    let cfg = nvs_store::load_config(&nvs);

    // ── 2. Logging ──
    let feed = if cfg.remote_logging_enabled() {
        Some(aio_feed::AioFeed::new(
            &cfg.aio_username,
            &cfg.aio_key,
            &cfg.log_feed_name(),
        ))
    } else {
        None
    };
    let remote = feed.is_some();
    FeedLogger::new(Box::new(EspLogger::new()), feed, Level::Info).install(LevelFilter::Info)?;

    info!(
        "== Initializing {} v{} ====",
        DEVICE_NAME,
        env!("CARGO_PKG_VERSION")
    );
    nvs_store::log_config(&cfg);
    if !remote {
        info!("No Adafruit IO credentials; remote logging off");
    }

    // ── 3. Panel + splash ──
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;
    let hub75 = panel::Hub75Panel::start(panel::Hub75Pins {
        rgb: [
            pins.gpio42.downgrade_output(),
            pins.gpio41.downgrade_output(),
            pins.gpio40.downgrade_output(),
            pins.gpio38.downgrade_output(),
            pins.gpio39.downgrade_output(),
            pins.gpio37.downgrade_output(),
        ],
        addr: [
            pins.gpio45.downgrade_output(),
            pins.gpio36.downgrade_output(),
            pins.gpio48.downgrade_output(),
            pins.gpio35.downgrade_output(),
        ],
        clk: pins.gpio2.downgrade_output(),
        lat: pins.gpio47.downgrade_output(),
        oe: pins.gpio14.downgrade_output(),
    })?;
    let mut surface = MatrixSurface::new(hub75);
    surface.show_splash("Starting...")?;

    // ── 4. Units ──
    let input = board::read_unit_buttons(pins.gpio6.downgrade(), pins.gpio7.downgrade())?;
    let resolution = resolve_units(input, nvs_store::load_use_metric(&nvs));
    if let Some(metric) = resolution.store {
        if let Err(e) = nvs_store::save_use_metric(&mut nvs, metric) {
            warn!("Failed to save unit mode: {}", e);
        }
    }
    info!("== Units set to {}", resolution.units.query_param());

    // ── 5. WiFi ──
    let sysloop = EspSystemEventLoop::take()?;
    let wifi = if !cfg.wifi_ssid.is_empty() {
        surface.show_splash("WiFi...")?;
        match wifi::WifiLink::connect(peripherals.modem, sysloop, &cfg.wifi_ssid, &cfg.wifi_pass) {
            Ok(link) => Some(link),
            Err(e) => {
                // The modem is gone with the failed driver; only a reset brings WiFi back.
                error!("WiFi driver init failed, offline until reset: {}", e);
                None
            }
        }
    } else {
        warn!("No WiFi SSID configured (set wifi_ssid in NVS or secrets.local.rs)");
        None
    };
    time_sync::set_timezone(&cfg.timezone);

    // ── 6. Main loop ──
    let display = MatrixDisplay::new(surface, resolution.units);
    let client = board::NetworkClient::new(wifi);
    let mut app = WeatherClock::new(client, time_sync::BoardClock, display, &cfg);
    app.run(std::thread::sleep)
}
