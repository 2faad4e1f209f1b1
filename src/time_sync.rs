use anyhow::{bail, Result};
use esp_idf_svc::sntp::{EspSntp, OperatingMode, SntpConf, SyncMode, SyncStatus};
use log::info;
use std::thread;
use std::time::Duration;

use matrix_weather_clock::app::ClockSource;
use matrix_weather_clock::scheduler::Millis;

const SNTP_SERVER: &str = "pool.ntp.org";
const SYNC_TIMEOUT_MS: u32 = 20_000;
const POLL_INTERVAL_MS: u32 = 250;

/// Set the POSIX TZ used by `localtime_r`.
pub fn set_timezone(tz: &str) {
    info!("Setting timezone: {}", tz);
    // Single-threaded during init.
    unsafe {
        std::env::set_var("TZ", tz);
    }
}

/// Start SNTP in poll mode. The returned handle keeps background re-sync
/// running and must outlive the loop.
pub fn start_sntp() -> Result<EspSntp<'static>> {
    let conf = SntpConf {
        servers: [SNTP_SERVER, "time.nist.gov"],
        sync_mode: SyncMode::Immediate,
        operating_mode: OperatingMode::Poll,
    };
    info!("Starting SNTP with {}", SNTP_SERVER);
    Ok(EspSntp::new_with_callback(&conf, |_| {
        info!("SNTP sync callback triggered");
    })?)
}

/// Wait up to 20s for SNTP to report a completed sync.
pub fn wait_for_sync(sntp: &EspSntp<'static>) -> Result<()> {
    let mut elapsed_ms = 0u32;
    while elapsed_ms < SYNC_TIMEOUT_MS {
        if sntp.get_sync_status() == SyncStatus::Completed {
            info!("SNTP time synchronized after {}ms", elapsed_ms);
            if let Some((h, m)) = local_hour_minute() {
                info!("Current local time: {:02}:{:02}", h, m);
            }
            return Ok(());
        }
        thread::sleep(Duration::from_millis(POLL_INTERVAL_MS as u64));
        elapsed_ms += POLL_INTERVAL_MS;
    }
    bail!("SNTP sync not completed within {}s", SYNC_TIMEOUT_MS / 1000)
}

/// Local (hour, minute), or None if the clock has not been set.
pub fn local_hour_minute() -> Option<(u8, u8)> {
    let mut now: libc::time_t = 0;
    unsafe {
        libc::time(&mut now);
    }
    // Near epoch means SNTP has not run yet.
    if now < 1_000_000_000 {
        return None;
    }
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    unsafe {
        libc::localtime_r(&now, &mut tm);
    }
    Some((tm.tm_hour as u8, tm.tm_min as u8))
}

/// Board clock: esp_timer for monotonic time, libc for local time.
pub struct BoardClock;

impl ClockSource for BoardClock {
    fn monotonic_ms(&self) -> Millis {
        unsafe { esp_idf_sys::esp_timer_get_time() / 1000 }
    }

    fn local_time(&self) -> Option<(u8, u8)> {
        local_hour_minute()
    }
}
