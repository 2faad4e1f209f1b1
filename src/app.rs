use std::time::Duration;

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::ClockError;
use crate::scheduler::{Millis, RefreshTimer};
use crate::surface::RenderSurface;
use crate::views::MatrixDisplay;

/// Network side of the clock: SNTP and the weather API.
pub trait RemoteDataClient {
    /// Set the system clock from the network.
    fn sync_time(&mut self) -> anyhow::Result<()>;

    /// GET `url` and decode the body as JSON.
    fn fetch_json(&mut self, url: &str) -> anyhow::Result<Value>;
}

/// Monotonic and wall-clock time.
pub trait ClockSource {
    /// Milliseconds since boot.
    fn monotonic_ms(&self) -> Millis;

    /// Local `(hour, minute)`, or `None` until the clock has been set.
    fn local_time(&self) -> Option<(u8, u8)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TimeSync,
    WeatherSync,
    Render,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Phase::TimeSync => "time sync",
            Phase::WeatherSync => "weather sync",
            Phase::Render => "render",
        }
    }
}

/// A phase that failed during one loop iteration.
#[derive(Debug)]
pub struct Fault {
    pub phase: Phase,
    pub error: ClockError,
}

impl Fault {
    fn new(phase: Phase, error: ClockError) -> Self {
        Self { phase, error }
    }
}

#[derive(Debug, Default)]
pub struct StepOutcome {
    pub faults: Vec<Fault>,
    /// Set when a fault calls for the backoff sleep.
    pub backoff: Option<Duration>,
}

/// Loop context: timers, collaborators and the display, owned in one place.
pub struct WeatherClock<C, K, S>
where
    C: RemoteDataClient,
    K: ClockSource,
    S: RenderSurface,
{
    client: C,
    clock: K,
    display: MatrixDisplay<S>,
    time_timer: RefreshTimer,
    weather_timer: RefreshTimer,
    weather_url: String,
    fault_backoff: Duration,
    scroll_hold: Duration,
    consecutive_faults: u32,
    // Staged changes not yet on the panel.
    dirty: bool,
}

impl<C, K, S> WeatherClock<C, K, S>
where
    C: RemoteDataClient,
    K: ClockSource,
    S: RenderSurface,
{
    pub fn new(client: C, clock: K, display: MatrixDisplay<S>, config: &AppConfig) -> Self {
        let weather_url = config.weather_url(display.units());
        Self {
            client,
            clock,
            display,
            time_timer: RefreshTimer::new(config.time_sync_interval_ms),
            weather_timer: RefreshTimer::new(config.weather_sync_interval_ms),
            weather_url,
            fault_backoff: config.fault_backoff,
            scroll_hold: config.scroll_hold,
            consecutive_faults: 0,
            dirty: false,
        }
    }

    pub fn display(&self) -> &MatrixDisplay<S> {
        &self.display
    }

    pub fn time_timer(&self) -> &RefreshTimer {
        &self.time_timer
    }

    pub fn weather_timer(&self) -> &RefreshTimer {
        &self.weather_timer
    }

    pub fn consecutive_faults(&self) -> u32 {
        self.consecutive_faults
    }

    fn sync_time(&mut self, now: Millis) -> Result<(), ClockError> {
        if !self.time_timer.is_due(now) {
            return Ok(());
        }
        info!("FETCH time");
        self.client.sync_time().map_err(ClockError::TimeSync)?;
        self.time_timer.mark_refreshed(now);
        Ok(())
    }

    fn sync_weather(&mut self, now: Millis) -> Result<(), ClockError> {
        if !self.weather_timer.is_due(now) {
            return Ok(());
        }
        info!("FETCH weather");
        let payload = self
            .client
            .fetch_json(&self.weather_url)
            .map_err(ClockError::Fetch)?;
        if self.display.update_weather(&payload)? {
            self.dirty = true;
        }
        self.weather_timer.mark_refreshed(now);
        Ok(())
    }

    fn render(&mut self) -> Result<(), ClockError> {
        match self.clock.local_time() {
            Some((hour, minute)) => {
                if self.display.update_clock(hour, minute).is_some() {
                    self.dirty = true;
                }
            }
            None => debug!("clock not set yet, skipping time"),
        }
        if self.dirty {
            self.display.commit()?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Run every phase once. A failed sync never stops the clock from
    /// being rendered.
    fn run_phases(&mut self) -> Vec<Fault> {
        let now = self.clock.monotonic_ms();
        let mut faults = Vec::new();

        if let Err(e) = self.sync_time(now) {
            faults.push(Fault::new(Phase::TimeSync, e));
        }
        if let Err(e) = self.sync_weather(now) {
            faults.push(Fault::new(Phase::WeatherSync, e));
        }
        if let Err(e) = self.render() {
            faults.push(Fault::new(Phase::Render, e));
        }
        faults
    }

    /// One loop iteration without the sleeps. All phase errors are logged
    /// here.
    pub fn step(&mut self) -> StepOutcome {
        let faults = self.run_phases();
        let mut backoff = None;

        if faults.iter().any(|f| f.error.triggers_backoff()) {
            self.consecutive_faults = self.consecutive_faults.saturating_add(1);
            backoff = Some(self.fault_backoff);
        } else {
            self.consecutive_faults = 0;
        }

        for fault in &faults {
            if fault.error.triggers_backoff() {
                error!(
                    "FAIL {} [{}] ({} consecutive): {}",
                    fault.phase.label(),
                    fault.error.kind(),
                    self.consecutive_faults,
                    fault.error
                );
            } else {
                warn!("!! {} [{}]: {}", fault.phase.label(), fault.error.kind(), fault.error);
            }
        }

        StepOutcome { faults, backoff }
    }

    /// Advance the marquee one step.
    pub fn scroll(&mut self) {
        if let Err(e) = self.display.scroll() {
            warn!("!! scroll [{}]: {}", e.kind(), e);
        }
    }

    /// One full iteration: phases, optional backoff, marquee, hold.
    pub fn tick(&mut self, sleep: &mut impl FnMut(Duration)) -> StepOutcome {
        let outcome = self.step();
        if let Some(backoff) = outcome.backoff {
            sleep(backoff);
        }
        self.scroll();
        sleep(self.scroll_hold);
        outcome
    }

    pub fn run(&mut self, mut sleep: impl FnMut(Duration)) -> ! {
        info!("!! Starting main loop !!");
        loop {
            self.tick(&mut sleep);
        }
    }
}
