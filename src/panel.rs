use anyhow::{anyhow, bail, Result};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyOutputPin, Level, Output, PinDriver};
use log::info;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use matrix_weather_clock::layout::{SCREEN_H, SCREEN_W};
use matrix_weather_clock::matrix::MatrixPanel;

const WIDTH: usize = SCREEN_W as usize;
const HEIGHT: usize = SCREEN_H as usize;
/// 1/16 scan: rows `r` and `r + 16` are driven together.
const SCAN_ROWS: usize = HEIGHT / 2;
/// Bit planes per channel, taken from the top of each RGB565 field.
const PLANES: u32 = 3;
/// On-time of the least significant plane.
const BASE_ON_US: u32 = 30;
const REFRESH_STACK: usize = 4096;

type Out = PinDriver<'static, AnyOutputPin, Output>;

/// HUB75 pin set (MatrixPortal S3 wiring by default in main.rs).
pub struct Hub75Pins {
    /// R1, G1, B1, R2, G2, B2.
    pub rgb: [AnyOutputPin; 6],
    /// A, B, C, D.
    pub addr: [AnyOutputPin; 4],
    pub clk: AnyOutputPin,
    pub lat: AnyOutputPin,
    pub oe: AnyOutputPin,
}

struct Drivers {
    rgb: [Out; 6],
    addr: [Out; 4],
    clk: Out,
    lat: Out,
    oe: Out,
}

fn set(pin: &mut Out, high: bool) {
    let _ = pin.set_level(Level::from(high));
}

fn pulse(pin: &mut Out) {
    set(pin, true);
    set(pin, false);
}

/// Top `PLANES` bits of each channel of an RGB565 pixel.
fn channels(px: u16) -> [u8; 3] {
    let r = ((px >> 11) & 0x1F) as u8;
    let g = ((px >> 5) & 0x3F) as u8;
    let b = (px & 0x1F) as u8;
    [r >> (5 - PLANES), g >> (6 - PLANES), b >> (5 - PLANES)]
}

impl Drivers {
    fn new(pins: Hub75Pins) -> Result<Self> {
        let [r1, g1, b1, r2, g2, b2] = pins.rgb;
        let [a, b, c, d] = pins.addr;
        let mut drivers = Self {
            rgb: [
                PinDriver::output(r1)?,
                PinDriver::output(g1)?,
                PinDriver::output(b1)?,
                PinDriver::output(r2)?,
                PinDriver::output(g2)?,
                PinDriver::output(b2)?,
            ],
            addr: [
                PinDriver::output(a)?,
                PinDriver::output(b)?,
                PinDriver::output(c)?,
                PinDriver::output(d)?,
            ],
            clk: PinDriver::output(pins.clk)?,
            lat: PinDriver::output(pins.lat)?,
            oe: PinDriver::output(pins.oe)?,
        };
        // OE is active low: start blanked.
        set(&mut drivers.oe, true);
        Ok(drivers)
    }

    fn scan_frame(&mut self, frame: &[u16]) {
        for plane in 0..PLANES {
            for row in 0..SCAN_ROWS {
                for col in 0..WIDTH {
                    let top = channels(frame[row * WIDTH + col]);
                    let bottom = channels(frame[(row + SCAN_ROWS) * WIDTH + col]);
                    for (i, level) in top.iter().chain(bottom.iter()).enumerate() {
                        set(&mut self.rgb[i], (level >> plane) & 1 == 1);
                    }
                    pulse(&mut self.clk);
                }
                set(&mut self.oe, true);
                for (bit, pin) in self.addr.iter_mut().enumerate() {
                    set(pin, (row >> bit) & 1 == 1);
                }
                pulse(&mut self.lat);
                set(&mut self.oe, false);
                Ets::delay_us(BASE_ON_US << plane);
            }
        }
        set(&mut self.oe, true);
    }
}

/// Bit-banged HUB75 panel. A refresh thread scans the latest frame
/// continuously; `draw_frame` only swaps in new pixels.
pub struct Hub75Panel {
    frame: Arc<Mutex<Vec<u16>>>,
}

impl Hub75Panel {
    pub fn start(pins: Hub75Pins) -> Result<Self> {
        let mut drivers = Drivers::new(pins)?;
        let frame = Arc::new(Mutex::new(vec![0u16; WIDTH * HEIGHT]));
        let shared = frame.clone();

        std::thread::Builder::new()
            .name("hub75".into())
            .stack_size(REFRESH_STACK)
            .spawn(move || {
                let mut local = vec![0u16; WIDTH * HEIGHT];
                loop {
                    if let Ok(f) = shared.lock() {
                        local.copy_from_slice(&f);
                    }
                    drivers.scan_frame(&local);
                    // Let the idle task feed the watchdog.
                    std::thread::sleep(Duration::from_millis(1));
                }
            })?;

        info!("HUB75 refresh running ({}x{}, {} planes)", WIDTH, HEIGHT, PLANES);
        Ok(Self { frame })
    }
}

impl MatrixPanel for Hub75Panel {
    fn draw_frame(&mut self, pixels: &[u16], width: u32, height: u32) -> Result<()> {
        if width as usize != WIDTH || height as usize != HEIGHT {
            bail!("frame is {}x{}, panel is {}x{}", width, height, WIDTH, HEIGHT);
        }
        let mut frame = self
            .frame
            .lock()
            .map_err(|_| anyhow!("panel frame lock poisoned"))?;
        frame.copy_from_slice(pixels);
        Ok(())
    }
}
