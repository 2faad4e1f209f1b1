//! Weather clock for a 64x32 RGB LED matrix.
//!
//! Everything here is board-independent and runs on the host; the ESP-IDF
//! binary in `main.rs` supplies the network client, clock and panel.

pub mod app;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod matrix;
pub mod scheduler;
pub mod surface;
pub mod views;
pub mod weather;
pub mod weather_icons;
