use log::{debug, warn};

use crate::layout::TIME_COLORS;
use crate::surface::{RenderSurface, Slot};

/// Hour at which the day palette starts.
const DAY_START_HOUR: u8 = 7;
/// Hour at which the evening palette starts.
const EVENING_START_HOUR: u8 = 19;

/// Time-of-day color band: 0 night, 1 day, 2 evening.
pub fn color_band(hour: u8) -> usize {
    if hour < DAY_START_HOUR {
        0
    } else if hour < EVENING_START_HOUR {
        1
    } else {
        2
    }
}

/// `"HH MM"`, both fields zero-padded.
pub fn format_clock(hour: u8, minute: u8) -> String {
    format!("{:02} {:02}", hour, minute)
}

/// Clock field state. Only a change of minute reaches the surface.
#[derive(Debug, Default)]
pub struct ClockView {
    rendered: Option<(u8, u8)>,
}

impl ClockView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the time if it differs from what is on screen.
    ///
    /// Returns the newly drawn pair, or `None` when nothing was drawn.
    pub fn update<S: RenderSurface>(&mut self, surface: &mut S, hour: u8, minute: u8) -> Option<(u8, u8)> {
        if hour > 23 || minute > 59 {
            warn!("clock: ignoring out-of-range time {}:{}", hour, minute);
            return None;
        }
        let state = (hour, minute);
        if self.rendered == Some(state) {
            return None;
        }
        self.rendered = Some(state);

        let text = format_clock(hour, minute);
        surface.set_color(Slot::Clock, TIME_COLORS[color_band(hour)]);
        surface.set_text(Slot::Clock, &text);
        debug!("== Display time: {}", text);
        Some(state)
    }

    pub fn rendered(&self) -> Option<(u8, u8)> {
        self.rendered
    }
}
