use anyhow::Result;
use embedded_graphics::pixelcolor::Rgb565;

/// Addressable text placements on the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Clock,
    Temperature,
    Wind,
    /// Capitalized description plus humidity.
    Description,
    City,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Clock,
        Slot::Temperature,
        Slot::Wind,
        Slot::Description,
        Slot::City,
    ];

    pub fn index(self) -> usize {
        match self {
            Slot::Clock => 0,
            Slot::Temperature => 1,
            Slot::Wind => 2,
            Slot::Description => 3,
            Slot::City => 4,
        }
    }
}

/// Drawing capability the view states write into.
///
/// Setters only stage content; nothing reaches the panel until `commit`.
pub trait RenderSurface {
    fn set_text(&mut self, slot: Slot, text: &str);

    fn set_color(&mut self, slot: Slot, color: Rgb565);

    /// Select a sprite frame for the icon overlay, or hide it with `None`.
    fn set_icon_frame(&mut self, frame: Option<u8>);

    /// Render staged content and push it to the panel.
    fn commit(&mut self) -> Result<()>;

    /// Advance any marquee text by one step. Returns true if the panel was
    /// repainted.
    fn scroll(&mut self) -> Result<bool> {
        Ok(false)
    }
}

/// Recording surface for unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Text(Slot, String),
        Color(Slot, Rgb565),
        Icon(Option<u8>),
        Commit,
    }

    #[derive(Default)]
    pub struct RecordingSurface {
        pub calls: Vec<DrawCall>,
        pub fail_commit: bool,
    }

    impl RecordingSurface {
        pub fn texts(&self) -> Vec<(Slot, String)> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    DrawCall::Text(slot, text) => Some((*slot, text.clone())),
                    _ => None,
                })
                .collect()
        }

        pub fn last_text(&self, slot: Slot) -> Option<String> {
            self.texts()
                .into_iter()
                .rev()
                .find(|(s, _)| *s == slot)
                .map(|(_, t)| t)
        }

        pub fn commits(&self) -> usize {
            self.calls.iter().filter(|c| **c == DrawCall::Commit).count()
        }
    }

    impl RenderSurface for RecordingSurface {
        fn set_text(&mut self, slot: Slot, text: &str) {
            self.calls.push(DrawCall::Text(slot, text.to_string()));
        }

        fn set_color(&mut self, slot: Slot, color: Rgb565) {
            self.calls.push(DrawCall::Color(slot, color));
        }

        fn set_icon_frame(&mut self, frame: Option<u8>) {
            self.calls.push(DrawCall::Icon(frame));
        }

        fn commit(&mut self) -> Result<()> {
            if self.fail_commit {
                anyhow::bail!("panel not responding");
            }
            self.calls.push(DrawCall::Commit);
            Ok(())
        }
    }
}
