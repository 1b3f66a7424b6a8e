use std::time::Duration;

pub const DEFAULT_ROWS: usize = 40;
pub const DEFAULT_COLS: usize = 60;
pub const BASE_INTERVAL: Duration = Duration::from_millis(400);
pub const MAX_SPEED: u8 = 4;

/// Startup settings for a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub rows: usize,
    pub cols: usize,
    /// Time between generations at speed 1.
    pub base_interval: Duration,
    /// Initial speed tier, `1..=MAX_SPEED`.
    pub speed: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            base_interval: BASE_INTERVAL,
            speed: 1,
        }
    }
}
