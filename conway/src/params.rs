//! Run parameters
//!
//! Supplied once at startup. `from_env` is what the bundled runners use;
//! embedding callers usually build `Params` directly.

use std::env;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};

/// Default interval between alive-cell reports
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Generations to compute
    pub turns: u32,
    /// Strip workers per generation
    pub threads: usize,
    /// Interval between `AliveCellsCount` reports
    pub tick_interval: Duration,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            turns: 10_000,
            threads: 8,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl Params {
    pub fn new(width: usize, height: usize, turns: u32, threads: usize) -> Self {
        Self {
            width,
            height,
            turns,
            threads,
            ..Self::default()
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Reads `GOL_WIDTH`, `GOL_HEIGHT`, `GOL_TURNS`, `GOL_THREADS` and
    /// `GOL_TICK_MS`. Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(value: Option<String>, fallback: T) -> T {
            value.and_then(|v| v.trim().parse().ok()).unwrap_or(fallback)
        }

        let defaults = Self::default();
        Self {
            width: parsed(lookup("GOL_WIDTH"), defaults.width),
            height: parsed(lookup("GOL_HEIGHT"), defaults.height),
            turns: parsed(lookup("GOL_TURNS"), defaults.turns),
            threads: parsed(lookup("GOL_THREADS"), defaults.threads),
            tick_interval: lookup("GOL_TICK_MS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
        }
    }

    /// Rejects anything a run could not start with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::config(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.threads == 0 {
            return Err(EngineError::config("thread count must be positive"));
        }
        if self.threads > self.height {
            return Err(EngineError::config(format!(
                "thread count {} exceeds grid height {}",
                self.threads, self.height
            )));
        }
        if self.tick_interval.is_zero() {
            return Err(EngineError::config("tick interval must be positive"));
        }
        Ok(())
    }

    /// Name of the input image for a grid of this size.
    pub fn input_name(width: usize, height: usize) -> String {
        format!("{width}x{height}")
    }

    /// Name of the output image for a grid saved at `turn`.
    pub fn output_name(width: usize, height: usize, turn: u32) -> String {
        format!("{width}x{height}x{turn}")
    }
}
