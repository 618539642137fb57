// Pump configuration
use core::time::Duration;

use crate::error::{PumpError, PumpResult};

/// Polling frequency used when none is configured
pub const DEFAULT_PUMP_FREQUENCY_HZ: f64 = 60.0;

/// Polling faster than this buys nothing a page can observe
pub const MAX_PUMP_FREQUENCY_HZ: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpConfig {
    frequency_hz: f64,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_PUMP_FREQUENCY_HZ,
        }
    }
}

impl PumpConfig {
    /// Create a configuration polling at `frequency_hz`.
    ///
    /// # Errors
    ///
    /// Returns `PumpError::InvalidFrequency` if the frequency is NaN,
    /// infinite, not positive, or above [`MAX_PUMP_FREQUENCY_HZ`].
    pub fn with_frequency(frequency_hz: f64) -> PumpResult<Self> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 || frequency_hz > MAX_PUMP_FREQUENCY_HZ {
            return Err(PumpError::InvalidFrequency {
                frequency: frequency_hz,
                max: MAX_PUMP_FREQUENCY_HZ,
            });
        }
        Ok(Self { frequency_hz })
    }

    /// Polling and sensor sampling frequency in Hz
    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Time between two polls
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frequency_hz)
    }
}
