use hal::ProviderConnectionError;
use thiserror::Error;

/// Errors surfaced by the orientation pump
#[derive(Error, Debug)]
pub enum PumpError {
    #[error("Sensor provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderConnectionError),

    #[error("Invalid pump frequency: {frequency} Hz must be finite and within (0, {max}] Hz")]
    InvalidFrequency { frequency: f64, max: f64 },
}

/// Result type for pump operations
pub type PumpResult<T> = Result<T, PumpError>;
