/// Sensor connection interfaces handed out by the sensor service
use thiserror::Error;

use crate::message::ConfigurationReply;
use crate::types::SensorReading;

/// Reasons the service can refuse to create a sensor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorCreationError {
    #[error("Sensor is not available on this device")]
    NotAvailable,

    #[error("Permission to use the sensor was denied")]
    PermissionDenied,

    #[error("Shared reading buffer could not be mapped")]
    InvalidBuffer,
}

/// A live connection to one physical sensor
pub trait Sensor: Send {
    /// Ask the sensor to sample at `frequency` Hz.
    ///
    /// The outcome is reported later through `reply`.
    fn add_configuration(&mut self, frequency: f64, reply: ConfigurationReply);

    /// Stop sampling without releasing the sensor
    fn suspend(&mut self);

    /// Resume sampling after a suspend
    fn resume(&mut self);
}

/// Non-blocking view onto the most recent sample of a sensor.
///
/// There is no notification when a new sample lands; callers poll.
pub trait ReadingBuffer: Send {
    /// Returns the latest sample, or `None` when no sample can be obtained
    fn read(&self) -> Option<SensorReading>;
}

/// Everything a successful creation request hands back
pub struct SensorInitParams {
    /// Connection used for configuration and suspend/resume
    pub sensor: Box<dyn Sensor>,

    /// Polled reading channel for this sensor
    pub reader: Box<dyn ReadingBuffer>,

    /// Highest sampling frequency the sensor supports, in Hz
    pub maximum_frequency: f64,
}

impl core::fmt::Debug for SensorInitParams {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SensorInitParams")
            .field("maximum_frequency", &self.maximum_frequency)
            .finish_non_exhaustive()
    }
}
