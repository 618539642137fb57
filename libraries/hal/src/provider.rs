/// Sensor service and frame-level connection interfaces
use thiserror::Error;

use crate::message::{ProviderErrorNotifier, SensorReply};
use crate::types::SensorType;

/// The frame could not hand out a sensor service connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Sensor provider connection failed: {reason}")]
pub struct ProviderConnectionError {
    pub reason: String,
}

impl ProviderConnectionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Connection to the service that owns the physical sensors
pub trait SensorProvider {
    /// Request a sensor of the given kind.
    ///
    /// The result arrives later through `reply`; it may never arrive at all.
    fn get_sensor(&mut self, sensor_type: SensorType, reply: SensorReply);
}

/// Host context a pump is started from
pub trait FrameContext {
    /// Open a connection to the sensor service.
    ///
    /// `on_error` is the connection-error signal. The service fires it at
    /// most once, when the connection is lost for good.
    fn connect_sensor_provider(
        &mut self,
        on_error: ProviderErrorNotifier,
    ) -> Result<Box<dyn SensorProvider>, ProviderConnectionError>;
}
