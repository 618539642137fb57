/// Completion queue shared by the sensor service, the timer and a pump
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::sensor::{SensorCreationError, SensorInitParams};
use crate::types::SensorType;

/// Sending half of a pump's completion queue
pub type MessageSender = UnboundedSender<SensorMessage>;

/// Receiving half of a pump's completion queue, drained by the host
pub type MessageReceiver = UnboundedReceiver<SensorMessage>;

/// Create a new completion queue
pub fn message_queue() -> (MessageSender, MessageReceiver) {
    unbounded_channel()
}

/// Everything that can happen asynchronously to a pump.
///
/// Sensor-scoped messages carry the request generation they answer so that
/// replies to a request that has since been abandoned can be recognised.
#[derive(Debug)]
pub enum SensorMessage {
    /// Answer to [`crate::SensorProvider::get_sensor`]
    Created {
        sensor_type: SensorType,
        generation: u64,
        result: Result<SensorInitParams, SensorCreationError>,
    },

    /// Answer to [`crate::Sensor::add_configuration`]
    ConfigurationAdded {
        sensor_type: SensorType,
        generation: u64,
        success: bool,
    },

    /// The connection to an individual sensor was lost
    SensorLost {
        sensor_type: SensorType,
        generation: u64,
    },

    /// A suspended sensor was resumed and is active again
    Resumed { sensor_type: SensorType },

    /// The connection to the sensor service was lost
    ProviderError { connection: u64 },

    /// The polling timer expired
    TimerFired,
}

/// One-shot reply capability for a sensor creation request
#[derive(Debug)]
pub struct SensorReply {
    sensor_type: SensorType,
    generation: u64,
    queue: MessageSender,
}

impl SensorReply {
    pub fn new(sensor_type: SensorType, generation: u64, queue: MessageSender) -> Self {
        Self {
            sensor_type,
            generation,
            queue,
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Notifier the service keeps to report a later loss of this sensor
    pub fn lost_notifier(&self) -> SensorLostNotifier {
        SensorLostNotifier {
            sensor_type: self.sensor_type,
            generation: self.generation,
            queue: self.queue.clone(),
        }
    }

    /// Reply to the request that created this capability
    pub fn send(self, result: Result<SensorInitParams, SensorCreationError>) {
        // A closed queue means the pump is gone; nobody is left to tell.
        let _ = self.queue.send(SensorMessage::Created {
            sensor_type: self.sensor_type,
            generation: self.generation,
            result,
        });
    }
}

/// One-shot reply capability for a configuration request
#[derive(Debug)]
pub struct ConfigurationReply {
    sensor_type: SensorType,
    generation: u64,
    queue: MessageSender,
}

impl ConfigurationReply {
    pub fn new(sensor_type: SensorType, generation: u64, queue: MessageSender) -> Self {
        Self {
            sensor_type,
            generation,
            queue,
        }
    }

    pub fn send(self, success: bool) {
        let _ = self.queue.send(SensorMessage::ConfigurationAdded {
            sensor_type: self.sensor_type,
            generation: self.generation,
            success,
        });
    }
}

/// Reports that an individual sensor connection went away
#[derive(Debug, Clone)]
pub struct SensorLostNotifier {
    sensor_type: SensorType,
    generation: u64,
    queue: MessageSender,
}

impl SensorLostNotifier {
    pub fn notify(&self) {
        let _ = self.queue.send(SensorMessage::SensorLost {
            sensor_type: self.sensor_type,
            generation: self.generation,
        });
    }
}

/// Reports that the sensor service connection went away
#[derive(Debug, Clone)]
pub struct ProviderErrorNotifier {
    connection: u64,
    queue: MessageSender,
}

impl ProviderErrorNotifier {
    pub fn new(connection: u64, queue: MessageSender) -> Self {
        Self { connection, queue }
    }

    pub fn notify(&self) {
        let _ = self.queue.send(SensorMessage::ProviderError {
            connection: self.connection,
        });
    }
}
