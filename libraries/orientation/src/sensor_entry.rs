//! Lifecycle of one physical sensor connection
use hal::{
    ConfigurationReply, MessageSender, ReadingBuffer, Sensor, SensorCreationError,
    SensorInitParams, SensorMessage, SensorProvider, SensorReading, SensorReply, SensorType,
};
use log::{debug, warn};

/// Lifecycle state of a [`SensorEntry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    /// No sensor and no request in flight. Also the state after a failure.
    NotInitialized,
    /// Creation or configuration requested but not yet acknowledged
    Initializing,
    /// Sensor is sampling
    Active,
    /// A stop arrived while initializing; suspend as soon as activation completes
    ShouldSuspend,
    /// Sensor exists but is not sampling
    Suspended,
}

/// Connection state, lifecycle and latest reading of one sensor.
///
/// An entry is reusable across any number of start/stop cycles. Methods that
/// process a service reply return `true` when the owning pump should
/// re-evaluate whether it can start polling.
pub struct SensorEntry {
    sensor_type: SensorType,
    state: SensorState,
    sensor: Option<Box<dyn Sensor>>,
    reader: Option<Box<dyn ReadingBuffer>>,
    reading: SensorReading,
    /// Identifies the request replies must answer; bumped whenever the
    /// connection is torn down so late replies are dropped.
    generation: u64,
    frequency_hz: f64,
    queue: MessageSender,
}

impl SensorEntry {
    pub fn new(sensor_type: SensorType, frequency_hz: f64, queue: MessageSender) -> Self {
        Self {
            sensor_type,
            state: SensorState::NotInitialized,
            sensor: None,
            reader: None,
            reading: SensorReading::default(),
            generation: 0,
            frequency_hz,
            queue,
        }
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

    /// Whether the service handed out a sensor that is still held
    pub fn has_sensor(&self) -> bool {
        self.sensor.is_some()
    }

    /// Latest reading obtained by [`Self::sensor_reading_could_be_read`]
    pub fn reading(&self) -> &SensorReading {
        &self.reading
    }

    /// Begin or resume sampling.
    ///
    /// Requests a sensor from `provider` when none exists. Repeated calls
    /// while a request is in flight do nothing.
    pub fn start(&mut self, provider: &mut dyn SensorProvider) {
        match self.state {
            SensorState::Suspended if self.sensor.is_some() => {
                if let Some(sensor) = self.sensor.as_mut() {
                    sensor.resume();
                }
                self.state = SensorState::Active;
                debug!("{} sensor resumed", self.sensor_type);
                let _ = self.queue.send(SensorMessage::Resumed {
                    sensor_type: self.sensor_type,
                });
            }
            SensorState::ShouldSuspend => {
                // Activation is still pending; just cancel the deferred suspend.
                self.state = SensorState::Initializing;
            }
            SensorState::NotInitialized | SensorState::Suspended => {
                self.generation += 1;
                self.state = SensorState::Initializing;
                debug!(
                    "requesting {} sensor (generation {})",
                    self.sensor_type, self.generation
                );
                provider.get_sensor(
                    self.sensor_type,
                    SensorReply::new(self.sensor_type, self.generation, self.queue.clone()),
                );
            }
            SensorState::Initializing | SensorState::Active => {}
        }
    }

    /// Stop sampling.
    ///
    /// An active sensor is suspended right away. One that has not activated
    /// yet is marked [`SensorState::ShouldSuspend`] and suspended when its
    /// activation completes.
    pub fn stop(&mut self) {
        match self.state {
            SensorState::Active => {
                if let Some(sensor) = self.sensor.as_mut() {
                    sensor.suspend();
                }
                self.state = SensorState::Suspended;
                debug!("{} sensor suspended", self.sensor_type);
            }
            SensorState::Initializing => {
                self.state = SensorState::ShouldSuspend;
                debug!("{} sensor will suspend once active", self.sensor_type);
            }
            SensorState::NotInitialized | SensorState::ShouldSuspend | SensorState::Suspended => {}
        }
    }

    /// Suspend and drop the held sensor, returning to `NotInitialized`
    pub fn release(&mut self) {
        if let Some(sensor) = self.sensor.as_mut() {
            sensor.suspend();
            debug!("{} sensor released", self.sensor_type);
        }
        self.reset();
    }

    /// Forget the sensor after a failure. The entry counts as errored afterwards.
    pub fn handle_sensor_error(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.sensor = None;
        self.reader = None;
        self.reading = SensorReading::default();
        self.state = SensorState::NotInitialized;
    }

    fn is_awaiting_activation(&self) -> bool {
        matches!(
            self.state,
            SensorState::Initializing | SensorState::ShouldSuspend
        )
    }

    /// Process the service's answer to a creation request
    pub fn on_sensor_created(
        &mut self,
        generation: u64,
        result: Result<SensorInitParams, SensorCreationError>,
    ) -> bool {
        if generation != self.generation || self.sensor.is_some() || !self.is_awaiting_activation()
        {
            debug!(
                "dropping stale {} sensor creation reply (generation {})",
                self.sensor_type, generation
            );
            return false;
        }

        match result {
            Ok(params) => {
                let frequency = self.frequency_hz.min(params.maximum_frequency);
                let mut sensor = params.sensor;
                sensor.add_configuration(
                    frequency,
                    ConfigurationReply::new(self.sensor_type, self.generation, self.queue.clone()),
                );
                self.sensor = Some(sensor);
                self.reader = Some(params.reader);
                debug!(
                    "{} sensor created, configuring at {} Hz",
                    self.sensor_type, frequency
                );
                false
            }
            Err(err) => {
                warn!("{} sensor unavailable: {}", self.sensor_type, err);
                self.handle_sensor_error();
                true
            }
        }
    }

    /// Process the service's answer to the configuration request
    pub fn on_configuration_added(&mut self, generation: u64, success: bool) -> bool {
        if generation != self.generation || self.sensor.is_none() {
            return false;
        }

        if !success {
            warn!("{} sensor rejected its configuration", self.sensor_type);
            self.handle_sensor_error();
            return true;
        }

        match self.state {
            SensorState::Initializing => {
                self.state = SensorState::Active;
                debug!("{} sensor active", self.sensor_type);
                true
            }
            SensorState::ShouldSuspend => {
                if let Some(sensor) = self.sensor.as_mut() {
                    sensor.suspend();
                }
                self.state = SensorState::Suspended;
                debug!("{} sensor activated and suspended", self.sensor_type);
                false
            }
            _ => false,
        }
    }

    /// Process the loss of the individual sensor connection
    pub fn on_sensor_lost(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.sensor.is_none() {
            return false;
        }
        warn!("{} sensor connection lost", self.sensor_type);
        self.handle_sensor_error();
        true
    }

    /// The sensor is live or has failed; nothing is pending on it
    pub fn ready_or_errored(&self) -> bool {
        matches!(
            self.state,
            SensorState::Active | SensorState::NotInitialized
        )
    }

    /// Poll the reading buffer.
    ///
    /// Returns `true` and refreshes [`Self::reading`] only when the sensor
    /// exists, is not suspended and a sample could be obtained.
    pub fn sensor_reading_could_be_read(&mut self) -> bool {
        if self.sensor.is_none() || self.state == SensorState::Suspended {
            return false;
        }

        match self.reader.as_ref().and_then(|reader| reader.read()) {
            Some(reading) => {
                self.reading = reading;
                true
            }
            None => false,
        }
    }
}
