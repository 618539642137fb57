//! Sensor-agnostic half of an event pump: service connection, pump state and polling timer
use hal::{FrameContext, MessageSender, ProviderErrorNotifier, RepeatingTimer, SensorProvider};
use log::{debug, warn};

use crate::config::PumpConfig;
use crate::error::PumpResult;

/// Lifecycle of a pump as seen by its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Stopped,
    /// Sensors were asked to start; polling begins once they are ready or errored
    PendingStart,
    /// The polling timer is running
    Running,
}

/// State shared by every sensor event pump.
///
/// A concrete pump owns one `PumpCore` next to its sensor entries and drives
/// it from its start/stop operations and readiness checks.
pub struct PumpCore<T: RepeatingTimer> {
    state: PumpState,
    config: PumpConfig,
    timer: T,
    queue: MessageSender,
    provider: Option<Box<dyn SensorProvider>>,
    /// Identifies the current service connection in error notifications
    connection: u64,
}

impl<T: RepeatingTimer> PumpCore<T> {
    pub fn new(config: PumpConfig, timer: T, queue: MessageSender) -> Self {
        Self {
            state: PumpState::Stopped,
            config,
            timer,
            queue,
            provider: None,
            connection: 0,
        }
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider_mut(&mut self) -> Option<&mut Box<dyn SensorProvider>> {
        self.provider.as_mut()
    }

    /// Return the service connection, opening it through `frame` on first use
    pub fn connect(&mut self, frame: &mut dyn FrameContext) -> PumpResult<&mut Box<dyn SensorProvider>> {
        let provider = match self.provider.take() {
            Some(provider) => provider,
            None => {
                self.connection += 1;
                let on_error = ProviderErrorNotifier::new(self.connection, self.queue.clone());
                let provider = frame.connect_sensor_provider(on_error)?;
                debug!("connected to sensor provider (connection {})", self.connection);
                provider
            }
        };
        Ok(self.provider.insert(provider))
    }

    /// Move from `Stopped` to `PendingStart`. Returns `false` if already started.
    pub fn begin_start(&mut self) -> bool {
        if self.state != PumpState::Stopped {
            return false;
        }
        self.state = PumpState::PendingStart;
        true
    }

    /// Undo [`Self::begin_start`] after the start could not be issued
    pub fn abort_start(&mut self) {
        self.state = PumpState::Stopped;
    }

    /// Start polling if a start is pending and every sensor is ready or errored
    pub fn did_start_if_possible(&mut self, sensors_ready_or_errored: bool) {
        if !sensors_ready_or_errored || self.state != PumpState::PendingStart {
            return;
        }
        let period = self.config.period();
        self.timer.start(period, self.queue.clone());
        self.state = PumpState::Running;
        debug!("pump running, polling every {:?}", period);
    }

    /// Stop the timer and return to `Stopped`. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == PumpState::Stopped {
            return false;
        }
        self.timer.stop();
        self.state = PumpState::Stopped;
        true
    }

    /// Drop the service connection after it reported an error.
    ///
    /// Returns `false` for errors from a connection that is already gone.
    pub fn handle_provider_error(&mut self, connection: u64) -> bool {
        if connection != self.connection || self.provider.is_none() {
            return false;
        }
        warn!("sensor provider connection {} lost", connection);
        self.provider = None;
        self.timer.stop();
        self.state = PumpState::Stopped;
        true
    }
}
