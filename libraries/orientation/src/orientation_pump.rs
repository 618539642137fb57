use hal::{FrameContext, MessageSender, RepeatingTimer, SensorMessage, SensorType};
use log::{debug, info, trace, warn};

use crate::change_filter::should_fire_event;
use crate::config::PumpConfig;
use crate::data::OrientationData;
use crate::error::PumpResult;
use crate::event_pump::{PumpCore, PumpState};
use crate::listener::OrientationListener;
use crate::sensor_entry::{SensorEntry, SensorState};

/// Pumps orientation events from the relative or absolute orientation sensor.
///
/// In absolute mode only the absolute sensor is used. Otherwise the relative
/// sensor is preferred and the absolute sensor is started once, as a
/// fallback, when the relative one cannot be created. At most one of the two
/// holds a live sensor at any time.
pub struct OrientationEventPump<T: RepeatingTimer> {
    core: PumpCore<T>,
    relative: SensorEntry,
    absolute: SensorEntry,
    absolute_mode: bool,
    /// Set on every start in relative mode, cleared once the fallback fired
    fall_back_to_absolute: bool,
    /// A stop arrived before the fallback resolved; suspend the absolute
    /// sensor as soon as the fallback starts it
    should_suspend_absolute: bool,
    last_dispatched: OrientationData,
    listener: Option<Box<dyn OrientationListener>>,
}

impl<T: RepeatingTimer> OrientationEventPump<T> {
    pub fn new(absolute: bool, config: PumpConfig, timer: T, queue: MessageSender) -> Self {
        let frequency = config.frequency_hz();
        Self {
            relative: SensorEntry::new(
                SensorType::RelativeOrientationEulerAngles,
                frequency,
                queue.clone(),
            ),
            absolute: SensorEntry::new(
                SensorType::AbsoluteOrientationEulerAngles,
                frequency,
                queue.clone(),
            ),
            core: PumpCore::new(config, timer, queue),
            absolute_mode: absolute,
            fall_back_to_absolute: !absolute,
            should_suspend_absolute: false,
            last_dispatched: OrientationData::default(),
            listener: None,
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute_mode
    }

    pub fn state(&self) -> PumpState {
        self.core.state()
    }

    pub fn relative(&self) -> &SensorEntry {
        &self.relative
    }

    pub fn absolute(&self) -> &SensorEntry {
        &self.absolute
    }

    pub fn timer(&self) -> &T {
        self.core.timer()
    }

    /// The last sample handed to the listener; empty after a stop
    pub fn last_dispatched(&self) -> &OrientationData {
        &self.last_dispatched
    }

    /// Start delivering events to `listener`.
    ///
    /// Does nothing if the pump is already started.
    ///
    /// # Errors
    ///
    /// Returns `PumpError::ProviderUnavailable` if no sensor service
    /// connection could be opened. The pump stays stopped.
    pub fn start(
        &mut self,
        frame: &mut dyn FrameContext,
        listener: Box<dyn OrientationListener>,
    ) -> PumpResult<()> {
        if !self.core.begin_start() {
            debug!("orientation pump already started");
            return Ok(());
        }
        self.listener = Some(listener);

        if let Err(err) = self.send_start(frame) {
            warn!("orientation pump failed to start: {}", err);
            self.core.abort_start();
            self.listener = None;
            return Err(err);
        }
        Ok(())
    }

    /// Stop delivering events. Called on visibility changes and when the
    /// last listener goes away; sensors are suspended, not released.
    pub fn stop(&mut self) {
        if !self.core.stop() {
            return;
        }
        self.send_stop();
        self.listener = None;
        debug!("orientation pump stopped");
    }

    /// Process one item from the task queue
    pub fn handle_message(&mut self, message: SensorMessage) {
        match message {
            SensorMessage::Created {
                sensor_type,
                generation,
                result,
            } => {
                let check = self.entry_mut(sensor_type).on_sensor_created(generation, result);
                let released = self.enforce_single_sensor();
                if check || released {
                    self.did_start_if_possible();
                }
            }
            SensorMessage::ConfigurationAdded {
                sensor_type,
                generation,
                success,
            } => {
                if self
                    .entry_mut(sensor_type)
                    .on_configuration_added(generation, success)
                {
                    self.did_start_if_possible();
                }
            }
            SensorMessage::SensorLost {
                sensor_type,
                generation,
            } => {
                if self.entry_mut(sensor_type).on_sensor_lost(generation) {
                    self.did_start_if_possible();
                }
            }
            SensorMessage::Resumed { .. } => self.did_start_if_possible(),
            SensorMessage::ProviderError { connection } => self.handle_provider_error(connection),
            SensorMessage::TimerFired => {
                if self.core.state() == PumpState::Running {
                    self.fire_event();
                }
            }
        }
    }

    fn entry_mut(&mut self, sensor_type: SensorType) -> &mut SensorEntry {
        match sensor_type {
            SensorType::RelativeOrientationEulerAngles => &mut self.relative,
            SensorType::AbsoluteOrientationEulerAngles => &mut self.absolute,
        }
    }

    fn send_start(&mut self, frame: &mut dyn FrameContext) -> PumpResult<()> {
        let provider = self.core.connect(frame)?;

        if self.absolute_mode {
            self.absolute.start(&mut **provider);
        } else {
            self.fall_back_to_absolute = true;
            self.should_suspend_absolute = false;
            self.relative.start(&mut **provider);
        }
        Ok(())
    }

    fn send_stop(&mut self) {
        // Stop both: a fallback may be in progress, and stopping an idle
        // entry is a no-op.
        self.relative.stop();

        // The relative sensor may still fail and hand over to the absolute
        // one, which has not been started yet. Carry the suspend over.
        if self.relative.state() == SensorState::ShouldSuspend && self.fall_back_to_absolute {
            self.should_suspend_absolute = true;
        }

        self.absolute.stop();

        // Otherwise the first sample after a restart could be filtered
        // against data from before the stop.
        self.last_dispatched = OrientationData::default();
    }

    fn did_start_if_possible(&mut self) {
        // The fallback only covers a relative sensor that never came up in
        // this start cycle, not one lost after it was working.
        if self.relative.state() == SensorState::Active {
            self.fall_back_to_absolute = false;
        }

        if !self.absolute_mode
            && self.fall_back_to_absolute
            && self.relative.state() == SensorState::NotInitialized
        {
            if let Some(provider) = self.core.provider_mut() {
                self.fall_back_to_absolute = false;
                info!("relative orientation sensor unavailable, falling back to absolute orientation");
                self.absolute.start(&mut **provider);
                if self.should_suspend_absolute {
                    self.absolute.stop();
                    self.should_suspend_absolute = false;
                }
                return;
            }
        }

        let ready = self.sensors_ready_or_errored();
        self.core.did_start_if_possible(ready);
    }

    fn sensors_ready_or_errored(&self) -> bool {
        if !self.relative.ready_or_errored() || !self.absolute.ready_or_errored() {
            return false;
        }

        debug_assert!(
            !(self.relative.has_sensor() && self.absolute.has_sensor()),
            "at most one orientation sensor may be live"
        );
        true
    }

    /// A retried relative sensor can come up while the fallback absolute
    /// sensor is still held. The relative one wins. Returns `true` if the
    /// absolute sensor was released.
    fn enforce_single_sensor(&mut self) -> bool {
        if !(self.relative.has_sensor() && self.absolute.has_sensor()) {
            return false;
        }
        debug!("relative orientation sensor recovered, releasing absolute sensor");
        self.absolute.release();
        self.should_suspend_absolute = false;
        true
    }

    fn handle_provider_error(&mut self, connection: u64) {
        if !self.core.handle_provider_error(connection) {
            return;
        }
        self.relative.handle_sensor_error();
        self.absolute.handle_sensor_error();
        self.should_suspend_absolute = false;
        self.last_dispatched = OrientationData::default();
        self.listener = None;
    }

    /// Build a fresh sample from whichever sensor is authoritative
    pub fn current_reading(&mut self) -> OrientationData {
        if !self.absolute_mode && self.relative.sensor_reading_could_be_read() {
            OrientationData::from_reading(self.relative.reading(), self.relative.sensor_type())
        } else if self.absolute.sensor_reading_could_be_read() {
            OrientationData::from_reading(self.absolute.reading(), self.absolute.sensor_type())
        } else {
            OrientationData::unavailable(self.absolute_mode)
        }
    }

    fn fire_event(&mut self) {
        let data = self.current_reading();

        if !should_fire_event(&data, &self.last_dispatched) {
            trace!("orientation event suppressed: {:?}", data);
            return;
        }

        if let Some(listener) = self.listener.as_mut() {
            self.last_dispatched = data;
            listener.did_change_device_orientation(&data);
        }
    }
}

impl<T: RepeatingTimer> Drop for OrientationEventPump<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
