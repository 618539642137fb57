//! Fakes for the sensor service, frame, timer and listener used by the unit tests

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hal::{
    message_queue, ConfigurationReply, FrameContext, MessageReceiver, MessageSender,
    ProviderConnectionError, ProviderErrorNotifier, ReadingBuffer, RepeatingTimer, Sensor,
    SensorCreationError, SensorInitParams, SensorMessage, SensorProvider, SensorReading,
    SensorReply, SensorType,
};

use crate::config::PumpConfig;
use crate::data::OrientationData;
use crate::error::PumpResult;
use crate::listener::OrientationListener;
use crate::orientation_pump::OrientationEventPump;

pub const RELATIVE: SensorType = SensorType::RelativeOrientationEulerAngles;
pub const ABSOLUTE: SensorType = SensorType::AbsoluteOrientationEulerAngles;

#[derive(Default)]
pub struct FakeSensorLog {
    pub suspended: bool,
    pub suspend_calls: usize,
    pub resume_calls: usize,
    pub frequencies: Vec<f64>,
    pub pending_configuration: Option<ConfigurationReply>,
}

struct FakeSensor {
    log: Arc<Mutex<FakeSensorLog>>,
    auto_ack: bool,
}

impl Sensor for FakeSensor {
    fn add_configuration(&mut self, frequency: f64, reply: ConfigurationReply) {
        let mut log = self.log.lock().unwrap();
        log.frequencies.push(frequency);
        if self.auto_ack {
            reply.send(true);
        } else {
            log.pending_configuration = Some(reply);
        }
    }

    fn suspend(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.suspended = true;
        log.suspend_calls += 1;
    }

    fn resume(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.suspended = false;
        log.resume_calls += 1;
    }
}

struct FakeBuffer {
    reading: Arc<Mutex<Option<SensorReading>>>,
}

impl ReadingBuffer for FakeBuffer {
    fn read(&self) -> Option<SensorReading> {
        *self.reading.lock().unwrap()
    }
}

/// Test-side view of a fake sensor handed to the pump
#[derive(Clone)]
pub struct SensorHandles {
    pub log: Arc<Mutex<FakeSensorLog>>,
    pub reading: Arc<Mutex<Option<SensorReading>>>,
}

impl SensorHandles {
    pub fn set_reading(&self, reading: SensorReading) {
        *self.reading.lock().unwrap() = Some(reading);
    }

    pub fn ack_configuration(&self, success: bool) {
        let reply = self
            .log
            .lock()
            .unwrap()
            .pending_configuration
            .take()
            .expect("no configuration request pending");
        reply.send(success);
    }

    pub fn is_suspended(&self) -> bool {
        self.log.lock().unwrap().suspended
    }

    pub fn suspend_calls(&self) -> usize {
        self.log.lock().unwrap().suspend_calls
    }

    pub fn resume_calls(&self) -> usize {
        self.log.lock().unwrap().resume_calls
    }
}

/// Build creation parameters for a fake sensor.
///
/// With `auto_ack` the configuration request is acknowledged immediately.
pub fn fake_sensor(auto_ack: bool, maximum_frequency: f64) -> (SensorInitParams, SensorHandles) {
    let handles = SensorHandles {
        log: Arc::new(Mutex::new(FakeSensorLog::default())),
        reading: Arc::new(Mutex::new(None)),
    };
    let params = SensorInitParams {
        sensor: Box::new(FakeSensor {
            log: handles.log.clone(),
            auto_ack,
        }),
        reader: Box::new(FakeBuffer {
            reading: handles.reading.clone(),
        }),
        maximum_frequency,
    };
    (params, handles)
}

/// Requests seen by a [`FakeProvider`], answered explicitly by the test
#[derive(Default)]
pub struct ProviderLog {
    pub requests: Vec<SensorType>,
    pub pending: Vec<SensorReply>,
}

impl ProviderLog {
    pub fn request_count(&self, sensor_type: SensorType) -> usize {
        self.requests.iter().filter(|t| **t == sensor_type).count()
    }

    pub fn has_pending(&self, sensor_type: SensorType) -> bool {
        self.pending.iter().any(|r| r.sensor_type() == sensor_type)
    }

    pub fn take(&mut self, sensor_type: SensorType) -> SensorReply {
        let index = self
            .pending
            .iter()
            .position(|r| r.sensor_type() == sensor_type)
            .expect("no request pending for sensor type");
        self.pending.remove(index)
    }

    pub fn respond(
        &mut self,
        sensor_type: SensorType,
        result: Result<SensorInitParams, SensorCreationError>,
    ) {
        self.take(sensor_type).send(result);
    }
}

pub struct FakeProvider {
    log: Rc<RefCell<ProviderLog>>,
}

impl FakeProvider {
    pub fn new(log: Rc<RefCell<ProviderLog>>) -> Self {
        Self { log }
    }
}

impl SensorProvider for FakeProvider {
    fn get_sensor(&mut self, sensor_type: SensorType, reply: SensorReply) {
        let mut log = self.log.borrow_mut();
        log.requests.push(sensor_type);
        log.pending.push(reply);
    }
}

pub struct FakeFrame {
    pub provider: Rc<RefCell<ProviderLog>>,
    pub connections: usize,
    pub error_notifiers: Vec<ProviderErrorNotifier>,
    pub fail_connect: bool,
}

impl FakeFrame {
    pub fn new() -> Self {
        Self {
            provider: Rc::new(RefCell::new(ProviderLog::default())),
            connections: 0,
            error_notifiers: Vec::new(),
            fail_connect: false,
        }
    }
}

impl FrameContext for FakeFrame {
    fn connect_sensor_provider(
        &mut self,
        on_error: ProviderErrorNotifier,
    ) -> Result<Box<dyn SensorProvider>, ProviderConnectionError> {
        if self.fail_connect {
            return Err(ProviderConnectionError::new("frame detached"));
        }
        self.connections += 1;
        self.error_notifiers.push(on_error);
        Ok(Box::new(FakeProvider::new(self.provider.clone())))
    }
}

#[derive(Default)]
pub struct TimerLog {
    pub running: bool,
    pub starts: usize,
    pub stops: usize,
    pub period: Option<Duration>,
}

/// Timer that never fires on its own; tests deliver `TimerFired` by hand
pub struct ManualTimer {
    log: Rc<RefCell<TimerLog>>,
}

impl ManualTimer {
    pub fn new(log: Rc<RefCell<TimerLog>>) -> Self {
        Self { log }
    }
}

impl RepeatingTimer for ManualTimer {
    fn start(&mut self, period: Duration, _queue: MessageSender) {
        let mut log = self.log.borrow_mut();
        log.running = true;
        log.starts += 1;
        log.period = Some(period);
    }

    fn stop(&mut self) {
        let mut log = self.log.borrow_mut();
        if log.running {
            log.stops += 1;
        }
        log.running = false;
    }

    fn is_running(&self) -> bool {
        self.log.borrow().running
    }
}

pub struct RecordingListener {
    events: Rc<RefCell<Vec<OrientationData>>>,
}

impl OrientationListener for RecordingListener {
    fn did_change_device_orientation(&mut self, data: &OrientationData) {
        self.events.borrow_mut().push(*data);
    }
}

/// A pump wired to fakes, with helpers that play the sensor service's part
pub struct Harness {
    pub pump: OrientationEventPump<ManualTimer>,
    pub queue: MessageReceiver,
    pub frame: FakeFrame,
    pub timer: Rc<RefCell<TimerLog>>,
    pub events: Rc<RefCell<Vec<OrientationData>>>,
}

impl Harness {
    pub fn new(absolute: bool) -> Self {
        let (tx, rx) = message_queue();
        let timer = Rc::new(RefCell::new(TimerLog::default()));
        let pump = OrientationEventPump::new(
            absolute,
            PumpConfig::default(),
            ManualTimer::new(timer.clone()),
            tx,
        );
        Self {
            pump,
            queue: rx,
            frame: FakeFrame::new(),
            timer,
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn start(&mut self) -> PumpResult<()> {
        let listener = RecordingListener {
            events: self.events.clone(),
        };
        let result = self.pump.start(&mut self.frame, Box::new(listener));
        self.drain();
        result
    }

    pub fn stop(&mut self) {
        self.pump.stop();
        self.drain();
    }

    /// Run the task queue until it is empty
    pub fn drain(&mut self) {
        while let Ok(message) = self.queue.try_recv() {
            self.pump.handle_message(message);
        }
    }

    pub fn tick(&mut self) {
        self.pump.handle_message(SensorMessage::TimerFired);
        self.drain();
    }

    pub fn fail(&mut self, sensor_type: SensorType) {
        self.frame
            .provider
            .borrow_mut()
            .respond(sensor_type, Err(SensorCreationError::NotAvailable));
        self.drain();
    }

    /// Create the pending sensor and acknowledge its configuration
    pub fn succeed(&mut self, sensor_type: SensorType) -> SensorHandles {
        let (params, handles) = fake_sensor(true, 60.0);
        self.frame.provider.borrow_mut().respond(sensor_type, Ok(params));
        self.drain();
        handles
    }

    /// Create the pending sensor but hold back the configuration acknowledgement
    pub fn create_unconfigured(&mut self, sensor_type: SensorType) -> SensorHandles {
        let (params, handles) = fake_sensor(false, 60.0);
        self.frame.provider.borrow_mut().respond(sensor_type, Ok(params));
        self.drain();
        handles
    }

    pub fn requests(&self, sensor_type: SensorType) -> usize {
        self.frame.provider.borrow().request_count(sensor_type)
    }

    pub fn has_pending(&self, sensor_type: SensorType) -> bool {
        self.frame.provider.borrow().has_pending(sensor_type)
    }

    pub fn events(&self) -> Vec<OrientationData> {
        self.events.borrow().clone()
    }
}
