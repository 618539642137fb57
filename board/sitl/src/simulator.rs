use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Arc, RwLock},
};

use hal::{
    ConfigurationReply, FrameContext, ProviderConnectionError, ProviderErrorNotifier,
    ReadingBuffer, Sensor, SensorCreationError, SensorInitParams, SensorProvider, SensorReading,
    SensorReply, SensorType,
};
use log::debug;

const SIMULATED_MAXIMUM_FREQUENCY_HZ: f64 = 60.0;

#[derive(Debug, Clone, Copy)]
pub struct ChannelState {
    pub reading: SensorReading,
    pub suspended: bool,
    pub frequency: Option<f64>,
}

impl ChannelState {
    fn new() -> Self {
        Self {
            reading: SensorReading::default(),
            suspended: false,
            frequency: None,
        }
    }

    fn is_sampling(&self) -> bool {
        self.frequency.is_some() && !self.suspended
    }
}

type Channel = Arc<RwLock<ChannelState>>;

struct SimulatedSensor {
    channel: Channel,
}

impl Sensor for SimulatedSensor {
    fn add_configuration(&mut self, frequency: f64, reply: ConfigurationReply) {
        let accepted = frequency > 0.0 && frequency <= SIMULATED_MAXIMUM_FREQUENCY_HZ;
        if let Ok(mut channel) = self.channel.write() {
            if accepted {
                channel.frequency = Some(frequency);
            }
        }
        reply.send(accepted);
    }

    fn suspend(&mut self) {
        if let Ok(mut channel) = self.channel.write() {
            channel.suspended = true;
            // A suspended sensor stops producing samples
            channel.reading.timestamp = 0.0;
        }
    }

    fn resume(&mut self) {
        if let Ok(mut channel) = self.channel.write() {
            channel.suspended = false;
        }
    }
}

struct SimulatedBuffer {
    channel: Channel,
}

impl ReadingBuffer for SimulatedBuffer {
    fn read(&self) -> Option<SensorReading> {
        self.channel.read().ok().map(|channel| channel.reading)
    }
}

/// Shared state of the simulated device
#[derive(Default)]
pub struct World {
    pub relative_available: bool,
    pub absolute_available: bool,
    pub channels: Vec<Channel>,
    pub requests: Vec<SensorType>,
    on_error: Option<ProviderErrorNotifier>,
}

impl World {
    fn is_available(&self, sensor_type: SensorType) -> bool {
        match sensor_type {
            SensorType::RelativeOrientationEulerAngles => self.relative_available,
            SensorType::AbsoluteOrientationEulerAngles => self.absolute_available,
        }
    }
}

pub struct SimulatedProvider {
    world: Rc<RefCell<World>>,
}

impl SensorProvider for SimulatedProvider {
    fn get_sensor(&mut self, sensor_type: SensorType, reply: SensorReply) {
        let mut world = self.world.borrow_mut();
        world.requests.push(sensor_type);

        if !world.is_available(sensor_type) {
            debug!("simulated {} sensor not available", sensor_type);
            reply.send(Err(SensorCreationError::NotAvailable));
            return;
        }

        let channel = Arc::new(RwLock::new(ChannelState::new()));
        world.channels.push(channel.clone());
        reply.send(Ok(SensorInitParams {
            sensor: Box::new(SimulatedSensor {
                channel: channel.clone(),
            }),
            reader: Box::new(SimulatedBuffer { channel }),
            maximum_frequency: SIMULATED_MAXIMUM_FREQUENCY_HZ,
        }));
    }
}

/// Host frame backed by a simulated device
pub struct SimulatedFrame {
    world: Rc<RefCell<World>>,
}

impl SimulatedFrame {
    pub fn new(relative_available: bool, absolute_available: bool) -> Self {
        Self {
            world: Rc::new(RefCell::new(World {
                relative_available,
                absolute_available,
                ..World::default()
            })),
        }
    }

    pub fn world(&self) -> Rc<RefCell<World>> {
        self.world.clone()
    }

    /// Drop the service connection, as a crashed sensor service would
    pub fn disconnect(&mut self) {
        let mut world = self.world.borrow_mut();
        if let Some(on_error) = world.on_error.take() {
            on_error.notify();
        }
        // Every sensor of the dead service is gone with it
        world.channels.clear();
    }

    /// Advance the simulated device to `t` seconds and publish fresh samples
    pub fn step(&mut self, t: f64) {
        let reading = motion(t);
        for channel in self.world.borrow().channels.iter() {
            if let Ok(mut channel) = channel.write() {
                if channel.is_sampling() {
                    channel.reading = reading;
                }
            }
        }
    }
}

impl FrameContext for SimulatedFrame {
    fn connect_sensor_provider(
        &mut self,
        on_error: ProviderErrorNotifier,
    ) -> Result<Box<dyn SensorProvider>, ProviderConnectionError> {
        self.world.borrow_mut().on_error = Some(on_error);
        Ok(Box::new(SimulatedProvider {
            world: self.world.clone(),
        }))
    }
}

/// Device slowly turning around its z axis while rocking gently
pub fn motion(t: f64) -> SensorReading {
    let alpha = (t * 20.0).rem_euclid(360.0);
    let beta = 10.0 * t.sin();
    let gamma = 5.0 * t.cos();
    // A zero timestamp means "no sample", so never publish t = 0
    SensorReading::new(t.max(f64::EPSILON), beta, gamma, alpha)
}
