/// Common data types for the sensor service interfaces
pub use nalgebra::Vector3;

/// 3D vector representation using nalgebra
pub type Vector3d = Vector3<f64>;

/// Sensor kinds the service can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorType {
    /// Euler angles relative to an arbitrary, device-chosen frame
    RelativeOrientationEulerAngles,
    /// Euler angles relative to the earth frame
    AbsoluteOrientationEulerAngles,
}

impl SensorType {
    /// Whether readings from this sensor are referenced to the earth frame
    pub fn is_absolute(&self) -> bool {
        matches!(self, SensorType::AbsoluteOrientationEulerAngles)
    }
}

impl core::fmt::Display for SensorType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorType::RelativeOrientationEulerAngles => write!(f, "relative orientation"),
            SensorType::AbsoluteOrientationEulerAngles => write!(f, "absolute orientation"),
        }
    }
}

/// Latest sample surfaced by a sensor's reading buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Sample time in seconds. Zero means the sensor has not produced a sample.
    pub timestamp: f64,

    /// Euler angles in degrees around the device x, y and z axes.
    /// A NaN component means the sensor cannot provide that angle.
    pub values: Vector3d,
}

impl SensorReading {
    pub fn new(timestamp: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            timestamp,
            values: Vector3d::new(x, y, z),
        }
    }
}

impl Default for SensorReading {
    fn default() -> Self {
        Self {
            timestamp: 0.0,
            values: Vector3d::zeros(),
        }
    }
}
