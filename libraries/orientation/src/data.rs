use hal::{SensorReading, SensorType};

/// One orientation sample as seen by the listener.
///
/// Angles are in degrees. `alpha` is the rotation around the device z axis,
/// `beta` around x and `gamma` around y. An absent angle means the backing
/// sensor cannot report it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationData {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,

    /// Whether the angles are referenced to the earth frame
    pub absolute: bool,

    /// Sample time of the backing reading in seconds
    pub timestamp: f64,

    /// Every sensor backing this sample is producing data, not merely connected
    pub all_available_sensors_are_active: bool,
}

impl OrientationData {
    /// All-null sample for a device that cannot report orientation
    pub fn unavailable(absolute: bool) -> Self {
        Self {
            absolute,
            all_available_sensors_are_active: true,
            ..Self::default()
        }
    }

    /// Map a raw Euler-angle reading onto orientation axes.
    ///
    /// A reading with a zero timestamp comes from a sensor that has stopped
    /// producing samples and yields an inactive, angle-less value.
    pub fn from_reading(reading: &SensorReading, sensor_type: SensorType) -> Self {
        let absolute = sensor_type.is_absolute();
        if reading.timestamp == 0.0 {
            return Self {
                absolute,
                ..Self::default()
            };
        }

        Self {
            alpha: angle(reading.values.z),
            beta: angle(reading.values.x),
            gamma: angle(reading.values.y),
            absolute,
            timestamp: reading.timestamp,
            all_available_sensors_are_active: true,
        }
    }

    /// True when at least one angle is present
    pub fn has_any_angle(&self) -> bool {
        self.alpha.is_some() || self.beta.is_some() || self.gamma.is_some()
    }
}

fn angle(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}
