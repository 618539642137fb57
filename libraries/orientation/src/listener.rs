use crate::data::OrientationData;

/// Receiver of finalized orientation events
pub trait OrientationListener {
    /// Called at most once per poll, synchronously from the pump
    fn did_change_device_orientation(&mut self, data: &OrientationData);
}

impl<F> OrientationListener for F
where
    F: FnMut(&OrientationData),
{
    fn did_change_device_orientation(&mut self, data: &OrientationData) {
        self(data)
    }
}
