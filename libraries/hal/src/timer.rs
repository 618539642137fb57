/// Host timer used to drive polling
use core::time::Duration;

use crate::message::MessageSender;

/// A recurring fixed-period timer.
///
/// Every expiry posts [`crate::SensorMessage::TimerFired`] onto `queue`.
pub trait RepeatingTimer {
    /// Start firing every `period`. Restarts the timer if it is running.
    fn start(&mut self, period: Duration, queue: MessageSender);

    /// Stop firing. Expiries already queued are not recalled.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
