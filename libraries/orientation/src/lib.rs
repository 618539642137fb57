//! # Device orientation event pump
//!
//! Bridges the platform orientation sensors to a single stream of
//! orientation events for a page-level listener.
//!
//! ## Features
//!
//! - Relative orientation with a one-time fallback to the absolute sensor
//! - Absolute-only mode for `deviceorientationabsolute` style listeners
//! - Per-sensor lifecycle that survives start/stop requests racing with
//!   asynchronous sensor creation
//! - Threshold-based suppression of imperceptible changes
//!
//! All state lives on one task queue: the host feeds every
//! [`hal::SensorMessage`] into [`OrientationEventPump::handle_message`] and
//! calls `start`/`stop` from the same queue.

mod change_filter;
mod config;
mod data;
mod error;
mod event_pump;
mod listener;
mod orientation_pump;
mod sensor_entry;

#[cfg(test)]
mod test_utils;

pub use change_filter::{is_significantly_different, should_fire_event, ORIENTATION_THRESHOLD};
pub use config::{PumpConfig, DEFAULT_PUMP_FREQUENCY_HZ, MAX_PUMP_FREQUENCY_HZ};
pub use data::OrientationData;
pub use error::{PumpError, PumpResult};
pub use event_pump::{PumpCore, PumpState};
pub use listener::OrientationListener;
pub use orientation_pump::OrientationEventPump;
pub use sensor_entry::{SensorEntry, SensorState};
