//! Platform interfaces consumed by the device sensor pumps.
//!
//! Everything the pumps talk to lives behind these traits: the sensor
//! service that owns the physical sensors, the polled reading buffers, the
//! frame that hands out service connections and the host's repeating timer.
//! Asynchronous completions never call back into a pump directly; they are
//! posted as [`SensorMessage`]s onto a single queue that the host drains.

mod message;
mod provider;
mod sensor;
mod timer;
mod types;

pub use message::*;
pub use provider::*;
pub use sensor::*;
pub use timer::*;
pub use types::*;
