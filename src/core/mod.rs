//! Foundation types shared by every layer.
//!
//! - [`Clock`]: injected wall-clock source (system or manual)
//! - [`BoundedRing`]: FIFO ring that evicts its oldest entry when full
//! - [`Pose`], [`SensorSample`], [`LightBumps`]: robot state and raw sensor input

mod clock;
mod ring;
mod types;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use ring::BoundedRing;
pub use types::{LightBumps, LightChannel, Pose, SensorSample};
