//! Motion controller boundary.
//!
//! The behavior engine is the only component that issues primitives. It
//! talks to hardware (or the simulator) through the [`MotionController`]
//! trait and is fed back [`MotionEvent`]s by whoever owns the event loop.

mod commands;
mod controller;
mod simulated;

pub use commands::{MotionEvent, MotionPrimitive, RealizedMotion};
pub use controller::MotionController;
pub use simulated::SimulatedMotionController;
