//! Chetana - Reactive/deliberative autonomy core for a small wheeled robot
//!
//! # Architecture
//!
//! The crate is organized into layers, leaves first:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    autonomy                         │  ← Coordination
//! │       (event dispatch, engine → planner routing)    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    mission/                         │  ← Deliberation
//! │          (goal parsing, timed step queue)           │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   behavior/                         │  ← Arbitration
//! │     (active behavior, reflexes, resumable stack)    │
//! └─────────────────────────────────────────────────────┘
//!                  │                   │
//! ┌──────────────────────────┐ ┌────────────────────────┐
//! │      perception/         │ │       motion/          │  ← Boundaries
//! │ (pose, sectors, summary) │ │ (controller trait, sim)│
//! └──────────────────────────┘ └────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │        (clock, ring buffer, sensor types)           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on one logical thread. Each component is the sole
//! mutator of its own state and publishes read-only snapshots over typed
//! channels ([`events`]).

pub mod config;
pub mod error;
pub mod events;
pub mod utils;

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Boundaries (depend on core)
// ============================================================================
pub mod motion;
pub mod perception;

// ============================================================================
// Layer 3: Behavior arbitration (depends on motion, perception)
// ============================================================================
pub mod behavior;

// ============================================================================
// Layer 4: Mission planning (drives behavior through an actuator seam)
// ============================================================================
pub mod mission;

// ============================================================================
// Layer 5: Coordination
// ============================================================================
pub mod autonomy;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

pub use config::{BehaviorConfig, ChetanaConfig, MissionConfig, SpatialConfig};
pub use error::{ChetanaError, Result};

// Core
pub use core::{
    BoundedRing, Clock, LightBumps, LightChannel, ManualClock, Pose, SensorSample, SharedClock,
    SystemClock,
};

// Motion
pub use motion::{
    MotionController, MotionEvent, MotionPrimitive, RealizedMotion, SimulatedMotionController,
};

// Perception
pub use perception::{
    Breadcrumb, RelativeDirection, Sector, Sighting, SightingCategory, SpatialEvent, SpatialModel,
    SpatialSummary,
};

// Behavior
pub use behavior::{
    BehaviorEngine, BehaviorEvent, BehaviorKind, BehaviorMeta, BehaviorParams, BehaviorSnapshot,
    CommandSource, ManualAction, ReflexKind, ReflexRecord, Side,
};

// Mission
pub use mission::{
    BehaviorActuator, GoalOptions, MissionEvent, MissionPlanner, MissionSnapshot, MissionStep,
    StepSource, StepStatus,
};

// Coordination
pub use autonomy::Autonomy;
