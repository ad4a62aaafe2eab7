//! Behavior arbitration.
//!
//! The [`BehaviorEngine`] runs exactly one behavior at a time and turns it
//! into motion primitives, one per controller drain. Reflexes (bump, cliff)
//! preempt the running behavior with a stacked `avoid` sequence; when the
//! sequence drains the displaced behavior resumes.
//!
//! ```text
//!   sensors ──► update_sensors ──► reflex? ──► avoid (push previous)
//!                                               │
//!   controller ──► on_queue_empty ──────────────┴──► next primitive / resume
//! ```

mod engine;
pub mod primitives;
mod state;

pub use engine::BehaviorEngine;
pub use state::{
    ActiveBehavior, BehaviorEvent, BehaviorKind, BehaviorMeta, BehaviorParams, BehaviorSnapshot,
    CommandSource, CondensedSensors, CycleReport, ManualAction, ManualCommand, ReflexKind,
    ReflexRecord, SequenceState, Side, StackEntry,
};
