//! Mission planning.
//!
//! Free-text goals and directives become a FIFO of [`MissionStep`]s. The
//! [`MissionPlanner`] runs at most one step at a time, commanding behaviors
//! through the [`BehaviorActuator`] seam and expiring steps at their
//! deadlines on each [`tick`](MissionPlanner::tick).

mod actuator;
pub mod parser;
mod planner;
mod step;

pub use actuator::BehaviorActuator;
pub use planner::MissionPlanner;
pub use step::{
    GoalOptions, GoalRecord, MissionEvent, MissionSnapshot, MissionStep, StepPlan, StepSource,
    StepStatus,
};
