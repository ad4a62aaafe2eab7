//! Seam between the mission planner and whatever executes behaviors.

use crate::behavior::{BehaviorEngine, BehaviorKind, BehaviorMeta, BehaviorParams};
use crate::motion::MotionController;

/// Commands the planner may issue.
///
/// The planner never touches behavior state directly; it only asks for a
/// behavior change or a halt.
pub trait BehaviorActuator {
    fn set_behavior(&mut self, kind: BehaviorKind, params: BehaviorParams, meta: BehaviorMeta);

    fn halt(&mut self, reason: &str);

    /// Behavior currently running.
    fn current_behavior(&self) -> BehaviorKind;
}

impl<M: MotionController> BehaviorActuator for BehaviorEngine<M> {
    fn set_behavior(&mut self, kind: BehaviorKind, params: BehaviorParams, meta: BehaviorMeta) {
        BehaviorEngine::set_behavior(self, kind, params, meta);
    }

    fn halt(&mut self, reason: &str) {
        BehaviorEngine::halt(self, reason);
    }

    fn current_behavior(&self) -> BehaviorKind {
        self.current_kind()
    }
}
