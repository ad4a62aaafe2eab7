//! Single-threaded coordinator for the three autonomy components.
//!
//! Every external input (sensor sample, motion feedback, goal, directive,
//! manual command) is dispatched to completion before the next one is
//! accepted. After the dispatch, behavior events are drained into the
//! mission planner until nothing new is produced:
//!
//! ```text
//!   CycleComplete  ──► planner.tick
//!   Reflex         ──► planner.on_reflex
//!   StateChanged   ──► planner.on_behavior_state (scan-finished)
//! ```
//!
//! Components never call each other re-entrantly; the planner only reaches
//! the engine through [`BehaviorActuator`](crate::mission::BehaviorActuator).

use crate::behavior::{
    BehaviorEngine, BehaviorEvent, BehaviorKind, BehaviorParams, ManualAction,
};
use crate::config::ChetanaConfig;
use crate::core::{SensorSample, SharedClock};
use crate::mission::{GoalOptions, MissionEvent, MissionPlanner};
use crate::motion::{MotionController, MotionEvent};
use crate::perception::{SpatialEvent, SpatialModel};
use crossbeam_channel::Receiver;

/// Spatial model, behavior engine and mission planner wired together.
pub struct Autonomy<M: MotionController> {
    engine: BehaviorEngine<M>,
    planner: MissionPlanner,
    /// Engine events not yet forwarded to the planner
    engine_events: Receiver<BehaviorEvent>,
}

impl<M: MotionController> Autonomy<M> {
    pub fn new(config: &ChetanaConfig, motion: M, clock: SharedClock) -> Self {
        let spatial = SpatialModel::new(config.spatial.clone(), clock.clone());
        let mut engine = BehaviorEngine::new(config.behavior.clone(), clock.clone())
            .with_motion(motion)
            .with_spatial(spatial);
        let engine_events = engine.subscribe();
        let planner = MissionPlanner::new(config.mission.clone(), clock);
        Self {
            engine,
            planner,
            engine_events,
        }
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    pub fn handle_sensor_sample(&mut self, sample: SensorSample) {
        self.engine.update_sensors(sample);
        self.settle();
    }

    pub fn handle_motion_event(&mut self, event: MotionEvent) {
        match event {
            MotionEvent::PrimitiveDone(movement) => self.engine.on_primitive_done(movement),
            MotionEvent::QueueEmpty => self.engine.on_queue_empty(),
        }
        self.settle();
    }

    pub fn ingest_goal(&mut self, text: &str, options: GoalOptions) {
        self.planner.ingest_goal(text, options, &mut self.engine);
        self.settle();
    }

    pub fn ingest_directive(&mut self, text: &str, prepend: bool) {
        self.planner
            .ingest_directive(text, prepend, &mut self.engine);
        self.settle();
    }

    pub fn manual_motion(&mut self, action: ManualAction, value: f64) {
        self.engine.enqueue_manual_motion(action, value);
        self.settle();
    }

    /// Enable the engine and start mission scheduling.
    pub fn enable_autonomy(&mut self, reason: &str) {
        self.engine.enable_autonomy(reason);
        self.planner.start(&mut self.engine);
        self.settle();
    }

    /// Stop mission scheduling and disable the engine.
    pub fn disable_autonomy(&mut self, reason: &str) {
        self.planner.stop();
        self.engine.disable_autonomy(reason);
        self.settle();
    }

    pub fn set_default_behavior(&mut self, kind: BehaviorKind, params: BehaviorParams) {
        self.engine.set_default_behavior(kind, params);
        self.settle();
    }

    pub fn mark_step_complete(&mut self, reason: &str) {
        self.planner.mark_step_complete(reason, &mut self.engine);
        self.settle();
    }

    pub fn fail_active_step(&mut self, reason: &str) {
        self.planner.fail_active_step(reason, &mut self.engine);
        self.settle();
    }

    /// Forward pending engine events to the planner until quiescent.
    fn settle(&mut self) {
        while let Ok(event) = self.engine_events.try_recv() {
            match event {
                BehaviorEvent::CycleComplete(_) => self.planner.tick(&mut self.engine),
                BehaviorEvent::Reflex(record) => self.planner.on_reflex(record),
                BehaviorEvent::StateChanged(snapshot) => {
                    self.planner.on_behavior_state(&snapshot, &mut self.engine)
                }
                BehaviorEvent::ManualOverride(_) | BehaviorEvent::Log(_) => {}
            }
        }
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Behavior, mission and spatial status lines.
    pub fn describe_status(&self) -> String {
        let mut lines = vec![self.engine.describe_status(), self.planner.describe_status()];
        if let Some(spatial) = self.engine.spatial() {
            lines.push(spatial.describe_summary());
        }
        lines.join("\n")
    }

    pub fn subscribe_behavior(&mut self) -> Receiver<BehaviorEvent> {
        self.engine.subscribe()
    }

    pub fn subscribe_mission(&mut self) -> Receiver<MissionEvent> {
        self.planner.subscribe()
    }

    pub fn subscribe_spatial(&mut self) -> Option<Receiver<SpatialEvent>> {
        self.engine.spatial_mut().map(SpatialModel::subscribe)
    }

    pub fn engine(&self) -> &BehaviorEngine<M> {
        &self.engine
    }

    pub fn planner(&self) -> &MissionPlanner {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut MissionPlanner {
        &mut self.planner
    }

    pub fn spatial(&self) -> Option<&SpatialModel> {
        self.engine.spatial()
    }

    pub fn motion(&self) -> Option<&M> {
        self.engine.motion()
    }

    pub fn motion_mut(&mut self) -> Option<&mut M> {
        self.engine.motion_mut()
    }
}
