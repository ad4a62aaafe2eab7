//! Behavior engine: the robot's current activity and reflex arbitration.

use super::primitives::{self, DOCK_PHASES};
use super::state::{
    ActiveBehavior, BehaviorEvent, BehaviorKind, BehaviorMeta, BehaviorParams, BehaviorSnapshot,
    CommandSource, CondensedSensors, CycleReport, ManualAction, ManualCommand, ReflexKind,
    ReflexRecord, Side, StackEntry,
};
use crate::config::BehaviorConfig;
use crate::core::{BoundedRing, SensorSample, SharedClock};
use crate::error::Result;
use crate::events::EventPublisher;
use crate::motion::{MotionController, MotionPrimitive, RealizedMotion};
use crate::perception::SpatialModel;
use crossbeam_channel::Receiver;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Cliff threshold used when no spatial model is wired in.
const DEFAULT_CLIFF_THRESHOLD: f64 = 100.0;

/// Suspended behaviors kept for resumption; the oldest is dropped beyond this.
const MAX_STACK_DEPTH: usize = 8;

/// Reflexes included in status snapshots.
const SNAPSHOT_REFLEX_LIMIT: usize = 5;

// Manual motion clamps
const MANUAL_MIN_MM: f64 = 20.0;
const MANUAL_MAX_MM: f64 = 600.0;
const MANUAL_MIN_DEG: f64 = 5.0;
const MANUAL_MAX_DEG: f64 = 180.0;

/// Owns "what the robot is doing right now".
///
/// Exactly one [`ActiveBehavior`] runs at a time. Reflexes push the
/// displaced behavior onto a LIFO stack and the engine resumes it once the
/// reflex sequence drains. Primitives are issued one at a time: the next
/// one goes out whenever the motion controller reports its queue empty.
///
/// Both collaborators are optional; without a motion controller nothing is
/// driven, without a spatial model nothing is recorded.
pub struct BehaviorEngine<M: MotionController> {
    config: BehaviorConfig,
    clock: SharedClock,
    motion: Option<M>,
    spatial: Option<SpatialModel>,

    enabled: bool,
    active: ActiveBehavior,
    stack: Vec<StackEntry>,
    manual_override: bool,
    latest_sensors: Option<SensorSample>,

    default_behavior: BehaviorKind,
    default_params: BehaviorParams,

    reflexes: BoundedRing<ReflexRecord>,
    last_bump_trigger: Option<u64>,
    last_cycle_at: Option<u64>,
    last_manual: Option<ManualCommand>,

    rng: StdRng,
    events: EventPublisher<BehaviorEvent>,
}

impl<M: MotionController> BehaviorEngine<M> {
    /// Create an engine with no collaborators wired in.
    pub fn new(config: BehaviorConfig, clock: SharedClock) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let default_behavior = sanitize_default(config.default_behavior);
        Self {
            motion: None,
            spatial: None,
            enabled: false,
            active: ActiveBehavior::default(),
            stack: Vec::new(),
            manual_override: false,
            latest_sensors: None,
            default_behavior,
            default_params: BehaviorParams::default(),
            reflexes: BoundedRing::new(config.reflex_history_limit),
            last_bump_trigger: None,
            last_cycle_at: None,
            last_manual: None,
            rng,
            events: EventPublisher::new(),
            config,
            clock,
        }
    }

    pub fn with_motion(mut self, motion: M) -> Self {
        self.motion = Some(motion);
        self
    }

    pub fn with_spatial(mut self, spatial: SpatialModel) -> Self {
        self.spatial = Some(spatial);
        self
    }

    /// Subscribe to state, reflex, cycle and manual-override events.
    pub fn subscribe(&mut self) -> Receiver<BehaviorEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Autonomy switch
    // ========================================================================

    /// Turn autonomy on; starts the default behavior when idle.
    pub fn enable_autonomy(&mut self, reason: &str) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        self.active.sequence = Default::default();
        log::info!("BehaviorEngine: autonomy enabled ({})", reason);

        if self.active.kind == BehaviorKind::Idle {
            let params = self.default_params.clone();
            self.set_behavior(
                self.default_behavior,
                params,
                BehaviorMeta::new(CommandSource::Autonomy, "auto-start"),
            );
        }
        self.publish_state(reason, false);
    }

    /// Turn autonomy off: halt, drop the stack and any manual override.
    pub fn disable_autonomy(&mut self, reason: &str) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.stack.clear();
        self.manual_override = false;
        self.halt(reason);
        self.active = ActiveBehavior {
            meta: BehaviorMeta::new(CommandSource::Autonomy, reason),
            ..Default::default()
        };
        log::info!("BehaviorEngine: autonomy disabled ({})", reason);
        self.publish_state(reason, false);
    }

    /// Stop the wheels and discard queued primitives.
    ///
    /// A pending manual primitive is discarded too, which ends the override.
    pub fn halt(&mut self, reason: &str) {
        self.with_controller("stop", |m| m.stop());
        self.with_controller("clear_queue", |m| m.clear_queue());
        self.active.sequence = Default::default();
        self.manual_override = false;
        log::debug!("BehaviorEngine: halted ({})", reason);
        self.publish_state(reason, true);
    }

    /// Change the behavior used for auto-start and resume fallback.
    pub fn set_default_behavior(&mut self, kind: BehaviorKind, params: BehaviorParams) {
        if kind == BehaviorKind::Avoid {
            log::warn!("BehaviorEngine: avoid cannot be the default behavior");
            return;
        }
        self.default_behavior = kind;
        self.default_params = params;
        self.publish_state("default-updated", false);
    }

    // ========================================================================
    // Behavior changes
    // ========================================================================

    /// Make `kind` the active behavior.
    ///
    /// With `meta.stack` the displaced behavior is pushed for resumption.
    /// Unless `meta.skip_drive` is set, the first primitive goes out
    /// immediately.
    pub fn set_behavior(&mut self, kind: BehaviorKind, params: BehaviorParams, meta: BehaviorMeta) {
        let now = self.clock.now_ms();

        if meta.stack && self.active.kind.is_resumable() {
            if self.stack.len() >= MAX_STACK_DEPTH {
                self.stack.remove(0);
            }
            self.stack.push(StackEntry {
                kind: self.active.kind,
                params: self.active.params.clone(),
                meta: self.active.meta.clone(),
            });
        }

        let reason = if meta.reason.is_empty() {
            "behavior-change".to_string()
        } else {
            meta.reason.clone()
        };
        let skip_drive = meta.skip_drive;

        log::info!(
            "BehaviorEngine: {} -> {} ({}, source={})",
            self.active.kind,
            kind,
            reason,
            meta.source.as_str()
        );

        self.active = ActiveBehavior {
            kind,
            params,
            meta: BehaviorMeta {
                started_at: now,
                ..meta
            },
            sequence: Default::default(),
        };

        if kind == BehaviorKind::Idle {
            self.halt(&reason);
        } else if !skip_drive {
            self.execute_behavior(kind);
        }

        self.publish_state(&reason, false);
    }

    /// Name-based variant of [`set_behavior`] for text inputs.
    ///
    /// An empty name means idle. Unknown names are logged and ignored.
    ///
    /// [`set_behavior`]: BehaviorEngine::set_behavior
    pub fn set_behavior_by_name(&mut self, name: &str, params: BehaviorParams, meta: BehaviorMeta) {
        let kind = if name.trim().is_empty() {
            BehaviorKind::Idle
        } else {
            match name.parse::<BehaviorKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    log::warn!("BehaviorEngine: {}", e);
                    self.events.publish(BehaviorEvent::Log(e.to_string()));
                    return;
                }
            }
        };
        self.set_behavior(kind, params, meta);
    }

    /// Resume the most recently suspended behavior.
    ///
    /// Falls back to the default behavior when the stack is empty and
    /// autonomy is on, or to idle when it is off.
    pub fn restore_previous_behavior(&mut self, reason: &str) {
        if let Some(entry) = self.stack.pop() {
            let meta = BehaviorMeta {
                source: CommandSource::BehaviorEngine,
                reason: reason.to_string(),
                stack: false,
                skip_drive: false,
                ..entry.meta
            };
            self.set_behavior(entry.kind, entry.params, meta);
        } else if self.enabled {
            let params = self.default_params.clone();
            self.set_behavior(
                self.default_behavior,
                params,
                BehaviorMeta::new(CommandSource::BehaviorEngine, format!("{} (fallback)", reason)),
            );
        } else {
            self.set_behavior(
                BehaviorKind::Idle,
                BehaviorParams::default(),
                BehaviorMeta::new(CommandSource::BehaviorEngine, format!("{} (disabled)", reason)),
            );
        }
    }

    // ========================================================================
    // Manual control
    // ========================================================================

    /// Preempt autonomous driving with one clamped manual primitive.
    ///
    /// The override clears itself when the controller next drains.
    pub fn enqueue_manual_motion(&mut self, action: ManualAction, value: f64) {
        if !value.is_finite() {
            log::warn!("BehaviorEngine: ignoring non-finite manual value");
            return;
        }

        let (distance, turn) = match action {
            ManualAction::Forward => (value.clamp(MANUAL_MIN_MM, MANUAL_MAX_MM), 0.0),
            ManualAction::Backward => (-value.abs().clamp(MANUAL_MIN_MM, MANUAL_MAX_MM), 0.0),
            ManualAction::Left => (0.0, value.clamp(MANUAL_MIN_DEG, MANUAL_MAX_DEG)),
            ManualAction::Right => (0.0, -value.clamp(MANUAL_MIN_DEG, MANUAL_MAX_DEG)),
        };

        if self.motion.is_some() {
            self.with_controller("stop", |m| m.stop());
            self.with_controller("clear_queue", |m| m.clear_queue());
            self.manual_override = true;
            let command = ManualCommand {
                action,
                value,
                issued_at: self.clock.now_ms(),
            };
            self.last_manual = Some(command);
            let speed = self.config.wander_speed;
            self.issue(MotionPrimitive::new(distance, turn, speed));
            log::info!(
                "BehaviorEngine: manual {} {:.0}",
                action.as_str(),
                value
            );
            self.events.publish(BehaviorEvent::ManualOverride(command));
        }
        self.publish_state("manual-override", false);
    }

    // ========================================================================
    // Sensors and reflexes
    // ========================================================================

    /// Forward a sample to the spatial model, then check reflexes.
    ///
    /// Reflexes only fire with autonomy on and no manual override. Bumps are
    /// debounced; a cliff never re-triggers while already avoiding.
    pub fn update_sensors(&mut self, sample: SensorSample) {
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.ingest_sensors(&sample);
        }
        let cliff_threshold = self
            .spatial
            .as_ref()
            .map_or(DEFAULT_CLIFF_THRESHOLD, |s| s.cliff_threshold());

        let now = self.clock.now_ms();
        let bump = sample.any_bump();
        let bump_left = sample.bump_left();
        let bump_right = sample.bump_right();
        let cliff = sample.cliff_below(cliff_threshold);
        self.latest_sensors = Some(sample);

        if !self.enabled || self.manual_override {
            return;
        }

        let debounced = self
            .last_bump_trigger
            .is_none_or(|last| now.saturating_sub(last) >= self.config.bump_debounce_ms);

        if bump && debounced {
            let direction = if bump_left {
                Some(Side::Left)
            } else if bump_right {
                Some(Side::Right)
            } else {
                None
            };
            self.last_bump_trigger = Some(now);
            self.record_reflex(ReflexRecord {
                kind: ReflexKind::Bump,
                direction,
                at: now,
            });
            self.set_behavior(
                BehaviorKind::Avoid,
                BehaviorParams::avoid(direction, false),
                BehaviorMeta::new(CommandSource::Reflex, "bump-detected").stacked(),
            );
            return;
        }

        if cliff && self.active.kind != BehaviorKind::Avoid {
            self.record_reflex(ReflexRecord {
                kind: ReflexKind::Cliff,
                direction: None,
                at: now,
            });
            self.set_behavior(
                BehaviorKind::Avoid,
                BehaviorParams::avoid(Some(Side::Right), true),
                BehaviorMeta::new(CommandSource::Reflex, "cliff-detected").stacked(),
            );
        }
    }

    fn record_reflex(&mut self, record: ReflexRecord) {
        log::info!(
            "BehaviorEngine: {} reflex{}",
            record.kind.as_str(),
            record
                .direction
                .map(|d| format!(" ({})", d.as_str()))
                .unwrap_or_default()
        );
        self.reflexes.push(record);
        self.events.publish(BehaviorEvent::Reflex(record));
    }

    // ========================================================================
    // Motion controller feedback
    // ========================================================================

    /// One primitive finished: record it and update the spatial model.
    pub fn on_primitive_done(&mut self, movement: RealizedMotion) {
        let now = self.clock.now_ms();
        self.last_cycle_at = Some(now);
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.apply_motion(movement.distance_mm, movement.turn_deg);
        }
        self.events.publish(BehaviorEvent::CycleComplete(CycleReport {
            behavior: self.active.kind,
            timestamp: now,
            movement,
        }));
    }

    /// The controller drained: end a manual override, resume after a
    /// finished sequence, or issue the next primitive.
    pub fn on_queue_empty(&mut self) {
        if self.manual_override {
            self.manual_override = false;
            if self.enabled && self.active.kind != BehaviorKind::Idle {
                self.drive_behavior(false);
            }
            self.publish_state("manual-complete", false);
            return;
        }

        if self.active.sequence.awaiting_resume {
            let reason = self
                .active
                .sequence
                .resume_reason
                .take()
                .unwrap_or_else(|| "sequence-complete".to_string());
            self.active.sequence.awaiting_resume = false;
            self.restore_previous_behavior(&reason);
            return;
        }

        if !self.enabled {
            return;
        }
        self.drive_behavior(false);
    }

    // ========================================================================
    // Primitive generation
    // ========================================================================

    fn execute_behavior(&mut self, kind: BehaviorKind) {
        if !self.enabled {
            return;
        }
        match kind {
            BehaviorKind::Idle => self.halt("idle"),
            BehaviorKind::Avoid => self.queue_avoid_sequence(),
            _ => {
                // one primitive outstanding: the new behavior replaces the old queue
                if self.can_drive() {
                    self.with_controller("clear_queue", |m| m.clear_queue());
                }
                self.drive_behavior(true);
            }
        }
    }

    /// Issue the next primitive of a one-at-a-time behavior.
    fn drive_behavior(&mut self, force: bool) {
        match self.active.kind {
            BehaviorKind::Wander => self.queue_wander_move(force),
            BehaviorKind::WallFollow => self.queue_wall_follow_move(force),
            BehaviorKind::Scan => self.queue_scan_step(force),
            BehaviorKind::DockSeek => self.queue_dock_seek_step(force),
            // avoid is queued whole when set; idle drives nothing
            BehaviorKind::Avoid | BehaviorKind::Idle => {}
        }
    }

    fn can_drive(&self) -> bool {
        self.motion.is_some() && self.enabled && !self.manual_override
    }

    fn queue_wander_move(&mut self, force: bool) {
        if !self.can_drive() {
            return;
        }
        let primitive = primitives::wander(&mut self.rng, force, self.config.wander_speed);
        self.issue_planned(primitive);
    }

    fn queue_wall_follow_move(&mut self, force: bool) {
        if !self.can_drive() {
            return;
        }
        let side = match self.active.params.side {
            Some(Side::Right) => Side::Right,
            _ => Side::Left,
        };
        let bumps = self
            .latest_sensors
            .as_ref()
            .and_then(|s| s.light_bumps)
            .unwrap_or_default();
        let primitive = primitives::wall_follow(
            side,
            &bumps,
            self.config.wall_target_intensity,
            force,
            self.config.wander_speed,
        );
        self.issue_planned(primitive);
    }

    fn queue_scan_step(&mut self, force: bool) {
        if !self.can_drive() {
            return;
        }
        let turn = self
            .active
            .params
            .turn_size_deg
            .filter(|t| t.is_finite() && *t != 0.0)
            .unwrap_or(self.config.scan_turn_deg);
        let cycles = self.active.params.cycles.unwrap_or(self.config.scan_cycles);
        let completed = self.active.sequence.completed_turns;

        if !force && completed >= cycles {
            self.restore_previous_behavior("scan-finished");
            return;
        }

        self.issue_planned(primitives::scan_step(turn, self.config.rotate_speed));
        let sequence = &mut self.active.sequence;
        sequence.completed_turns = completed + 1;
        if sequence.completed_turns >= cycles {
            sequence.awaiting_resume = true;
            sequence.resume_reason = Some("scan-finished".to_string());
        }
    }

    fn queue_dock_seek_step(&mut self, force: bool) {
        if !self.can_drive() {
            return;
        }
        if force {
            self.active.sequence.phase = 0;
        }
        let phase = self.active.sequence.phase;
        self.issue_planned(primitives::dock_seek(
            phase,
            self.config.wander_speed,
            self.config.rotate_speed,
        ));
        self.active.sequence.phase = (phase + 1) % DOCK_PHASES;
    }

    fn queue_avoid_sequence(&mut self) {
        let state = &mut self.active.sequence;
        state.awaiting_resume = true;
        state.resume_reason = Some("avoid-finished".to_string());
        if self.motion.is_none() {
            return;
        }
        self.with_controller("stop", |m| m.stop());
        self.with_controller("clear_queue", |m| m.clear_queue());

        let sequence = primitives::avoid_sequence(
            self.active.params.direction,
            self.active.params.retreat.unwrap_or(false),
            self.config.wander_speed,
            self.config.rotate_speed,
        );
        for primitive in sequence {
            self.issue(primitive);
        }
        self.active.sequence.last_planned = sequence.last().copied();
    }

    fn issue_planned(&mut self, primitive: MotionPrimitive) {
        self.active.sequence.last_planned = Some(primitive);
        self.issue(primitive);
    }

    fn issue(&mut self, primitive: MotionPrimitive) {
        log::debug!(
            "BehaviorEngine: {} primitive {:.0}mm / {:.1}°",
            self.active.kind,
            primitive.distance_mm,
            primitive.turn_deg
        );
        self.with_controller("enqueue", |m| m.enqueue(primitive));
    }

    /// Run a controller call, absorbing failures into the log.
    fn with_controller(&mut self, what: &str, f: impl FnOnce(&mut M) -> Result<()>) {
        if let Some(motion) = self.motion.as_mut()
            && let Err(e) = f(motion)
        {
            log::warn!("BehaviorEngine: motion {} failed: {}", what, e);
        }
    }

    // ========================================================================
    // Status
    // ========================================================================

    fn publish_state(&mut self, reason: &str, halted: bool) {
        let snapshot = self.snapshot_with(reason, halted);
        self.events
            .publish(BehaviorEvent::StateChanged(Box::new(snapshot)));
    }

    fn snapshot_with(&self, reason: &str, halted: bool) -> BehaviorSnapshot {
        BehaviorSnapshot {
            enabled: self.enabled,
            behavior: self.active.kind,
            params: self.active.params.clone(),
            meta: self.active.meta.clone(),
            manual_override: self.manual_override,
            last_manual_command: self.last_manual,
            last_cycle_at: self.last_cycle_at,
            stack_depth: self.stack.len(),
            recent_reflexes: self.reflexes.recent(SNAPSHOT_REFLEX_LIMIT),
            latest_sensors: self.latest_sensors.as_ref().map(CondensedSensors::from),
            reason: reason.to_string(),
            halted,
        }
    }

    /// Current state as a read-only projection.
    pub fn status_snapshot(&self) -> BehaviorSnapshot {
        self.snapshot_with("status", false)
    }

    /// One-line status, e.g. `enabled=true, behavior=wall_follow, side=left`.
    pub fn describe_status(&self) -> String {
        let mut pieces = vec![
            format!("enabled={}", self.enabled),
            format!("behavior={}", self.active.kind),
        ];
        if self.active.kind == BehaviorKind::WallFollow
            && let Some(side) = self.active.params.side
        {
            pieces.push(format!("side={}", side.as_str()));
        }
        if self.manual_override {
            pieces.push("manual=active".to_string());
        }
        if let Some(last) = self.reflexes.last() {
            pieces.push(format!("last_reflex={}", last.kind.as_str()));
        }
        pieces.join(", ")
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current(&self) -> &ActiveBehavior {
        &self.active
    }

    pub fn current_kind(&self) -> BehaviorKind {
        self.active.kind
    }

    pub fn stack(&self) -> &[StackEntry] {
        &self.stack
    }

    pub fn is_manual_override(&self) -> bool {
        self.manual_override
    }

    pub fn reflex_history(&self) -> Vec<ReflexRecord> {
        self.reflexes.to_vec()
    }

    pub fn default_behavior(&self) -> BehaviorKind {
        self.default_behavior
    }

    pub fn motion(&self) -> Option<&M> {
        self.motion.as_ref()
    }

    pub fn motion_mut(&mut self) -> Option<&mut M> {
        self.motion.as_mut()
    }

    pub fn spatial(&self) -> Option<&SpatialModel> {
        self.spatial.as_ref()
    }

    pub fn spatial_mut(&mut self) -> Option<&mut SpatialModel> {
        self.spatial.as_mut()
    }
}

fn sanitize_default(kind: BehaviorKind) -> BehaviorKind {
    if kind == BehaviorKind::Avoid {
        log::warn!("BehaviorEngine: avoid cannot be the default behavior, using wander");
        BehaviorKind::Wander
    } else {
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpatialConfig;
    use crate::core::ManualClock;
    use crate::motion::{MotionEvent, SimulatedMotionController};

    type Engine = BehaviorEngine<SimulatedMotionController>;

    fn make_engine() -> (Engine, ManualClock) {
        let clock = ManualClock::new(100_000);
        let config = BehaviorConfig {
            rng_seed: Some(42),
            ..Default::default()
        };
        let engine = BehaviorEngine::new(config, clock.shared())
            .with_motion(SimulatedMotionController::new())
            .with_spatial(SpatialModel::new(SpatialConfig::default(), clock.shared()));
        (engine, clock)
    }

    fn sim(engine: &Engine) -> &SimulatedMotionController {
        engine.motion().unwrap()
    }

    /// Feed controller events back until it goes quiet or `limit` is hit.
    fn pump(engine: &mut Engine, limit: usize) {
        for _ in 0..limit {
            match engine.motion_mut().unwrap().poll() {
                Some(MotionEvent::PrimitiveDone(r)) => engine.on_primitive_done(r),
                Some(MotionEvent::QueueEmpty) => engine.on_queue_empty(),
                None => break,
            }
        }
    }

    fn bump_left() -> SensorSample {
        SensorSample {
            bump_left: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_enable_starts_default_behavior() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        assert_eq!(engine.current_kind(), BehaviorKind::Wander);
        assert_eq!(sim(&engine).issued().len(), 1);
        assert_eq!(engine.current().meta.source, CommandSource::Autonomy);
    }

    #[test]
    fn test_behavior_change_replaces_queued_primitive() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        assert_eq!(sim(&engine).pending(), 1);

        engine.set_behavior(
            BehaviorKind::Scan,
            BehaviorParams::scan(90.0, 4),
            BehaviorMeta::new(CommandSource::Planner, "look"),
        );
        assert_eq!(sim(&engine).pending(), 1);
        assert!(sim(&engine).queued().all(|p| p.is_rotation()));

        engine.set_behavior(
            BehaviorKind::Wander,
            BehaviorParams::default(),
            BehaviorMeta::new(CommandSource::Planner, "back"),
        );
        assert_eq!(sim(&engine).pending(), 1);
        assert_eq!(sim(&engine).issued().len(), 3);
    }

    #[test]
    fn test_disabled_engine_does_not_drive() {
        let (mut engine, _) = make_engine();
        engine.set_behavior(
            BehaviorKind::Wander,
            BehaviorParams::default(),
            BehaviorMeta::new(CommandSource::Planner, "test"),
        );
        assert_eq!(engine.current_kind(), BehaviorKind::Wander);
        assert!(sim(&engine).issued().is_empty());
    }

    #[test]
    fn test_disable_halts_and_clears() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        engine.update_sensors(bump_left());
        assert_eq!(engine.stack().len(), 1);

        engine.disable_autonomy("operator");
        assert_eq!(engine.current_kind(), BehaviorKind::Idle);
        assert!(engine.stack().is_empty());
        assert!(!engine.is_enabled());
        assert_eq!(sim(&engine).pending(), 0);
        assert!(sim(&engine).stop_count() >= 1);
    }

    #[test]
    fn test_skip_drive_changes_bookkeeping_only() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        let before = sim(&engine).issued().len();
        engine.set_behavior(
            BehaviorKind::DockSeek,
            BehaviorParams::default(),
            BehaviorMeta::new(CommandSource::Planner, "re-entry").without_drive(),
        );
        assert_eq!(engine.current_kind(), BehaviorKind::DockSeek);
        assert_eq!(sim(&engine).issued().len(), before);
    }

    #[test]
    fn test_unknown_name_is_ignored() {
        let (mut engine, _) = make_engine();
        let rx = engine.subscribe();
        engine.enable_autonomy("test");
        engine.set_behavior_by_name(
            "moonwalk",
            BehaviorParams::default(),
            BehaviorMeta::default(),
        );
        assert_eq!(engine.current_kind(), BehaviorKind::Wander);
        assert!(
            rx.try_iter()
                .any(|e| matches!(e, BehaviorEvent::Log(msg) if msg.contains("moonwalk")))
        );

        engine.set_behavior_by_name("", BehaviorParams::default(), BehaviorMeta::default());
        assert_eq!(engine.current_kind(), BehaviorKind::Idle);
    }

    #[test]
    fn test_bump_debounce() {
        let (mut engine, clock) = make_engine();
        engine.enable_autonomy("test");

        engine.update_sensors(bump_left());
        clock.advance(300);
        engine.update_sensors(bump_left());
        assert_eq!(engine.reflex_history().len(), 1);

        clock.advance(300);
        engine.update_sensors(bump_left());
        assert_eq!(engine.reflex_history().len(), 2);
    }

    #[test]
    fn test_avoid_sequence_then_resume() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        pump(&mut engine, 1); // wander primitive completes

        engine.update_sensors(bump_left());
        assert_eq!(engine.current_kind(), BehaviorKind::Avoid);
        assert_eq!(sim(&engine).pending(), 3);
        let queued: Vec<_> = sim(&engine).queued().copied().collect();
        assert_eq!(queued[1].turn_deg, -60.0);

        pump(&mut engine, 4);
        assert_eq!(engine.current_kind(), BehaviorKind::Wander);
        assert_eq!(engine.current().meta.source, CommandSource::BehaviorEngine);
        assert_eq!(engine.current().meta.reason, "avoid-finished");
        assert!(engine.stack().is_empty());
    }

    #[test]
    fn test_cliff_reflex_retreats_further() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        engine.update_sensors(SensorSample {
            cliff_sensors: Some(vec![20.0]),
            ..Default::default()
        });
        assert_eq!(engine.current_kind(), BehaviorKind::Avoid);
        let queued: Vec<_> = sim(&engine).queued().copied().collect();
        assert_eq!(queued[0].distance_mm, -200.0);
        assert_eq!(queued[1].turn_deg, 60.0);

        // a second cliff while avoiding does not re-trigger
        engine.update_sensors(SensorSample {
            cliff_sensors: Some(vec![20.0]),
            ..Default::default()
        });
        assert_eq!(engine.reflex_history().len(), 1);
        assert_eq!(engine.stack().len(), 1);
    }

    #[test]
    fn test_reflex_history_is_bounded() {
        let (mut engine, clock) = make_engine();
        engine.enable_autonomy("test");
        for _ in 0..12 {
            clock.advance(700);
            engine.update_sensors(bump_left());
        }
        assert_eq!(engine.reflex_history().len(), 8);
    }

    #[test]
    fn test_scan_runs_cycles_then_resumes() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        pump(&mut engine, 1);
        engine.set_behavior(
            BehaviorKind::Scan,
            BehaviorParams::scan(90.0, 4),
            BehaviorMeta::new(CommandSource::Planner, "look").stacked(),
        );
        assert_eq!(engine.stack().len(), 1);

        // each rotation completes then drains: 4 rotations → 8 events
        pump(&mut engine, 8);
        assert_eq!(engine.current_kind(), BehaviorKind::Wander);
        assert_eq!(engine.current().meta.reason, "scan-finished");

        let rotations = sim(&engine)
            .issued()
            .iter()
            .filter(|p| p.is_rotation() && p.turn_deg == 90.0)
            .count();
        assert_eq!(rotations, 4);
    }

    #[test]
    fn test_dock_seek_cycles_phases() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        engine.set_behavior(
            BehaviorKind::DockSeek,
            BehaviorParams::default(),
            BehaviorMeta::new(CommandSource::Planner, "dock"),
        );
        pump(&mut engine, 14);
        let dock: Vec<_> = sim(&engine).issued()[1..].to_vec();
        assert!(dock.len() >= 7);
        for (i, p) in dock.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(p.distance_mm, -120.0);
            } else {
                assert_eq!(p.turn_deg, 45.0);
            }
        }
        assert_eq!(engine.current_kind(), BehaviorKind::DockSeek);
    }

    #[test]
    fn test_manual_override_blocks_autonomy_until_drained() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        engine.enqueue_manual_motion(ManualAction::Forward, 5000.0);
        assert!(engine.is_manual_override());
        assert_eq!(sim(&engine).pending(), 1);
        assert_eq!(sim(&engine).last_issued().unwrap().distance_mm, 600.0);

        // reflexes are suppressed during override
        engine.update_sensors(bump_left());
        assert!(engine.reflex_history().is_empty());

        pump(&mut engine, 1); // manual primitive done
        assert!(engine.is_manual_override());
        pump(&mut engine, 1); // queue empty
        assert!(!engine.is_manual_override());
        assert_eq!(sim(&engine).pending(), 1);
        assert_eq!(engine.current_kind(), BehaviorKind::Wander);
    }

    #[test]
    fn test_manual_clamps() {
        let (mut engine, _) = make_engine();
        engine.enqueue_manual_motion(ManualAction::Backward, 5.0);
        assert_eq!(sim(&engine).last_issued().unwrap().distance_mm, -20.0);
        engine.enqueue_manual_motion(ManualAction::Right, 400.0);
        assert_eq!(sim(&engine).last_issued().unwrap().turn_deg, -180.0);
        engine.enqueue_manual_motion(ManualAction::Left, 1.0);
        assert_eq!(sim(&engine).last_issued().unwrap().turn_deg, 5.0);
        engine.enqueue_manual_motion(ManualAction::Left, f64::NAN);
        assert_eq!(sim(&engine).issued().len(), 3);
    }

    #[test]
    fn test_restore_without_stack_falls_back() {
        let (mut engine, _) = make_engine();
        engine.restore_previous_behavior("nothing");
        assert_eq!(engine.current_kind(), BehaviorKind::Idle);
        assert_eq!(engine.current().meta.reason, "nothing (disabled)");

        engine.enable_autonomy("test");
        engine.set_default_behavior(BehaviorKind::WallFollow, BehaviorParams::wall(Side::Right));
        engine.restore_previous_behavior("nothing");
        assert_eq!(engine.current_kind(), BehaviorKind::WallFollow);
        assert_eq!(engine.current().params.side, Some(Side::Right));
        assert_eq!(engine.current().meta.reason, "nothing (fallback)");
    }

    #[test]
    fn test_offline_controller_is_absorbed() {
        let (mut engine, _) = make_engine();
        engine.motion_mut().unwrap().set_offline(true);
        engine.enable_autonomy("test");
        engine.update_sensors(bump_left());
        assert_eq!(engine.current_kind(), BehaviorKind::Avoid);
        assert!(sim(&engine).issued().is_empty());
    }

    #[test]
    fn test_no_collaborators() {
        let clock = ManualClock::new(0);
        let mut engine: Engine = BehaviorEngine::new(BehaviorConfig::default(), clock.shared());
        engine.enable_autonomy("bare");
        engine.update_sensors(bump_left());
        engine.on_primitive_done(RealizedMotion::default());
        engine.on_queue_empty();
        assert_eq!(engine.current_kind(), BehaviorKind::Wander);
    }

    #[test]
    fn test_describe_status() {
        let (mut engine, _) = make_engine();
        engine.enable_autonomy("test");
        engine.set_behavior(
            BehaviorKind::WallFollow,
            BehaviorParams::wall(Side::Left),
            BehaviorMeta::new(CommandSource::Planner, "wall"),
        );
        engine.update_sensors(bump_left());
        engine.restore_previous_behavior("done");
        assert_eq!(
            engine.describe_status(),
            "enabled=true, behavior=wall_follow, side=left, last_reflex=bump"
        );
    }
}
