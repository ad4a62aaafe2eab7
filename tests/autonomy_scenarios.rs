//! Behavior and mission scenario tests
//!
//! End-to-end runs against the simulated motion controller and a manual clock:
//! - Bump reflex debounce
//! - Behavior stack round-trip through a reflex
//! - Mission step lifecycle from goal text to deadline
//! - Manual override exclusivity
//! - Auto-explore fallback
//! - One outstanding primitive across step transitions
//!
//! Run with: `cargo test --test autonomy_scenarios`

use chetana::{
    Autonomy, BehaviorConfig, BehaviorEngine, BehaviorEvent, BehaviorKind, BehaviorMeta,
    BehaviorParams, ChetanaConfig, CommandSource, GoalOptions, ManualAction, ManualClock,
    MotionEvent, SensorSample, Side, SimulatedMotionController, SpatialConfig, SpatialModel,
    StepSource, StepStatus,
};

type SimEngine = BehaviorEngine<SimulatedMotionController>;
type SimAutonomy = Autonomy<SimulatedMotionController>;

// ============================================================================
// Helpers
// ============================================================================

fn make_engine(clock: &ManualClock) -> SimEngine {
    let config = BehaviorConfig {
        rng_seed: Some(99),
        ..Default::default()
    };
    BehaviorEngine::new(config, clock.shared())
        .with_motion(SimulatedMotionController::new())
        .with_spatial(SpatialModel::new(SpatialConfig::default(), clock.shared()))
}

fn make_autonomy(clock: &ManualClock, auto_explore: bool) -> SimAutonomy {
    let mut config = ChetanaConfig::default();
    config.behavior.rng_seed = Some(99);
    config.mission.auto_explore = auto_explore;
    Autonomy::new(&config, SimulatedMotionController::new(), clock.shared())
}

/// Deliver the next controller event, if any.
fn step(autonomy: &mut SimAutonomy) -> Option<MotionEvent> {
    let event = autonomy.motion_mut()?.poll()?;
    autonomy.handle_motion_event(event);
    Some(event)
}

fn bump(left: bool) -> SensorSample {
    SensorSample {
        bump_left: Some(left),
        bump_right: Some(!left),
        ..Default::default()
    }
}

fn issued_count(autonomy: &SimAutonomy) -> usize {
    autonomy.motion().map_or(0, |m| m.issued().len())
}

// ============================================================================
// Reflexes
// ============================================================================

#[test]
fn test_bump_debounce_window() {
    let clock = ManualClock::new(10_000);
    let mut engine = make_engine(&clock);
    let events = engine.subscribe();
    engine.enable_autonomy("test");

    engine.update_sensors(bump(true));
    clock.advance(599);
    engine.update_sensors(bump(true));

    let avoid_transitions = |rx: &crossbeam_channel::Receiver<BehaviorEvent>| {
        rx.try_iter()
            .filter(|e| {
                matches!(e, BehaviorEvent::StateChanged(s)
                    if s.behavior == BehaviorKind::Avoid && s.reason == "bump-detected")
            })
            .count()
    };
    assert_eq!(avoid_transitions(&events), 1);
    assert_eq!(engine.reflex_history().len(), 1);

    clock.advance(1);
    engine.update_sensors(bump(false));
    assert_eq!(avoid_transitions(&events), 1);
    assert_eq!(engine.reflex_history().len(), 2);
    assert_eq!(engine.reflex_history()[1].direction, Some(Side::Right));
}

#[test]
fn test_reflex_stack_round_trip() {
    let clock = ManualClock::new(0);
    let mut engine = make_engine(&clock);
    engine.enable_autonomy("test");
    assert_eq!(engine.current_kind(), BehaviorKind::Wander);
    let original = engine.current().params.clone();

    engine.update_sensors(bump(true));
    assert_eq!(engine.current_kind(), BehaviorKind::Avoid);
    assert_eq!(engine.stack().len(), 1);

    engine.restore_previous_behavior("test-resume");
    assert_eq!(engine.current_kind(), BehaviorKind::Wander);
    assert_eq!(engine.current().params, original);
    assert!(engine.stack().is_empty());
}

#[test]
fn test_reflex_preserves_wall_follow_params() {
    let clock = ManualClock::new(0);
    let mut engine = make_engine(&clock);
    engine.enable_autonomy("test");
    engine.set_behavior(
        BehaviorKind::WallFollow,
        BehaviorParams::wall(Side::Right),
        BehaviorMeta::new(CommandSource::External, "hug right"),
    );

    engine.update_sensors(SensorSample {
        cliff_sensors: Some(vec![3.0, 2500.0]),
        ..Default::default()
    });
    assert_eq!(engine.current_kind(), BehaviorKind::Avoid);

    // drain the three-primitive escape; resume happens on the final drain
    for _ in 0..4 {
        match engine.motion_mut().unwrap().poll() {
            Some(MotionEvent::PrimitiveDone(r)) => engine.on_primitive_done(r),
            Some(MotionEvent::QueueEmpty) => engine.on_queue_empty(),
            None => break,
        }
    }
    assert_eq!(engine.current_kind(), BehaviorKind::WallFollow);
    assert_eq!(engine.current().params, BehaviorParams::wall(Side::Right));
}

// ============================================================================
// Mission lifecycle
// ============================================================================

#[test]
fn test_patrol_goal_lifecycle() {
    let clock = ManualClock::new(0);
    let mut autonomy = make_autonomy(&clock, false);

    // planner not running yet: the step stays queued
    autonomy.ingest_goal("patrol for 10 seconds", GoalOptions::default());
    let queued: Vec<_> = autonomy.planner().queue().cloned().collect();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].behavior, BehaviorKind::Wander);
    assert_eq!(queued[0].duration_ms, 10_000);
    assert_eq!(queued[0].status, StepStatus::Queued);
    assert_eq!(queued[0].source, StepSource::Goal);

    autonomy.enable_autonomy("test");
    let active = autonomy.planner().active_step().unwrap();
    assert_eq!(active.status, StepStatus::Active);
    assert_eq!(active.deadline, Some(10_000));

    clock.advance(10_000);
    assert!(step(&mut autonomy).is_some());

    assert!(autonomy.planner().active_step().is_none());
    let history = autonomy.planner().history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, StepStatus::Completed);
    assert_eq!(history[0].result.as_deref(), Some("deadline"));
    assert_eq!(history[0].completed_at, Some(10_000));
}

#[test]
fn test_goal_replacement_and_queue_order() {
    let clock = ManualClock::new(0);
    let mut autonomy = make_autonomy(&clock, false);
    autonomy.enable_autonomy("test");

    autonomy.ingest_goal("scan the room then explore", GoalOptions::default());
    autonomy.ingest_directive("now follow the left wall", false);
    let kinds: Vec<_> = autonomy.planner().queue().map(|s| s.behavior).collect();
    assert_eq!(kinds, vec![BehaviorKind::WallFollow, BehaviorKind::Wander]);

    autonomy.ingest_goal("go charge", GoalOptions::default());
    let history = autonomy.planner().history();
    assert_eq!(history.last().unwrap().behavior, BehaviorKind::Scan);
    assert_eq!(history.last().unwrap().result.as_deref(), Some("replaced"));
    assert_eq!(autonomy.planner().queue_len(), 0);
    assert_eq!(autonomy.engine().current_kind(), BehaviorKind::DockSeek);
}

// ============================================================================
// Manual override
// ============================================================================

#[test]
fn test_manual_override_exclusivity() {
    let clock = ManualClock::new(0);
    let mut autonomy = make_autonomy(&clock, false);
    autonomy.enable_autonomy("test");
    autonomy.ingest_goal("patrol for 5 seconds", GoalOptions::default());
    assert!(autonomy.planner().active_step().is_some());

    autonomy.manual_motion(ManualAction::Forward, 300.0);
    assert!(autonomy.engine().is_manual_override());
    let after_manual = issued_count(&autonomy);
    assert_eq!(autonomy.motion().unwrap().pending(), 1);

    // deadline passes mid-override; the step ends but nothing autonomous drives
    clock.advance(6_000);
    autonomy.handle_sensor_sample(bump(true));
    assert!(matches!(step(&mut autonomy), Some(MotionEvent::PrimitiveDone(_))));
    assert!(autonomy.planner().active_step().is_none());
    assert_eq!(issued_count(&autonomy), after_manual);
    assert!(autonomy.engine().reflex_history().is_empty());

    // queue drains: override ends and autonomous driving resumes
    assert_eq!(step(&mut autonomy), Some(MotionEvent::QueueEmpty));
    assert!(!autonomy.engine().is_manual_override());
    assert_eq!(issued_count(&autonomy), after_manual + 1);
    assert_eq!(autonomy.engine().current_kind(), BehaviorKind::Wander);
}

// ============================================================================
// Auto-explore
// ============================================================================

#[test]
fn test_auto_explore_fallback() {
    let clock = ManualClock::new(0);
    let mut autonomy = make_autonomy(&clock, true);
    clock.set(30_000);

    autonomy.enable_autonomy("test");
    let planner = autonomy.planner();
    let active = planner.active_step().unwrap();
    assert!(active.auto);
    assert_eq!(active.behavior, BehaviorKind::Wander);
    assert_eq!(active.duration_ms, 15_000);
    assert_eq!(planner.queue_len(), 0);
    assert!(planner.history().is_empty());
    assert_eq!(planner.next_auto_explore_at(), 50_000);

    // the pulse expires before the cooldown; no second step yet
    clock.set(45_000);
    step(&mut autonomy);
    assert!(autonomy.planner().active_step().is_none());
    assert_eq!(autonomy.planner().history().len(), 1);

    clock.set(50_000);
    while autonomy.planner().active_step().is_none() {
        assert!(step(&mut autonomy).is_some());
    }
    assert_eq!(autonomy.planner().history().len(), 1);
    assert_eq!(autonomy.planner().next_auto_explore_at(), 70_000);
}

#[test]
fn test_absurd_goal_duration_does_not_overflow() {
    let clock = ManualClock::new(5_000);
    let mut autonomy = make_autonomy(&clock, false);
    autonomy.enable_autonomy("test");

    autonomy.ingest_goal("patrol for 18446744073709551 seconds", GoalOptions::default());
    let active = autonomy.planner().active_step().unwrap();
    assert_eq!(active.deadline, Some(u64::MAX));

    clock.advance(60_000);
    assert!(step(&mut autonomy).is_some());
    assert!(autonomy.planner().active_step().is_some());
}

// ============================================================================
// Controller queue depth
// ============================================================================

#[test]
fn test_enable_leaves_one_primitive_queued() {
    let clock = ManualClock::new(0);
    let mut autonomy = make_autonomy(&clock, true);
    clock.set(30_000);

    autonomy.enable_autonomy("test");
    assert!(autonomy.planner().active_step().unwrap().auto);
    assert_eq!(autonomy.motion().unwrap().pending(), 1);
}

#[test]
fn test_step_transitions_keep_one_primitive_queued() {
    let clock = ManualClock::new(0);
    let mut autonomy = make_autonomy(&clock, false);
    autonomy.enable_autonomy("test");

    autonomy.ingest_goal("patrol for 5 seconds", GoalOptions::default());
    autonomy.ingest_goal("scan the room then explore", GoalOptions::append());
    assert_eq!(autonomy.motion().unwrap().pending(), 1);

    // patrol deadline: the scan step starts on the next completion
    clock.advance(5_000);
    assert!(step(&mut autonomy).is_some());
    assert_eq!(
        autonomy.planner().active_step().unwrap().behavior,
        BehaviorKind::Scan
    );
    assert_eq!(autonomy.motion().unwrap().pending(), 1);

    // scan finishes: the resume step takes over with a single primitive
    while autonomy.planner().active_step().unwrap().behavior == BehaviorKind::Scan {
        assert!(step(&mut autonomy).is_some());
        assert!(autonomy.motion().unwrap().pending() <= 1);
    }
    let active = autonomy.planner().active_step().unwrap();
    assert_eq!(active.note, "resume exploring");
    assert_eq!(autonomy.motion().unwrap().pending(), 1);
}
