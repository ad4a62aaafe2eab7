//! Motion-primitive generators, one per behavior.
//!
//! These are pure functions of their inputs; the engine owns the
//! sequencing state and feeds it in.

use super::state::Side;
use crate::core::{LightBumps, LightChannel};
use crate::motion::MotionPrimitive;
use rand::Rng;

// Wander
const WANDER_MIN_MM: f64 = 180.0;
const WANDER_MAX_MM: f64 = 340.0;
const WANDER_MAX_TURN_DEG: f64 = 60.0;
const WANDER_TURN_PROBABILITY: f64 = 0.35;

// Wall follow
const WALL_FOLLOW_GAIN: f64 = 0.05;
const WALL_FOLLOW_MAX_TURN_DEG: f64 = 25.0;
/// Readings closer than this count as balanced (no wall on either side)
const WALL_BALANCE_BAND: f64 = 40.0;
const WALL_BIAS_DEG: f64 = 10.0;
const WALL_FOLLOW_STEP_MM: f64 = 160.0;

// Dock seek
const DOCK_REVERSE_MM: f64 = 120.0;
const DOCK_ROTATE_DEG: f64 = 45.0;
pub const DOCK_PHASES: u8 = 6;

// Avoid
const AVOID_RETREAT_MM: f64 = 150.0;
const CLIFF_RETREAT_MM: f64 = 200.0;
const AVOID_TURN_DEG: f64 = 60.0;
const AVOID_ADVANCE_MM: f64 = 150.0;

/// Random forward move; turns when forced or with 35% probability.
pub fn wander<R: Rng>(rng: &mut R, force_turn: bool, speed: f64) -> MotionPrimitive {
    let distance = rng.random_range(WANDER_MIN_MM..=WANDER_MAX_MM);
    let turn = if force_turn || rng.random_bool(WANDER_TURN_PROBABILITY) {
        rng.random_range(-WANDER_MAX_TURN_DEG..=WANDER_MAX_TURN_DEG)
    } else {
        0.0
    };
    MotionPrimitive::new(distance, turn, speed)
}

/// Proportional step that holds `target` intensity on the followed side.
///
/// The proportional term is the same for either side: a weak reading turns
/// left, a strong one turns right. When both sides read about the same and
/// the step is not forced, a fixed bias toward the followed side keeps the
/// robot from drifting into open space.
pub fn wall_follow(
    side: Side,
    bumps: &LightBumps,
    target: f64,
    force: bool,
    speed: f64,
) -> MotionPrimitive {
    let left = bumps.value_or_zero(LightChannel::CenterLeft)
        + bumps.value_or_zero(LightChannel::FrontLeft);
    let right = bumps.value_or_zero(LightChannel::CenterRight)
        + bumps.value_or_zero(LightChannel::FrontRight);

    let followed = match side {
        Side::Left => left,
        Side::Right => right,
    };
    let error = target - followed;
    let mut turn =
        (error * WALL_FOLLOW_GAIN).clamp(-WALL_FOLLOW_MAX_TURN_DEG, WALL_FOLLOW_MAX_TURN_DEG);

    if (left - right).abs() < WALL_BALANCE_BAND && !force {
        turn += side.turn_sign() * WALL_BIAS_DEG;
    }

    MotionPrimitive::new(WALL_FOLLOW_STEP_MM, turn, speed)
}

/// Rotation-in-place scan step.
pub fn scan_step(turn_deg: f64, rotate_speed: f64) -> MotionPrimitive {
    MotionPrimitive::new(0.0, turn_deg, rotate_speed)
}

/// Dock-seek step for `phase`: even phases reverse, odd phases rotate.
pub fn dock_seek(phase: u8, wander_speed: f64, rotate_speed: f64) -> MotionPrimitive {
    if phase % 2 == 0 {
        MotionPrimitive::new(-DOCK_REVERSE_MM, 0.0, wander_speed)
    } else {
        MotionPrimitive::new(0.0, DOCK_ROTATE_DEG, rotate_speed)
    }
}

/// Retreat, rotate away from the offending side, advance.
pub fn avoid_sequence(
    direction: Option<Side>,
    retreat: bool,
    wander_speed: f64,
    rotate_speed: f64,
) -> [MotionPrimitive; 3] {
    // A left contact turns right (negative), anything else turns left.
    let turn = match direction {
        Some(Side::Left) => -AVOID_TURN_DEG,
        _ => AVOID_TURN_DEG,
    };
    let reverse = if retreat {
        CLIFF_RETREAT_MM
    } else {
        AVOID_RETREAT_MM
    };
    [
        MotionPrimitive::new(-reverse, 0.0, wander_speed),
        MotionPrimitive::new(0.0, turn, rotate_speed),
        MotionPrimitive::new(AVOID_ADVANCE_MM, 0.0, wander_speed),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_wander_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut straight = 0;
        for _ in 0..500 {
            let p = wander(&mut rng, false, 160.0);
            assert!((WANDER_MIN_MM..=WANDER_MAX_MM).contains(&p.distance_mm));
            assert!(p.turn_deg.abs() <= WANDER_MAX_TURN_DEG);
            if p.turn_deg == 0.0 {
                straight += 1;
            }
        }
        // roughly 65% straight
        assert!(straight > 250 && straight < 400, "straight = {}", straight);
    }

    #[test]
    fn test_wander_forced_turn_is_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let p = wander(&mut rng, true, 160.0);
            assert!(p.turn_deg.abs() <= WANDER_MAX_TURN_DEG);
        }
    }

    #[test]
    fn test_wall_follow_weak_left_wall_steers_left() {
        let bumps = LightBumps {
            center_left: Some(20.0),
            front_left: Some(30.0),
            center_right: Some(200.0),
            ..Default::default()
        };
        // error = 250 - 50 = 200 → 10°, sides unbalanced so no bias
        let p = wall_follow(Side::Left, &bumps, 250.0, false, 160.0);
        assert_relative_eq!(p.turn_deg, 10.0, epsilon = 1e-9);
        assert_relative_eq!(p.distance_mm, WALL_FOLLOW_STEP_MM);
    }

    #[test]
    fn test_wall_follow_clamps_and_biases() {
        // Nothing seen anywhere: error 250 → 12.5°, balanced → +10 bias
        let p = wall_follow(Side::Left, &LightBumps::default(), 250.0, false, 160.0);
        assert_relative_eq!(p.turn_deg, 22.5, epsilon = 1e-9);

        // Forced steps skip the bias
        let p = wall_follow(Side::Left, &LightBumps::default(), 250.0, true, 160.0);
        assert_relative_eq!(p.turn_deg, 12.5, epsilon = 1e-9);

        // Very strong right wall: error -750 → clamp -25
        let bumps = LightBumps {
            center_right: Some(500.0),
            front_right: Some(500.0),
            ..Default::default()
        };
        let p = wall_follow(Side::Right, &bumps, 250.0, false, 160.0);
        assert_relative_eq!(p.turn_deg, -25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_wall_follow_right_uses_unmirrored_gain() {
        // right 50 vs target 250: error 200 → +10, imbalance 250 → no bias
        let bumps = LightBumps {
            center_right: Some(50.0),
            center_left: Some(300.0),
            ..Default::default()
        };
        let p = wall_follow(Side::Right, &bumps, 250.0, false, 160.0);
        assert_relative_eq!(p.turn_deg, 10.0, epsilon = 1e-9);

        // balanced and unlit: +12.5 gain, -10 bias toward the right wall
        let p = wall_follow(Side::Right, &LightBumps::default(), 250.0, false, 160.0);
        assert_relative_eq!(p.turn_deg, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_dock_seek_alternates() {
        let a = dock_seek(0, 160.0, 120.0);
        let b = dock_seek(1, 160.0, 120.0);
        assert_relative_eq!(a.distance_mm, -120.0);
        assert_relative_eq!(a.turn_deg, 0.0);
        assert_relative_eq!(b.distance_mm, 0.0);
        assert_relative_eq!(b.turn_deg, 45.0);
    }

    #[test]
    fn test_avoid_sequence_turns_away() {
        let seq = avoid_sequence(Some(Side::Left), false, 160.0, 120.0);
        assert_relative_eq!(seq[0].distance_mm, -150.0);
        assert_relative_eq!(seq[1].turn_deg, -60.0);
        assert_relative_eq!(seq[2].distance_mm, 150.0);

        let seq = avoid_sequence(Some(Side::Right), true, 160.0, 120.0);
        assert_relative_eq!(seq[0].distance_mm, -200.0);
        assert_relative_eq!(seq[1].turn_deg, 60.0);
    }
}
