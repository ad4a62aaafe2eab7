//! Keyword goal parser.
//!
//! Matching is case-insensitive and first-match-wins in a fixed priority
//! order; reordering the checks changes which behavior an ambiguous phrase
//! selects ("scan then explore" is a scan, not a patrol).

use super::step::StepPlan;
use crate::behavior::{BehaviorKind, BehaviorParams, Side};
use regex::Regex;
use std::sync::LazyLock;

static SECONDS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(seconds|second|sec|s)").unwrap());

static MINUTES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(minutes|minute|min)").unwrap());

const DOCK_MIN_DURATION_MS: u64 = 20_000;
const SCAN_MIN_DURATION_MS: u64 = 8_000;
const IDLE_MIN_DURATION_MS: u64 = 5_000;

const GOAL_SCAN_TURN_DEG: f64 = 60.0;
const GOAL_SCAN_CYCLES: u32 = 6;

/// Duration named in `text`, in milliseconds.
///
/// Seconds are tried before minutes. A zero or unparseable count is
/// treated as no duration.
pub fn extract_duration(text: &str) -> Option<u64> {
    let scaled = |re: &Regex, scale: u64| {
        re.captures(text)
            .and_then(|caps| caps[1].parse::<u64>().ok())
            .map(|n| n.saturating_mul(scale))
    };
    scaled(&SECONDS_PATTERN, 1000)
        .or_else(|| scaled(&MINUTES_PATTERN, 60_000))
        .filter(|ms| *ms > 0)
}

/// Break goal text into step plans.
///
/// `default_duration_ms` applies when the text names no duration.
pub fn parse_goal(text: &str, default_duration_ms: u64) -> Vec<StepPlan> {
    let lower = text.to_lowercase();
    let has = |needle: &str| lower.contains(needle);
    let duration = extract_duration(text).unwrap_or(default_duration_ms);

    if has("dock") || has("charge") || has("base") {
        return vec![StepPlan::new(
            BehaviorKind::DockSeek,
            duration.max(DOCK_MIN_DURATION_MS),
            "search for dock",
        )];
    }

    if has("wall") {
        let side = if has("right") { Side::Right } else { Side::Left };
        return vec![
            StepPlan::new(
                BehaviorKind::WallFollow,
                duration,
                format!("follow {} wall", side.as_str()),
            )
            .with_params(BehaviorParams::wall(side)),
        ];
    }

    if has("scan") || has("inspect") || has("look around") {
        let mut steps = vec![
            StepPlan::new(
                BehaviorKind::Scan,
                duration.max(SCAN_MIN_DURATION_MS),
                "slow scan",
            )
            .with_params(BehaviorParams::scan(GOAL_SCAN_TURN_DEG, GOAL_SCAN_CYCLES)),
        ];
        if has("explore") || has("then") || !has("stop") {
            steps.push(StepPlan::new(
                BehaviorKind::Wander,
                duration,
                "resume exploring",
            ));
        }
        return steps;
    }

    if has("patrol") || has("explore") || has("wander") {
        return vec![StepPlan::new(BehaviorKind::Wander, duration, "explore area")];
    }

    if has("idle") || has("wait") || has("hold position") {
        return vec![StepPlan::new(
            BehaviorKind::Idle,
            duration.max(IDLE_MIN_DURATION_MS),
            "hold still",
        )];
    }

    // no phototaxis yet; wander is the closest proxy
    if has("follow") && has("light") {
        return vec![StepPlan::new(
            BehaviorKind::Wander,
            duration,
            "approach bright area",
        )];
    }

    vec![StepPlan::new(BehaviorKind::Wander, duration, "default explore")]
}
