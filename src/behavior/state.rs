//! Behavior names, parameters, bookkeeping and published snapshots.

use crate::core::{LightBumps, SensorSample};
use crate::error::{ChetanaError, Result};
use crate::motion::{MotionPrimitive, RealizedMotion};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of activities the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    /// Rest state; motion controller halted.
    #[default]
    Idle,
    /// Random forward moves with occasional turns.
    Wander,
    /// Hold a light-bump intensity on one side.
    WallFollow,
    /// Rotate in place a fixed number of steps, then resume.
    Scan,
    /// Alternate reversing and rotating until replaced.
    DockSeek,
    /// Three-primitive reflex escape, then resume.
    Avoid,
}

impl BehaviorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorKind::Idle => "idle",
            BehaviorKind::Wander => "wander",
            BehaviorKind::WallFollow => "wall_follow",
            BehaviorKind::Scan => "scan",
            BehaviorKind::DockSeek => "dock_seek",
            BehaviorKind::Avoid => "avoid",
        }
    }

    /// Whether a displaced behavior of this kind is worth resuming later.
    pub fn is_resumable(&self) -> bool {
        !matches!(self, BehaviorKind::Idle | BehaviorKind::Avoid)
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BehaviorKind {
    type Err = ChetanaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(BehaviorKind::Idle),
            "wander" => Ok(BehaviorKind::Wander),
            "wall_follow" => Ok(BehaviorKind::WallFollow),
            "scan" => Ok(BehaviorKind::Scan),
            "dock_seek" => Ok(BehaviorKind::DockSeek),
            "avoid" => Ok(BehaviorKind::Avoid),
            other => Err(ChetanaError::InvalidBehavior(other.to_string())),
        }
    }
}

/// Left or right, for wall sides and reflex directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// +1 for left (CCW), -1 for right.
    pub fn turn_sign(&self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

/// Optional per-behavior parameters; absent fields use engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorParams {
    /// Wall side for `wall_follow`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Rotation per scan step in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_size_deg: Option<f64>,
    /// Scan step count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,
    /// Side that triggered an `avoid` (None = unknown)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Side>,
    /// Longer reverse for cliff escapes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retreat: Option<bool>,
}

impl BehaviorParams {
    pub fn wall(side: Side) -> Self {
        Self {
            side: Some(side),
            ..Default::default()
        }
    }

    pub fn scan(turn_size_deg: f64, cycles: u32) -> Self {
        Self {
            turn_size_deg: Some(turn_size_deg),
            cycles: Some(cycles),
            ..Default::default()
        }
    }

    pub fn avoid(direction: Option<Side>, retreat: bool) -> Self {
        Self {
            direction,
            retreat: Some(retreat),
            ..Default::default()
        }
    }
}

/// Who asked for a behavior change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandSource {
    #[default]
    Planner,
    MissionPlanner,
    Reflex,
    Autonomy,
    BehaviorEngine,
    Auto,
    External,
}

impl CommandSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandSource::Planner => "planner",
            CommandSource::MissionPlanner => "mission-planner",
            CommandSource::Reflex => "reflex",
            CommandSource::Autonomy => "autonomy",
            CommandSource::BehaviorEngine => "behavior-engine",
            CommandSource::Auto => "auto",
            CommandSource::External => "external",
        }
    }
}

/// Bookkeeping attached to a behavior change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorMeta {
    pub source: CommandSource,
    pub reason: String,
    /// Stamped by the engine when the behavior becomes active
    pub started_at: u64,
    /// Push the displaced behavior for later resumption
    #[serde(default)]
    pub stack: bool,
    /// Update bookkeeping without issuing a primitive
    #[serde(default)]
    pub skip_drive: bool,
}

impl BehaviorMeta {
    pub fn new(source: CommandSource, reason: impl Into<String>) -> Self {
        Self {
            source,
            reason: reason.into(),
            ..Default::default()
        }
    }

    pub fn stacked(mut self) -> Self {
        self.stack = true;
        self
    }

    pub fn without_drive(mut self) -> Self {
        self.skip_drive = true;
        self
    }
}

/// Progress fields of multi-primitive behaviors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SequenceState {
    /// Scan rotations issued so far
    pub completed_turns: u32,
    /// Dock-seek phase counter (0..6)
    pub phase: u8,
    /// Resume the stacked behavior once the controller drains
    pub awaiting_resume: bool,
    pub resume_reason: Option<String>,
    /// Most recent primitive, for status reporting
    pub last_planned: Option<MotionPrimitive>,
}

/// The single active behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActiveBehavior {
    pub kind: BehaviorKind,
    pub params: BehaviorParams,
    pub meta: BehaviorMeta,
    pub sequence: SequenceState,
}

/// A behavior suspended by a reflex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackEntry {
    pub kind: BehaviorKind,
    pub params: BehaviorParams,
    pub meta: BehaviorMeta,
}

/// Manual drive actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualAction {
    Forward,
    Backward,
    Left,
    Right,
}

impl ManualAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManualAction::Forward => "forward",
            ManualAction::Backward => "backward",
            ManualAction::Left => "left",
            ManualAction::Right => "right",
        }
    }
}

impl FromStr for ManualAction {
    type Err = ChetanaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(ManualAction::Forward),
            "backward" => Ok(ManualAction::Backward),
            "left" => Ok(ManualAction::Left),
            "right" => Ok(ManualAction::Right),
            other => Err(ChetanaError::InvalidCommand(format!(
                "unknown manual action '{}'",
                other
            ))),
        }
    }
}

/// Last manual command, as reported in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ManualCommand {
    pub action: ManualAction,
    pub value: f64,
    pub issued_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflexKind {
    Bump,
    Cliff,
}

impl ReflexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReflexKind::Bump => "bump",
            ReflexKind::Cliff => "cliff",
        }
    }
}

/// One fired reflex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReflexRecord {
    pub kind: ReflexKind,
    /// Bumper side; None for cliffs or an unknown side
    pub direction: Option<Side>,
    pub at: u64,
}

/// Completed motion cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleReport {
    pub behavior: BehaviorKind,
    pub timestamp: u64,
    pub movement: RealizedMotion,
}

/// Sensor fields shown in status snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CondensedSensors {
    pub bump_left: Option<bool>,
    pub bump_right: Option<bool>,
    pub light_bumps: Option<LightBumps>,
    pub dirt_detect: Option<f64>,
}

impl From<&SensorSample> for CondensedSensors {
    fn from(sample: &SensorSample) -> Self {
        Self {
            bump_left: sample.bump_left,
            bump_right: sample.bump_right,
            light_bumps: sample.light_bumps,
            dirt_detect: sample.dirt_detect,
        }
    }
}

/// Read-only projection of the engine's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorSnapshot {
    pub enabled: bool,
    pub behavior: BehaviorKind,
    pub params: BehaviorParams,
    pub meta: BehaviorMeta,
    pub manual_override: bool,
    pub last_manual_command: Option<ManualCommand>,
    pub last_cycle_at: Option<u64>,
    pub stack_depth: usize,
    pub recent_reflexes: Vec<ReflexRecord>,
    pub latest_sensors: Option<CondensedSensors>,
    /// Why this snapshot was published
    pub reason: String,
    /// Published by a halt
    pub halted: bool,
}

/// Events published by the behavior engine.
#[derive(Debug, Clone)]
pub enum BehaviorEvent {
    StateChanged(Box<BehaviorSnapshot>),
    Reflex(ReflexRecord),
    CycleComplete(CycleReport),
    ManualOverride(ManualCommand),
    /// Absorbed anomaly worth surfacing (unknown behavior names)
    Log(String),
}
