//! Mission steps, goal records and published snapshots.

use crate::behavior::{BehaviorKind, BehaviorParams, ReflexRecord};
use serde::Serialize;

/// Lifecycle of a step: queued → active → completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Queued,
    Active,
    Completed,
    Failed,
}

/// Where a step came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSource {
    Goal,
    Directive,
    Auto,
}

impl StepSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepSource::Goal => "goal",
            StepSource::Directive => "directive",
            StepSource::Auto => "auto",
        }
    }
}

/// One scheduled unit of mission work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionStep {
    pub id: u64,
    pub behavior: BehaviorKind,
    pub params: BehaviorParams,
    pub duration_ms: u64,
    pub note: String,
    pub source: StepSource,
    pub status: StepStatus,
    pub created_at: u64,
    pub started_at: Option<u64>,
    pub completed_at: Option<u64>,
    /// `started_at + duration_ms`; None for zero-length steps
    pub deadline: Option<u64>,
    /// `deadline`, `replaced`, `behavior-finished`, `failed:<reason>`, ...
    pub result: Option<String>,
    /// Synthesized by auto-explore
    pub auto: bool,
    /// Latest reflex seen while active (informational)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reflex: Option<ReflexRecord>,
}

/// Step contents before an id and timestamps are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPlan {
    pub behavior: BehaviorKind,
    pub params: BehaviorParams,
    pub duration_ms: u64,
    pub note: String,
}

impl StepPlan {
    pub fn new(behavior: BehaviorKind, duration_ms: u64, note: impl Into<String>) -> Self {
        Self {
            behavior,
            params: BehaviorParams::default(),
            duration_ms,
            note: note.into(),
        }
    }

    pub fn with_params(mut self, params: BehaviorParams) -> Self {
        self.params = params;
        self
    }
}

/// Accepted goal text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalRecord {
    pub text: String,
    pub at: u64,
    /// Free-form origin label (operator, llm, chat, ...)
    pub source: String,
}

/// Options for [`ingest_goal`](super::MissionPlanner::ingest_goal).
#[derive(Debug, Clone)]
pub struct GoalOptions {
    /// Keep the current queue and active step
    pub append: bool,
    pub source: String,
}

impl Default for GoalOptions {
    fn default() -> Self {
        Self {
            append: false,
            source: "operator".to_string(),
        }
    }
}

impl GoalOptions {
    pub fn append() -> Self {
        Self {
            append: true,
            ..Default::default()
        }
    }
}

/// Read-only projection of the planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionSnapshot {
    pub running: bool,
    pub current_goal: Option<String>,
    pub active_step: Option<MissionStep>,
    pub queue: Vec<MissionStep>,
    /// Most recent finished steps, oldest first
    pub history: Vec<MissionStep>,
    pub auto_explore: bool,
    pub next_auto_explore_at: u64,
    pub goal_history: Vec<GoalRecord>,
    /// Why this snapshot was published
    pub reason: String,
}

#[derive(Debug, Clone)]
pub enum MissionEvent {
    Updated(Box<MissionSnapshot>),
}
