//! Mission planner: goal text in, timed behavior steps out.

use super::actuator::BehaviorActuator;
use super::parser::{extract_duration, parse_goal};
use super::step::{
    GoalOptions, GoalRecord, MissionEvent, MissionSnapshot, MissionStep, StepPlan, StepSource,
    StepStatus,
};
use crate::behavior::{
    BehaviorKind, BehaviorMeta, BehaviorParams, BehaviorSnapshot, CommandSource, ReflexRecord,
};
use crate::config::MissionConfig;
use crate::core::{BoundedRing, SharedClock};
use crate::events::EventPublisher;
use crossbeam_channel::Receiver;
use std::collections::VecDeque;

/// History and goal entries included in snapshots.
const SNAPSHOT_HISTORY_LIMIT: usize = 8;

/// Queue entries shown by `describe_status`.
const STATUS_QUEUE_PREVIEW: usize = 3;

/// Runs at most one [`MissionStep`] at a time against a [`BehaviorActuator`].
///
/// Scheduling is cooperative: deadlines are only checked in [`tick`], which
/// the owner calls whenever the behavior engine completes a motion cycle.
/// When nothing is queued, auto-explore keeps the robot moving.
///
/// [`tick`]: MissionPlanner::tick
pub struct MissionPlanner {
    config: MissionConfig,
    clock: SharedClock,
    queue: VecDeque<MissionStep>,
    active: Option<MissionStep>,
    history: BoundedRing<MissionStep>,
    goal_history: BoundedRing<GoalRecord>,
    current_goal: Option<String>,
    running: bool,
    auto_explore: bool,
    next_auto_explore_at: u64,
    next_step_id: u64,
    events: EventPublisher<MissionEvent>,
}

impl MissionPlanner {
    pub fn new(config: MissionConfig, clock: SharedClock) -> Self {
        let now = clock.now_ms();
        Self {
            queue: VecDeque::new(),
            active: None,
            history: BoundedRing::new(config.history_limit),
            goal_history: BoundedRing::new(config.goal_history_limit),
            current_goal: None,
            running: false,
            auto_explore: config.auto_explore,
            next_auto_explore_at: now,
            next_step_id: 1,
            events: EventPublisher::new(),
            config,
            clock,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<MissionEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Begin scheduling.
    pub fn start(&mut self, actuator: &mut dyn BehaviorActuator) {
        if self.running {
            return;
        }
        self.running = true;
        log::info!("MissionPlanner: started");
        self.tick(actuator);
    }

    /// Stop scheduling; the active step fails and the queue is dropped.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.finish_active("failed:planner-stopped");
        if !self.queue.is_empty() {
            log::info!("MissionPlanner: dropping {} queued steps", self.queue.len());
        }
        self.queue.clear();
        log::info!("MissionPlanner: stopped");
        self.publish("planner-stopped");
    }

    /// Drop every queued step; the active step keeps running.
    pub fn clear_queue(&mut self, reason: &str) {
        self.queue.clear();
        self.publish(reason);
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Accept a free-text goal.
    ///
    /// Unless `options.append` is set, the queue is replaced, the active step
    /// ends with result `replaced` and the actuator is halted.
    pub fn ingest_goal(
        &mut self,
        text: &str,
        options: GoalOptions,
        actuator: &mut dyn BehaviorActuator,
    ) {
        let goal = text.trim();
        if goal.is_empty() {
            log::warn!("MissionPlanner: ignoring empty goal");
            return;
        }

        let now = self.clock.now_ms();
        self.current_goal = Some(goal.to_string());
        self.goal_history.push(GoalRecord {
            text: goal.to_string(),
            at: now,
            source: options.source.clone(),
        });

        let plans = parse_goal(goal, self.config.default_goal_duration_ms);

        if !options.append {
            self.queue.clear();
            if self.active.is_some() {
                self.complete_step("replaced", actuator);
            }
            actuator.halt("new-goal");
        }

        for plan in plans {
            let step = self.create_step(plan, StepSource::Goal, false);
            self.queue.push_back(step);
        }
        log::info!(
            "MissionPlanner: goal '{}' from {} ({} queued)",
            goal,
            options.source,
            self.queue.len()
        );
        self.publish("new-goal");
        self.tick(actuator);
    }

    /// Accept a short directive.
    ///
    /// `clear` empties the queue, `pause`/`hold` puts an idle step in front,
    /// anything else is parsed as a goal and appended (or prepended when
    /// `prepend` is set or the text starts with `now`).
    pub fn ingest_directive(
        &mut self,
        text: &str,
        prepend: bool,
        actuator: &mut dyn BehaviorActuator,
    ) {
        let directive = text.trim();
        if directive.is_empty() {
            return;
        }
        let lower = directive.to_lowercase();

        if lower.starts_with("clear") {
            self.clear_queue("directive-clear");
            return;
        }

        if lower.starts_with("pause") || lower.starts_with("hold") {
            let duration = extract_duration(&lower).unwrap_or(self.config.pause_duration_ms);
            let step = self.create_step(
                StepPlan::new(BehaviorKind::Idle, duration, "pause directive"),
                StepSource::Directive,
                false,
            );
            self.queue.push_front(step);
            self.publish("directive-pause");
            self.tick(actuator);
            return;
        }

        let steps: Vec<MissionStep> = parse_goal(directive, self.config.default_goal_duration_ms)
            .into_iter()
            .map(|plan| self.create_step(plan, StepSource::Directive, false))
            .collect();

        if prepend || lower.starts_with("now") {
            for step in steps.into_iter().rev() {
                self.queue.push_front(step);
            }
        } else {
            self.queue.extend(steps);
        }
        self.publish("directive");
        self.tick(actuator);
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Scheduling heartbeat.
    ///
    /// Expires the active step at its deadline, then starts the next queued
    /// step. With nothing queued and auto-explore on, a default step is
    /// synthesized once the cooldown has elapsed; between pulses the default
    /// behavior is commanded directly, without a tracked step.
    pub fn tick(&mut self, actuator: &mut dyn BehaviorActuator) {
        if !self.running {
            return;
        }
        let now = self.clock.now_ms();

        if let Some(deadline) = self.active.as_ref().and_then(|s| s.deadline)
            && now >= deadline
        {
            self.complete_step("deadline", actuator);
        }

        if self.active.is_some() {
            return;
        }

        if self.queue.is_empty() && self.auto_explore && now >= self.next_auto_explore_at {
            let plan = StepPlan::new(
                self.config.default_auto_behavior,
                self.config.auto_step_duration_ms,
                "auto-explore pulse",
            );
            let step = self.create_step(plan, StepSource::Auto, true);
            self.queue.push_back(step);
            self.next_auto_explore_at = now.saturating_add(self.config.auto_explore_cooldown_ms);
        }

        if let Some(next) = self.queue.pop_front() {
            self.start_step(next, actuator);
        } else if self.auto_explore {
            let current = actuator.current_behavior();
            // leave a running default or an in-flight reflex alone
            if current != self.config.default_auto_behavior && current != BehaviorKind::Avoid {
                actuator.set_behavior(
                    self.config.default_auto_behavior,
                    BehaviorParams::default(),
                    BehaviorMeta::new(CommandSource::Auto, "idle-auto"),
                );
            }
        }
    }

    /// Complete the active step from outside, then reschedule.
    pub fn mark_step_complete(&mut self, reason: &str, actuator: &mut dyn BehaviorActuator) {
        self.complete_step(reason, actuator);
        self.tick(actuator);
    }

    /// Fail the active step with `failed:<reason>`, then reschedule.
    pub fn fail_active_step(&mut self, reason: &str, actuator: &mut dyn BehaviorActuator) {
        self.complete_step(&format!("failed:{}", reason), actuator);
        self.tick(actuator);
    }

    fn create_step(&mut self, plan: StepPlan, source: StepSource, auto: bool) -> MissionStep {
        let id = self.next_step_id;
        self.next_step_id += 1;
        MissionStep {
            id,
            behavior: plan.behavior,
            params: plan.params,
            duration_ms: plan.duration_ms,
            note: plan.note,
            source,
            status: StepStatus::Queued,
            created_at: self.clock.now_ms(),
            started_at: None,
            completed_at: None,
            deadline: None,
            result: None,
            auto,
            last_reflex: None,
        }
    }

    fn start_step(&mut self, mut step: MissionStep, actuator: &mut dyn BehaviorActuator) {
        let now = self.clock.now_ms();
        step.status = StepStatus::Active;
        step.started_at = Some(now);
        step.deadline = (step.duration_ms > 0).then(|| now.saturating_add(step.duration_ms));

        let reason = if step.note.is_empty() {
            step.source.as_str().to_string()
        } else {
            step.note.clone()
        };
        let (kind, params, id) = (step.behavior, step.params.clone(), step.id);
        log::info!(
            "MissionPlanner: step {} started ({} for {}ms, {})",
            id,
            kind,
            step.duration_ms,
            reason
        );
        self.active = Some(step);

        actuator.set_behavior(
            kind,
            params,
            BehaviorMeta::new(CommandSource::MissionPlanner, reason),
        );
        self.publish("step-started");
    }

    /// Move the active step to history with `result`.
    fn finish_active(&mut self, result: &str) {
        let Some(mut step) = self.active.take() else {
            return;
        };
        step.status = if result.starts_with("failed") {
            StepStatus::Failed
        } else {
            StepStatus::Completed
        };
        step.completed_at = Some(self.clock.now_ms());
        step.result = Some(result.to_string());
        log::info!(
            "MissionPlanner: step {} ({}) finished: {}",
            step.id,
            step.behavior,
            result
        );
        self.history.push(step);
    }

    /// Finish the active step; with nothing queued, fall back to the
    /// default behavior.
    fn complete_step(&mut self, result: &str, actuator: &mut dyn BehaviorActuator) {
        self.finish_active(result);
        if self.queue.is_empty() {
            actuator.set_behavior(
                self.config.default_auto_behavior,
                BehaviorParams::default(),
                BehaviorMeta::new(CommandSource::MissionPlanner, "step-finished"),
            );
        }
        self.publish(&format!("step-{}", result));
    }

    // ========================================================================
    // Behavior engine observations
    // ========================================================================

    /// Attach a reflex to the active step; informational only.
    pub fn on_reflex(&mut self, reflex: ReflexRecord) {
        if !self.running {
            return;
        }
        let Some(step) = self.active.as_mut() else {
            return;
        };
        step.last_reflex = Some(reflex);
        self.publish("reflex");
    }

    /// A finished scan completes an active scan step.
    pub fn on_behavior_state(
        &mut self,
        snapshot: &BehaviorSnapshot,
        actuator: &mut dyn BehaviorActuator,
    ) {
        if !self.running {
            return;
        }
        let scanning = self
            .active
            .as_ref()
            .is_some_and(|s| s.behavior == BehaviorKind::Scan);
        if scanning && snapshot.reason.contains("scan-finished") {
            self.mark_step_complete("behavior-finished", actuator);
        }
    }

    // ========================================================================
    // Status
    // ========================================================================

    fn publish(&mut self, reason: &str) {
        let snapshot = self.snapshot_with(reason);
        self.events.publish(MissionEvent::Updated(Box::new(snapshot)));
    }

    fn snapshot_with(&self, reason: &str) -> MissionSnapshot {
        MissionSnapshot {
            running: self.running,
            current_goal: self.current_goal.clone(),
            active_step: self.active.clone(),
            queue: self.queue.iter().cloned().collect(),
            history: self.history.recent(SNAPSHOT_HISTORY_LIMIT),
            auto_explore: self.auto_explore,
            next_auto_explore_at: self.next_auto_explore_at,
            goal_history: self.goal_history.recent(SNAPSHOT_HISTORY_LIMIT),
            reason: reason.to_string(),
        }
    }

    pub fn status_snapshot(&self) -> MissionSnapshot {
        self.snapshot_with("status")
    }

    /// One-line status, e.g.
    /// `goal: patrol. active_step: wander (until 9s). queue: empty. auto_explore: true`.
    pub fn describe_status(&self) -> String {
        let now = self.clock.now_ms();
        let active = match &self.active {
            Some(step) => match step.deadline {
                Some(deadline) => {
                    let remaining = (deadline as i64 - now as i64) as f64 / 1000.0;
                    format!("{} (until {}s)", step.behavior, remaining.round() as i64)
                }
                None => step.behavior.to_string(),
            },
            None => "idle".to_string(),
        };
        let queue = if self.queue.is_empty() {
            "empty".to_string()
        } else {
            self.queue
                .iter()
                .take(STATUS_QUEUE_PREVIEW)
                .map(|s| s.behavior.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        };
        format!(
            "goal: {}. active_step: {}. queue: {}. auto_explore: {}",
            self.current_goal.as_deref().unwrap_or("none"),
            active,
            queue,
            self.auto_explore
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn active_step(&self) -> Option<&MissionStep> {
        self.active.as_ref()
    }

    pub fn queue(&self) -> impl Iterator<Item = &MissionStep> {
        self.queue.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn history(&self) -> Vec<MissionStep> {
        self.history.to_vec()
    }

    pub fn goal_history(&self) -> Vec<GoalRecord> {
        self.goal_history.to_vec()
    }

    pub fn current_goal(&self) -> Option<&str> {
        self.current_goal.as_deref()
    }

    pub fn auto_explore(&self) -> bool {
        self.auto_explore
    }

    pub fn set_auto_explore(&mut self, enabled: bool) {
        self.auto_explore = enabled;
        self.publish(if enabled {
            "auto-explore-on"
        } else {
            "auto-explore-off"
        });
    }

    pub fn next_auto_explore_at(&self) -> u64 {
        self.next_auto_explore_at
    }
}
