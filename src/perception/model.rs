//! Spatial model: pose, sector memory, trajectory and sightings.

use super::sector::Sector;
use super::summary::{
    Breadcrumb, RelativeDirection, Sighting, SightingCategory, SpatialEvent, SpatialSummary,
};
use crate::config::SpatialConfig;
use crate::core::{BoundedRing, LightBumps, Pose, SensorSample, SharedClock};
use crate::events::EventPublisher;
use crate::utils::{normalize_angle_deg, wrap_angle_deg};
use crossbeam_channel::Receiver;

/// Relative bearing of a left/right bumper contact.
const BUMP_RELATIVE_ANGLE: f64 = 30.0;

/// Obstacle descriptors listed in a summary.
const SUMMARY_OBSTACLE_LIMIT: usize = 4;

/// Sightings listed in a summary.
const SUMMARY_SIGHTING_LIMIT: usize = 3;

/// Relative, dead-reckoned model of the robot's surroundings.
///
/// Sole owner and mutator of the pose, sectors, breadcrumbs and sightings.
pub struct SpatialModel {
    config: SpatialConfig,
    clock: SharedClock,
    sectors: Vec<Sector>,
    pose: Pose,
    breadcrumbs: BoundedRing<Breadcrumb>,
    sightings: BoundedRing<Sighting>,
    last_sensor: Option<SensorSample>,
    battery_percentage: Option<f64>,
    last_movement_at: u64,
    last_update: u64,
    /// None until the first summary goes out
    last_summary_at: Option<u64>,
    events: EventPublisher<SpatialEvent>,
}

impl SpatialModel {
    pub fn new(config: SpatialConfig, clock: SharedClock) -> Self {
        let now = clock.now_ms();
        let sector_count = config.sector_count.max(1);
        Self {
            sectors: (0..sector_count)
                .map(|_| Sector::new(config.note_limit))
                .collect(),
            pose: Pose::default(),
            breadcrumbs: BoundedRing::new(config.breadcrumb_limit),
            sightings: BoundedRing::new(config.sighting_limit),
            last_sensor: None,
            battery_percentage: None,
            last_movement_at: now,
            last_update: now,
            last_summary_at: None,
            events: EventPublisher::new(),
            config,
            clock,
        }
    }

    /// Subscribe to published summaries.
    pub fn subscribe(&mut self) -> Receiver<SpatialEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Motion
    // ========================================================================

    /// Integrate one realized move.
    ///
    /// Displacement follows the midpoint heading `heading + turn / 2`, which
    /// approximates the arc with its chord. Non-finite input is ignored.
    pub fn apply_motion(&mut self, distance_mm: f64, turn_deg: f64) {
        if !distance_mm.is_finite() || !turn_deg.is_finite() {
            log::debug!(
                "SpatialModel: ignoring non-finite motion ({}, {})",
                distance_mm,
                turn_deg
            );
            return;
        }

        let now = self.clock.now_ms();
        let mid_heading = (self.pose.heading + turn_deg / 2.0).to_radians();
        self.pose.x += mid_heading.cos() * distance_mm;
        self.pose.y += mid_heading.sin() * distance_mm;
        self.pose.heading = normalize_angle_deg(self.pose.heading + turn_deg);
        self.last_movement_at = now;

        if distance_mm.hypot(turn_deg) > self.config.breadcrumb_threshold {
            self.breadcrumbs.push(Breadcrumb {
                x: self.pose.x,
                y: self.pose.y,
                heading: self.pose.heading,
                timestamp: now,
            });
        }

        self.maybe_emit_summary(false);
    }

    // ========================================================================
    // Sensors
    // ========================================================================

    /// Fold one sensor sample into the model, field by field.
    pub fn ingest_sensors(&mut self, sample: &SensorSample) {
        self.last_sensor = Some(sample.clone());
        self.last_update = self.clock.now_ms();

        if let Some(battery) = sample.battery_percentage.filter(|b| b.is_finite()) {
            self.battery_percentage = Some(battery);
        }

        if sample.any_bump() {
            let relative = if sample.bump_left() {
                BUMP_RELATIVE_ANGLE
            } else {
                -BUMP_RELATIVE_ANGLE
            };
            self.mark_obstacle(relative, Some("contact"));
        }

        if sample.cliff_below(self.config.cliff_threshold) {
            self.mark_obstacle(0.0, Some("cliff"));
        }

        if let Some(bumps) = &sample.light_bumps {
            self.process_light_bumps(bumps);
        }

        if let Some(dirt) = sample.dirt_detect.filter(|d| *d > 0.0) {
            self.log_sighting(
                format!("dirt sensor spike ({})", dirt),
                SightingCategory::Maintenance,
            );
        }

        self.maybe_emit_summary(false);
    }

    fn process_light_bumps(&mut self, bumps: &LightBumps) {
        let threshold = self.config.light_proximity_threshold;
        let mut peak: Option<(&'static str, f64)> = None;

        for (channel, value) in bumps.channels() {
            if peak.is_none_or(|(_, best)| value > best) {
                peak = Some((channel.as_str(), value));
            }
            let relative = channel.relative_angle();
            if value > threshold {
                self.mark_obstacle(relative, Some(&format!("light-{}", channel.as_str())));
            }
            self.accumulate_light(relative, value);
        }

        if let Some((name, value)) = peak
            && value > threshold * 2.0
        {
            self.log_sighting(
                format!("bright return {} ({})", name, value.round()),
                SightingCategory::Vision,
            );
        }
    }

    /// Record an obstacle at `relative_angle` degrees from the current heading.
    pub fn mark_obstacle(&mut self, relative_angle: f64, note: Option<&str>) {
        if !relative_angle.is_finite() {
            return;
        }
        let now = self.clock.now_ms();
        let index = self.sector_index(self.pose.heading + relative_angle);
        self.sectors[index].mark(note, now);
        log::debug!(
            "SpatialModel: obstacle in sector {} ({})",
            index,
            note.unwrap_or("-")
        );
        self.maybe_emit_summary(false);
    }

    /// Fold a light reading into the sector at `relative_angle`.
    pub fn accumulate_light(&mut self, relative_angle: f64, value: f64) {
        if !relative_angle.is_finite() || !value.is_finite() {
            return;
        }
        let now = self.clock.now_ms();
        let index = self.sector_index(self.pose.heading + relative_angle);
        self.sectors[index].accumulate_light(value, now);
    }

    /// Append a sighting, evicting the oldest beyond capacity.
    pub fn log_sighting(&mut self, description: String, category: SightingCategory) {
        self.sightings.push(Sighting {
            description,
            category,
            timestamp: self.clock.now_ms(),
        });
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    fn sector_width(&self) -> f64 {
        360.0 / self.sectors.len() as f64
    }

    /// Sector holding the absolute angle `angle_deg`.
    pub fn sector_index(&self, angle_deg: f64) -> usize {
        let normalized = wrap_angle_deg(normalize_angle_deg(angle_deg));
        (normalized / self.sector_width()).floor() as usize % self.sectors.len()
    }

    /// Absolute center angle of sector `index`, in [0, 360).
    pub fn sector_center(&self, index: usize) -> f64 {
        let width = self.sector_width();
        index as f64 * width + width / 2.0
    }

    /// Direction of an absolute angle as seen from the current heading.
    pub fn relative_direction(&self, absolute_deg: f64) -> RelativeDirection {
        RelativeDirection::from_relative(normalize_angle_deg(absolute_deg - self.pose.heading))
    }

    // ========================================================================
    // Summary
    // ========================================================================

    /// Fixed-format situation report.
    pub fn describe_summary(&self) -> String {
        let now = self.clock.now_ms();
        let heading = wrap_angle_deg(self.pose.heading).round() as i64 % 360;
        let battery = self
            .battery_percentage
            .map(|b| format!("{}%", b))
            .unwrap_or_else(|| "unknown".to_string());

        let obstacles = self.obstacle_summary();
        let obstacles = if obstacles.is_empty() {
            "none observed".to_string()
        } else {
            obstacles.join(", ")
        };

        let sightings: Vec<String> = self
            .sightings
            .recent(SUMMARY_SIGHTING_LIMIT)
            .into_iter()
            .map(|s| s.description)
            .collect();
        let sightings = if sightings.is_empty() {
            "none".to_string()
        } else {
            sightings.join("; ")
        };

        let stopped_for = (now.saturating_sub(self.last_movement_at) as f64 / 1000.0).round();

        format!(
            "pose_mm: ({}, {}), heading: {}deg. battery: {}. recent_obstacles: {}. recent_sightings: {}. stopped_for: {}s.",
            self.pose.x.round() as i64,
            self.pose.y.round() as i64,
            heading,
            battery,
            obstacles,
            sightings,
            stopped_for as i64
        )
    }

    /// Up to four `label xN` entries, most hits first.
    ///
    /// Sectors sharing a direction label are summed; ties keep sector order.
    fn obstacle_summary(&self) -> Vec<String> {
        let mut counts: Vec<(RelativeDirection, u32)> = Vec::new();
        for (index, sector) in self.sectors.iter().enumerate() {
            if !sector.has_obstacle_memory() {
                continue;
            }
            let label = self.relative_direction(self.sector_center(index));
            match counts.iter_mut().find(|(l, _)| *l == label) {
                Some((_, count)) => *count += sector.obstacles,
                None => counts.push((label, sector.obstacles)),
            }
        }
        // sort_by is stable, so equal counts stay in first-seen order
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(SUMMARY_OBSTACLE_LIMIT)
            .map(|(label, count)| format!("{} x{}", label.as_str(), count))
            .collect()
    }

    /// Full summary payload as published to subscribers.
    pub fn summary_payload(&self) -> SpatialSummary {
        SpatialSummary {
            summary: self.describe_summary(),
            pose: self.pose,
            breadcrumbs: self.breadcrumbs.to_vec(),
            last_sensor: self.last_sensor.clone(),
            battery_percentage: self.battery_percentage,
            updated_at: self.last_update,
        }
    }

    /// Publish a summary now, bypassing the rate limit.
    pub fn force_emit_summary(&mut self) {
        self.maybe_emit_summary(true);
    }

    /// Publish at most once per `summary_interval_ms` unless forced.
    /// Updates in between are coalesced into the next summary.
    fn maybe_emit_summary(&mut self, force: bool) {
        let now = self.clock.now_ms();
        if !force
            && let Some(last) = self.last_summary_at
            && now.saturating_sub(last) < self.config.summary_interval_ms
        {
            return;
        }
        self.last_summary_at = Some(now);
        let payload = self.summary_payload();
        self.events.publish(SpatialEvent::Summary(Box::new(payload)));
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn sector(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index)
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.breadcrumbs.to_vec()
    }

    pub fn sightings(&self) -> Vec<Sighting> {
        self.sightings.to_vec()
    }

    pub fn battery_percentage(&self) -> Option<f64> {
        self.battery_percentage
    }

    pub fn last_sensor(&self) -> Option<&SensorSample> {
        self.last_sensor.as_ref()
    }

    pub fn last_movement_at(&self) -> u64 {
        self.last_movement_at
    }

    /// Cliff readings below this count as a drop-off.
    pub fn cliff_threshold(&self) -> f64 {
        self.config.cliff_threshold
    }
}
