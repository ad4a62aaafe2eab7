//! Configuration loading for Chetana
//!
//! Every field carries a named default, so an empty TOML document (or no
//! file at all) yields the stock tuning for a Roomba-class robot.

use crate::behavior::BehaviorKind;
use crate::error::{ChetanaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ChetanaConfig {
    #[serde(default)]
    pub spatial: SpatialConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub mission: MissionConfig,
}

/// Spatial model tuning
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SpatialConfig {
    /// Number of angular sectors around the robot (default: 12)
    #[serde(default = "default_sector_count")]
    pub sector_count: usize,

    /// Breadcrumb ring capacity (default: 60)
    #[serde(default = "default_breadcrumb_limit")]
    pub breadcrumb_limit: usize,

    /// Sighting ring capacity (default: 30)
    #[serde(default = "default_sighting_limit")]
    pub sighting_limit: usize,

    /// Annotation notes kept per sector (default: 5)
    #[serde(default = "default_note_limit")]
    pub note_limit: usize,

    /// Minimum spacing between published summaries in ms (default: 1500)
    #[serde(default = "default_summary_interval_ms")]
    pub summary_interval_ms: u64,

    /// hypot(distance_mm, turn_deg) above which a breadcrumb is dropped (default: 20)
    #[serde(default = "default_breadcrumb_threshold")]
    pub breadcrumb_threshold: f64,

    /// Cliff readings below this are dangerous (default: 100)
    #[serde(default = "default_cliff_threshold")]
    pub cliff_threshold: f64,

    /// Light-bump readings above this count as proximity hits (default: 120)
    #[serde(default = "default_light_proximity_threshold")]
    pub light_proximity_threshold: f64,
}

/// Behavior engine tuning
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BehaviorConfig {
    /// Behavior started when autonomy is enabled from idle (default: wander)
    #[serde(default = "default_behavior")]
    pub default_behavior: BehaviorKind,

    /// Minimum spacing between bump reflexes in ms (default: 600)
    #[serde(default = "default_bump_debounce_ms")]
    pub bump_debounce_ms: u64,

    /// Reflex history capacity (default: 8)
    #[serde(default = "default_reflex_history_limit")]
    pub reflex_history_limit: usize,

    /// Speed for translating primitives in mm/s (default: 160)
    #[serde(default = "default_wander_speed")]
    pub wander_speed: f64,

    /// Speed for rotate-in-place primitives in mm/s (default: 120)
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f64,

    /// Light-bump intensity wall following tries to hold (default: 250)
    #[serde(default = "default_wall_target_intensity")]
    pub wall_target_intensity: f64,

    /// Default scan rotation step in degrees (default: 60)
    #[serde(default = "default_scan_turn_deg")]
    pub scan_turn_deg: f64,

    /// Default scan rotation count (default: 6)
    #[serde(default = "default_scan_cycles")]
    pub scan_cycles: u32,

    /// Seed for wander randomness; None draws from the OS
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Mission planner tuning
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MissionConfig {
    /// Synthesize wander steps when idle (default: true)
    #[serde(default = "default_auto_explore")]
    pub auto_explore: bool,

    /// Minimum spacing between synthesized steps in ms (default: 20000)
    #[serde(default = "default_auto_explore_cooldown_ms")]
    pub auto_explore_cooldown_ms: u64,

    /// Duration of a synthesized step in ms (default: 15000)
    #[serde(default = "default_auto_step_duration_ms")]
    pub auto_step_duration_ms: u64,

    /// Step duration when goal text names none, in ms (default: 15000)
    #[serde(default = "default_goal_duration_ms")]
    pub default_goal_duration_ms: u64,

    /// Behavior used for auto-explore and between steps (default: wander)
    #[serde(default = "default_behavior")]
    pub default_auto_behavior: BehaviorKind,

    /// Finished step history capacity (default: 20)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Goal text history capacity (default: 20)
    #[serde(default = "default_history_limit")]
    pub goal_history_limit: usize,

    /// Pause directive duration when the text names none, in ms (default: 5000)
    #[serde(default = "default_pause_duration_ms")]
    pub pause_duration_ms: u64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            sector_count: default_sector_count(),
            breadcrumb_limit: default_breadcrumb_limit(),
            sighting_limit: default_sighting_limit(),
            note_limit: default_note_limit(),
            summary_interval_ms: default_summary_interval_ms(),
            breadcrumb_threshold: default_breadcrumb_threshold(),
            cliff_threshold: default_cliff_threshold(),
            light_proximity_threshold: default_light_proximity_threshold(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            default_behavior: default_behavior(),
            bump_debounce_ms: default_bump_debounce_ms(),
            reflex_history_limit: default_reflex_history_limit(),
            wander_speed: default_wander_speed(),
            rotate_speed: default_rotate_speed(),
            wall_target_intensity: default_wall_target_intensity(),
            scan_turn_deg: default_scan_turn_deg(),
            scan_cycles: default_scan_cycles(),
            rng_seed: None,
        }
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            auto_explore: default_auto_explore(),
            auto_explore_cooldown_ms: default_auto_explore_cooldown_ms(),
            auto_step_duration_ms: default_auto_step_duration_ms(),
            default_goal_duration_ms: default_goal_duration_ms(),
            default_auto_behavior: default_behavior(),
            history_limit: default_history_limit(),
            goal_history_limit: default_history_limit(),
            pause_duration_ms: default_pause_duration_ms(),
        }
    }
}

// Spatial defaults
fn default_sector_count() -> usize {
    12
}
fn default_breadcrumb_limit() -> usize {
    60
}
fn default_sighting_limit() -> usize {
    30
}
fn default_note_limit() -> usize {
    5
}
fn default_summary_interval_ms() -> u64 {
    1500
}
fn default_breadcrumb_threshold() -> f64 {
    20.0
}
fn default_cliff_threshold() -> f64 {
    100.0
}
fn default_light_proximity_threshold() -> f64 {
    120.0
}

// Behavior defaults
fn default_behavior() -> BehaviorKind {
    BehaviorKind::Wander
}
fn default_bump_debounce_ms() -> u64 {
    600
}
fn default_reflex_history_limit() -> usize {
    8
}
fn default_wander_speed() -> f64 {
    160.0
}
fn default_rotate_speed() -> f64 {
    120.0
}
fn default_wall_target_intensity() -> f64 {
    250.0
}
fn default_scan_turn_deg() -> f64 {
    60.0
}
fn default_scan_cycles() -> u32 {
    6
}

// Mission defaults
fn default_auto_explore() -> bool {
    true
}
fn default_auto_explore_cooldown_ms() -> u64 {
    20_000
}
fn default_auto_step_duration_ms() -> u64 {
    15_000
}
fn default_goal_duration_ms() -> u64 {
    15_000
}
fn default_history_limit() -> usize {
    20
}
fn default_pause_duration_ms() -> u64 {
    5000
}

impl ChetanaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChetanaError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ChetanaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.spatial.sector_count == 0 {
            return Err(ChetanaError::Config(
                "spatial.sector_count must be at least 1".to_string(),
            ));
        }
        if self.behavior.default_behavior == BehaviorKind::Avoid
            || self.mission.default_auto_behavior == BehaviorKind::Avoid
        {
            return Err(ChetanaError::Config(
                "avoid is a reflex and cannot be a default behavior".to_string(),
            ));
        }
        Ok(())
    }
}
