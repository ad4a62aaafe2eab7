//! Angular sector storage.

use crate::core::BoundedRing;
use serde::Serialize;

/// Upper bound of a sector's forbidden score.
pub const FORBIDDEN_SCORE_MAX: u8 = 10;

/// Light score smoothing: `score = round(score * 0.7 + value * 0.3)`.
const LIGHT_RETAIN: f64 = 0.7;
const LIGHT_GAIN: f64 = 0.3;

/// Annotation attached to a sector mark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorNote {
    pub note: String,
    pub at: u64,
}

/// One fixed-width angular slice of nearby space.
#[derive(Debug, Clone, Serialize)]
pub struct Sector {
    /// Obstacle hits recorded in this sector (never decays)
    pub obstacles: u32,
    /// Exponentially smoothed light intensity
    pub light_score: f64,
    /// Avoidance weight, clamped to [0, 10]
    pub forbidden_score: u8,
    /// Last write time in ms (0 = never)
    pub last_updated: u64,
    recent_notes: BoundedRing<SectorNote>,
}

impl Sector {
    pub fn new(note_limit: usize) -> Self {
        Self {
            obstacles: 0,
            light_score: 0.0,
            forbidden_score: 0,
            last_updated: 0,
            recent_notes: BoundedRing::new(note_limit),
        }
    }

    /// Record an obstacle hit.
    pub fn mark(&mut self, note: Option<&str>, now: u64) {
        self.obstacles += 1;
        self.forbidden_score = (self.forbidden_score + 1).min(FORBIDDEN_SCORE_MAX);
        self.last_updated = now;
        if let Some(note) = note {
            self.recent_notes.push(SectorNote {
                note: note.to_string(),
                at: now,
            });
        }
    }

    /// Fold a light reading into the smoothed score.
    pub fn accumulate_light(&mut self, value: f64, now: u64) {
        self.light_score = (self.light_score * LIGHT_RETAIN + value * LIGHT_GAIN).round();
        self.last_updated = now;
    }

    pub fn has_obstacle_memory(&self) -> bool {
        self.obstacles > 0 || self.forbidden_score > 0
    }

    /// Notes oldest first.
    pub fn notes(&self) -> Vec<SectorNote> {
        self.recent_notes.to_vec()
    }
}
