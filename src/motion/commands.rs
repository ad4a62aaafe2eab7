//! Motion primitive and feedback definitions

use serde::{Deserialize, Serialize};

/// One atomic commanded move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionPrimitive {
    /// Distance in mm (negative for reverse)
    pub distance_mm: f64,
    /// Turn in degrees (positive = CCW / left)
    pub turn_deg: f64,
    /// Speed in mm/s
    pub speed: f64,
}

impl MotionPrimitive {
    pub fn new(distance_mm: f64, turn_deg: f64, speed: f64) -> Self {
        Self {
            distance_mm,
            turn_deg,
            speed,
        }
    }

    /// Check if this primitive rotates in place
    pub fn is_rotation(&self) -> bool {
        self.distance_mm == 0.0 && self.turn_deg != 0.0
    }
}

/// Movement actually achieved by a completed primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RealizedMotion {
    pub distance_mm: f64,
    pub turn_deg: f64,
}

impl From<MotionPrimitive> for RealizedMotion {
    fn from(p: MotionPrimitive) -> Self {
        Self {
            distance_mm: p.distance_mm,
            turn_deg: p.turn_deg,
        }
    }
}

/// Notifications published by the motion controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionEvent {
    /// One primitive finished
    PrimitiveDone(RealizedMotion),
    /// The controller's queue drained
    QueueEmpty,
}
