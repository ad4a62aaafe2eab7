//! Trajectory, sighting and summary types.

use crate::core::{Pose, SensorSample};
use serde::Serialize;

/// Recorded pose sample along the recent trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breadcrumb {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub timestamp: u64,
}

/// Kind of noteworthy observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SightingCategory {
    Maintenance,
    Vision,
    Generic,
}

/// Noteworthy observation kept for status summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sighting {
    pub description: String,
    pub category: SightingCategory,
    pub timestamp: u64,
}

/// Coarse bearing of something relative to the robot's nose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelativeDirection {
    Front,
    FrontRight,
    Right,
    RearRight,
    Rear,
    RearLeft,
    Left,
    FrontLeft,
}

impl RelativeDirection {
    /// Classify a relative bearing in (-180, 180], positive to the left.
    pub fn from_relative(relative_deg: f64) -> Self {
        let magnitude = relative_deg.abs();
        let left = relative_deg > 0.0;
        if magnitude <= 22.5 {
            RelativeDirection::Front
        } else if magnitude <= 67.5 {
            if left {
                RelativeDirection::FrontLeft
            } else {
                RelativeDirection::FrontRight
            }
        } else if magnitude <= 112.5 {
            if left {
                RelativeDirection::Left
            } else {
                RelativeDirection::Right
            }
        } else if magnitude <= 157.5 {
            if left {
                RelativeDirection::RearLeft
            } else {
                RelativeDirection::RearRight
            }
        } else {
            RelativeDirection::Rear
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelativeDirection::Front => "front",
            RelativeDirection::FrontRight => "front-right",
            RelativeDirection::Right => "right",
            RelativeDirection::RearRight => "rear-right",
            RelativeDirection::Rear => "rear",
            RelativeDirection::RearLeft => "rear-left",
            RelativeDirection::Left => "left",
            RelativeDirection::FrontLeft => "front-left",
        }
    }
}

/// Published situation report.
#[derive(Debug, Clone, Serialize)]
pub struct SpatialSummary {
    /// Fixed-format text description
    pub summary: String,
    pub pose: Pose,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub last_sensor: Option<SensorSample>,
    pub battery_percentage: Option<f64>,
    pub updated_at: u64,
}

/// Events published by the spatial model.
#[derive(Debug, Clone)]
pub enum SpatialEvent {
    Summary(Box<SpatialSummary>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_direction_buckets() {
        assert_eq!(RelativeDirection::from_relative(0.0), RelativeDirection::Front);
        assert_eq!(RelativeDirection::from_relative(-22.5), RelativeDirection::Front);
        assert_eq!(RelativeDirection::from_relative(45.0), RelativeDirection::FrontLeft);
        assert_eq!(RelativeDirection::from_relative(-45.0), RelativeDirection::FrontRight);
        assert_eq!(RelativeDirection::from_relative(90.0), RelativeDirection::Left);
        assert_eq!(RelativeDirection::from_relative(-90.0), RelativeDirection::Right);
        assert_eq!(RelativeDirection::from_relative(135.0), RelativeDirection::RearLeft);
        assert_eq!(RelativeDirection::from_relative(-135.0), RelativeDirection::RearRight);
        assert_eq!(RelativeDirection::from_relative(180.0), RelativeDirection::Rear);
        assert_eq!(RelativeDirection::from_relative(-170.0), RelativeDirection::Rear);
    }
}
