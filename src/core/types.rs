//! Pose and raw sensor sample types.

use serde::{Deserialize, Serialize};

/// Dead-reckoned robot pose.
///
/// Position is in millimetres relative to where the model started; heading
/// is in degrees, normalized to (-180, 180], positive counter-clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }
}

/// The six light-bump channels of a Roomba-class bumper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightChannel {
    Left,
    FrontLeft,
    CenterLeft,
    CenterRight,
    FrontRight,
    Right,
}

impl LightChannel {
    pub const ALL: [LightChannel; 6] = [
        LightChannel::Left,
        LightChannel::FrontLeft,
        LightChannel::CenterLeft,
        LightChannel::CenterRight,
        LightChannel::FrontRight,
        LightChannel::Right,
    ];

    /// Bearing of the channel relative to the robot's nose, degrees CCW.
    pub fn relative_angle(&self) -> f64 {
        match self {
            LightChannel::Left => 135.0,
            LightChannel::FrontLeft => 60.0,
            LightChannel::CenterLeft => 25.0,
            LightChannel::CenterRight => -25.0,
            LightChannel::FrontRight => -60.0,
            LightChannel::Right => -135.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LightChannel::Left => "left",
            LightChannel::FrontLeft => "front_left",
            LightChannel::CenterLeft => "center_left",
            LightChannel::CenterRight => "center_right",
            LightChannel::FrontRight => "front_right",
            LightChannel::Right => "right",
        }
    }
}

/// Light-bump intensities. Absent channels were not reported this cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightBumps {
    pub left: Option<f64>,
    pub front_left: Option<f64>,
    pub center_left: Option<f64>,
    pub center_right: Option<f64>,
    pub front_right: Option<f64>,
    pub right: Option<f64>,
}

impl LightBumps {
    pub fn get(&self, channel: LightChannel) -> Option<f64> {
        match channel {
            LightChannel::Left => self.left,
            LightChannel::FrontLeft => self.front_left,
            LightChannel::CenterLeft => self.center_left,
            LightChannel::CenterRight => self.center_right,
            LightChannel::FrontRight => self.front_right,
            LightChannel::Right => self.right,
        }
    }

    /// Reported channels in bumper order, non-finite values read as 0.
    pub fn channels(&self) -> impl Iterator<Item = (LightChannel, f64)> + '_ {
        LightChannel::ALL.into_iter().filter_map(|ch| {
            self.get(ch)
                .map(|v| (ch, if v.is_finite() { v } else { 0.0 }))
        })
    }

    /// Reading with absent channels counted as 0.
    pub fn value_or_zero(&self, channel: LightChannel) -> f64 {
        self.get(channel).filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// One periodic sample from the sensor source.
///
/// Every field is optional: absence means "no update this cycle", not zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSample {
    pub bump_left: Option<bool>,
    pub bump_right: Option<bool>,
    pub cliff_sensors: Option<Vec<f64>>,
    pub light_bumps: Option<LightBumps>,
    pub dirt_detect: Option<f64>,
    pub battery_percentage: Option<f64>,
}

impl SensorSample {
    pub fn bump_left(&self) -> bool {
        self.bump_left.unwrap_or(false)
    }

    pub fn bump_right(&self) -> bool {
        self.bump_right.unwrap_or(false)
    }

    pub fn any_bump(&self) -> bool {
        self.bump_left() || self.bump_right()
    }

    /// True if any reported cliff reading is below `threshold`.
    pub fn cliff_below(&self, threshold: f64) -> bool {
        self.cliff_sensors
            .as_ref()
            .is_some_and(|values| values.iter().any(|v| *v < threshold))
    }
}
