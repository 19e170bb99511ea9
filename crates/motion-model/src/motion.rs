//! Motion samples and the enums that describe them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How small a pixel change still counts as motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    pub const ALL: [Sensitivity; 3] = [Sensitivity::Low, Sensitivity::Medium, Sensitivity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sensitivity name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sensitivity '{0}' (expected low, medium or high)")]
pub struct ParseSensitivityError(pub String);

impl FromStr for Sensitivity {
    type Err = ParseSensitivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Sensitivity::Low),
            "medium" | "med" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            _ => Err(ParseSensitivityError(s.to_string())),
        }
    }
}

/// Dominant direction of movement within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MotionDirection {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
}

impl MotionDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionDirection::None => "none",
            MotionDirection::Left => "left",
            MotionDirection::Right => "right",
            MotionDirection::Up => "up",
            MotionDirection::Down => "down",
        }
    }
}

impl std::fmt::Display for MotionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sampling cycle's motion assessment.
///
/// `motion_intensity` and `confidence_level` are always within `[0.0, 1.0]`.
/// `last_motion_time` is only advanced by cycles that detect motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MotionData {
    pub is_motion_detected: bool,
    pub motion_intensity: f64,
    pub last_motion_time: Option<DateTime<Utc>>,
    pub motion_direction: MotionDirection,
    pub confidence_level: f64,
}

impl MotionData {
    /// A no-motion sample that keeps the previous motion timestamp.
    pub fn still(last_motion_time: Option<DateTime<Utc>>) -> Self {
        Self {
            last_motion_time,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Sensitivity>().unwrap(), Sensitivity::High);
        assert_eq!(" low ".parse::<Sensitivity>().unwrap(), Sensitivity::Low);
        assert!("extreme".parse::<Sensitivity>().is_err());
    }

    #[test]
    fn sensitivity_round_trips_through_display() {
        for level in Sensitivity::ALL {
            assert_eq!(level.to_string().parse::<Sensitivity>().unwrap(), level);
        }
    }

    #[test]
    fn motion_data_serializes_snake_case_direction() {
        let sample = MotionData {
            is_motion_detected: true,
            motion_intensity: 0.4,
            last_motion_time: None,
            motion_direction: MotionDirection::Up,
            confidence_level: 0.8,
        };
        let json = serde_json::to_value(sample).unwrap();
        assert_eq!(json["motion_direction"], "up");
        assert_eq!(json["is_motion_detected"], true);
    }

    #[test]
    fn still_sample_keeps_timestamp() {
        let at = Utc::now();
        let sample = MotionData::still(Some(at));
        assert!(!sample.is_motion_detected);
        assert_eq!(sample.motion_intensity, 0.0);
        assert_eq!(sample.motion_direction, MotionDirection::None);
        assert_eq!(sample.last_motion_time, Some(at));
    }
}
