// Data models for posture classification

use serde::{Deserialize, Serialize};

/// Elbow angle the arm-misalignment check measures deviation from
pub const NEUTRAL_ELBOW_ANGLE_DEG: f64 = 90.0;

/// Tunable limits for the posture heuristics.
///
/// All comparisons against these values are strict, so a metric sitting
/// exactly on a limit does not count as bad posture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureThresholds {
    /// Maximum forward offset of the nose from the shoulder midpoint
    pub head_forward: f64,
    /// Maximum vertical difference between the two shoulders
    pub shoulder_tilt: f64,
    /// Maximum deviation of either elbow angle from 90 degrees.
    /// At the default of 90 the check can never fire, since elbow angles
    /// stay within [0, 180].
    pub arm_angle_deviation: f64,
    /// Shoulder width below which the user is too far from the camera
    pub min_shoulder_width: f64,
    /// Shoulder width above which the user is too close to the camera
    pub max_shoulder_width: f64,
    /// Landmarks less visible than this are treated as missing
    pub min_landmark_visibility: f64,
}

impl Default for PostureThresholds {
    fn default() -> Self {
        Self {
            head_forward: 0.05,
            shoulder_tilt: 0.10,
            arm_angle_deviation: 90.0,
            min_shoulder_width: 0.20,
            max_shoulder_width: 0.60,
            min_landmark_visibility: 0.0,
        }
    }
}

/// Individual heuristic that flagged a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureIssue {
    HeadForward,
    ShoulderTilt,
    ArmMisalignment,
    TooClose,
    TooFar,
}

impl PostureIssue {
    pub fn to_string(&self) -> &'static str {
        match self {
            PostureIssue::HeadForward => "head_forward",
            PostureIssue::ShoulderTilt => "shoulder_tilt",
            PostureIssue::ArmMisalignment => "arm_misalignment",
            PostureIssue::TooClose => "too_close",
            PostureIssue::TooFar => "too_far",
        }
    }
}

/// Classification of a single frame together with the metrics behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureVerdict {
    pub is_bad: bool,
    pub head_forward_distance: f64,
    pub shoulder_tilt: f64,
    pub left_arm_angle: f64,  // Degrees, [0, 180]
    pub right_arm_angle: f64, // Degrees, [0, 180]
    pub shoulder_width: f64,
    pub issues: Vec<PostureIssue>,
}

impl PostureVerdict {
    pub fn has_issue(&self, issue: PostureIssue) -> bool {
        self.issues.contains(&issue)
    }
}
