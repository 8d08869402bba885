// Rule-based posture classification from body landmarks

use crate::models::pose::{BodyLandmark, Landmark, LandmarkFrame};
use crate::models::posture::{
    PostureIssue, PostureThresholds, PostureVerdict, NEUTRAL_ELBOW_ANGLE_DEG,
};

/// Landmarks every classification needs
pub const REQUIRED_LANDMARKS: [BodyLandmark; 7] = [
    BodyLandmark::Nose,
    BodyLandmark::LeftShoulder,
    BodyLandmark::RightShoulder,
    BodyLandmark::LeftElbow,
    BodyLandmark::RightElbow,
    BodyLandmark::LeftWrist,
    BodyLandmark::RightWrist,
];

/// Point in normalized frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl From<&Landmark> for Point2 {
    fn from(landmark: &Landmark) -> Self {
        Self {
            x: landmark.x,
            y: landmark.y,
        }
    }
}

pub fn midpoint(a: Point2, b: Point2) -> Point2 {
    Point2 {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}

/// Angle at the elbow between the upper arm and the forearm, in degrees.
///
/// Uses `atan2(cross, dot)` of elbow→shoulder and elbow→wrist, so the
/// result is always in [0, 180]. Degenerate arms (zero-length segments)
/// yield 0.
pub fn arm_angle(shoulder: Point2, elbow: Point2, wrist: Point2) -> f64 {
    let upper = (shoulder.x - elbow.x, shoulder.y - elbow.y);
    let forearm = (wrist.x - elbow.x, wrist.y - elbow.y);

    let dot = upper.0 * forearm.0 + upper.1 * forearm.1;
    let cross = upper.0 * forearm.1 - upper.1 * forearm.0;

    cross.atan2(dot).to_degrees().abs()
}

/// Classify one frame.
///
/// Returns `None` when any of [`REQUIRED_LANDMARKS`] is missing or less
/// visible than `thresholds.min_landmark_visibility`; that is the normal
/// outcome when the estimator loses track of the user.
///
/// `head_forward_distance` is `nose.x - shoulder_midpoint.x`. With a
/// user-facing camera whose image is mirrored horizontally, leaning
/// towards the screen moves the nose to a larger x, so forward lean reads
/// as a positive offset.
pub fn classify(frame: &LandmarkFrame, thresholds: &PostureThresholds) -> Option<PostureVerdict> {
    let point = |which: BodyLandmark| -> Option<Point2> {
        frame
            .get(which)
            .filter(|l| l.is_visible(thresholds.min_landmark_visibility))
            .map(Point2::from)
    };

    let nose = point(BodyLandmark::Nose)?;
    let left_shoulder = point(BodyLandmark::LeftShoulder)?;
    let right_shoulder = point(BodyLandmark::RightShoulder)?;
    let left_elbow = point(BodyLandmark::LeftElbow)?;
    let right_elbow = point(BodyLandmark::RightElbow)?;
    let left_wrist = point(BodyLandmark::LeftWrist)?;
    let right_wrist = point(BodyLandmark::RightWrist)?;

    let shoulder_midpoint = midpoint(left_shoulder, right_shoulder);
    let head_forward_distance = nose.x - shoulder_midpoint.x;
    let shoulder_tilt = (left_shoulder.y - right_shoulder.y).abs();
    let left_arm_angle = arm_angle(left_shoulder, left_elbow, left_wrist);
    let right_arm_angle = arm_angle(right_shoulder, right_elbow, right_wrist);
    let shoulder_width = (left_shoulder.x - right_shoulder.x).abs();

    let mut issues = Vec::new();

    if head_forward_distance > thresholds.head_forward {
        issues.push(PostureIssue::HeadForward);
    }

    if shoulder_tilt > thresholds.shoulder_tilt {
        issues.push(PostureIssue::ShoulderTilt);
    }

    let arm_misaligned = |angle: f64| {
        (angle - NEUTRAL_ELBOW_ANGLE_DEG).abs() > thresholds.arm_angle_deviation
    };
    if arm_misaligned(left_arm_angle) || arm_misaligned(right_arm_angle) {
        issues.push(PostureIssue::ArmMisalignment);
    }

    if shoulder_width > thresholds.max_shoulder_width {
        issues.push(PostureIssue::TooClose);
    } else if shoulder_width < thresholds.min_shoulder_width {
        issues.push(PostureIssue::TooFar);
    }

    Some(PostureVerdict {
        is_bad: !issues.is_empty(),
        head_forward_distance,
        shoulder_tilt,
        left_arm_angle,
        right_arm_angle,
        shoulder_width,
        issues,
    })
}
