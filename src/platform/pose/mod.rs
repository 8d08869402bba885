// Pose estimation platform integration
// Provides the MediaPipe bridge and a scripted backend

pub mod mediapipe_bridge;

pub use mediapipe_bridge::{parse_pose_results, PoseEstimator, ScriptedPoseEstimator};
