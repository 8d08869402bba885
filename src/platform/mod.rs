// Collaborators the monitor drives: camera, pose estimator, alerts and UI

pub mod camera;
pub mod feedback;
pub mod pose;

pub use camera::{SyntheticCamera, VideoCapture};
pub use feedback::{AlertPlayer, FrameRenderer, LogFeedback, NullRenderer, StatusDisplay};
pub use pose::{PoseEstimator, ScriptedPoseEstimator};
