// Data structures for webcam capture

use serde::{Deserialize, Serialize};

/// Which camera to open on devices with more than one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    pub facing_mode: FacingMode,
    /// Upper bound on frames submitted to the pose estimator per second
    pub target_fps: u32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            target_fps: 30,
        }
    }
}

/// Describes an acquired camera stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub device_name: String,
    pub width: u32,
    pub height: u32,
}

/// A captured video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub timestamp: i64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

/// Pixel format of captured frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RGBA8,
    BGRA8,
}

/// Error types for camera operations
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No camera found")]
    DeviceNotFound,

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Camera is not acquired")]
    NotAcquired,
}

pub type CaptureResult<T> = Result<T, CaptureError>;
