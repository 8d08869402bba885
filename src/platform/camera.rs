// Camera abstraction - the monitor only needs a stream it can open, read and close

use crate::models::capture::{
    CameraOptions, CaptureError, CaptureResult, PixelFormat, StreamInfo, VideoFrame,
};
use async_trait::async_trait;

/// Video source the coordinator acquires on start and releases on stop
#[async_trait]
pub trait VideoCapture: Send + Sync {
    /// Open the camera stream
    async fn acquire(&mut self, options: &CameraOptions) -> CaptureResult<StreamInfo>;

    /// Read the next frame from an acquired stream
    async fn read_frame(&mut self) -> CaptureResult<VideoFrame>;

    /// Stop all tracks and close the stream
    async fn release(&mut self) -> CaptureResult<()>;

    /// Check if the stream is currently open
    fn is_acquired(&self) -> bool;
}

/// Camera producing blank frames, for replaying recorded pose results
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    acquired: bool,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            acquired: false,
        }
    }

    /// Bytes in one RGBA frame
    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[async_trait]
impl VideoCapture for SyntheticCamera {
    async fn acquire(&mut self, _options: &CameraOptions) -> CaptureResult<StreamInfo> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::DeviceNotFound);
        }

        self.acquired = true;
        Ok(StreamInfo {
            device_name: "synthetic".to_string(),
            width: self.width,
            height: self.height,
        })
    }

    async fn read_frame(&mut self) -> CaptureResult<VideoFrame> {
        if !self.acquired {
            return Err(CaptureError::NotAcquired);
        }

        Ok(VideoFrame {
            timestamp: chrono::Utc::now().timestamp_millis(),
            width: self.width,
            height: self.height,
            data: vec![0; self.frame_len()],
            format: PixelFormat::RGBA8,
        })
    }

    async fn release(&mut self) -> CaptureResult<()> {
        self.acquired = false;
        Ok(())
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }
}
