// MediaPipe integration bridge
// Abstracts the pose estimator and parses the results it delivers

use crate::models::capture::VideoFrame;
use crate::models::pose::{
    BodyLandmark, Landmark, LandmarkFrame, PoseError, PoseOptions, PoseResult,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::info;

/// Pose estimator bridge.
///
/// `estimate` borrows the estimator mutably, so there is never more than
/// one submission in flight.
#[async_trait]
pub trait PoseEstimator: Send + Sync {
    /// Load the model with the given options
    async fn load(&mut self, options: &PoseOptions) -> PoseResult<()>;

    /// Run inference on a frame. `Ok(None)` means no person was tracked.
    async fn estimate(&mut self, frame: &VideoFrame) -> PoseResult<Option<LandmarkFrame>>;

    /// Check if the model is loaded
    fn is_initialized(&self) -> bool;

    /// Get model info
    fn get_model_info(&self) -> String;
}

/// Parse a MediaPipe Pose results object.
///
/// Expects `{"poseLandmarks": [{"x", "y", "z", "visibility"}, ...]}`.
/// A missing or null `poseLandmarks` means tracking was lost and yields
/// `Ok(None)`. Null entries inside the array leave that landmark empty.
pub fn parse_pose_results(data: &Value) -> PoseResult<Option<LandmarkFrame>> {
    let entries = match data.get("poseLandmarks") {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value.as_array().ok_or_else(|| {
            PoseError::MalformedResult("poseLandmarks is not an array".to_string())
        })?,
    };

    let mut frame = LandmarkFrame::new();

    for (index, entry) in entries.iter().enumerate() {
        let Some(which) = BodyLandmark::from_index(index) else {
            break;
        };
        if entry.is_null() {
            continue;
        }

        let coord = |key: &str| -> PoseResult<f64> {
            entry.get(key).and_then(|v| v.as_f64()).ok_or_else(|| {
                PoseError::MalformedResult(format!("landmark {} is missing '{}'", index, key))
            })
        };

        frame.set(
            which,
            Landmark {
                x: coord("x")?,
                y: coord("y")?,
                z: entry.get("z").and_then(|v| v.as_f64()).unwrap_or(0.0),
                visibility: entry.get("visibility").and_then(|v| v.as_f64()).unwrap_or(1.0),
            },
        );
    }

    Ok(Some(frame))
}

// ==============================================================================
// Scripted Implementation (replays recorded results)
// ==============================================================================

/// Estimator that hands out prerecorded results in order, then reports
/// no tracking once the script runs out.
pub struct ScriptedPoseEstimator {
    script: VecDeque<Option<LandmarkFrame>>,
    options: Option<PoseOptions>,
}

impl ScriptedPoseEstimator {
    pub fn new(script: impl IntoIterator<Item = Option<LandmarkFrame>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            options: None,
        }
    }

    /// Build from JSON lines, one MediaPipe results object per line.
    /// Blank lines are skipped.
    pub fn from_json_lines(contents: &str) -> PoseResult<Self> {
        let mut script = Vec::new();

        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(line).map_err(|e| {
                PoseError::MalformedResult(format!("line {}: {}", line_no + 1, e))
            })?;
            script.push(parse_pose_results(&value)?);
        }

        Ok(Self::new(script))
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl PoseEstimator for ScriptedPoseEstimator {
    async fn load(&mut self, options: &PoseOptions) -> PoseResult<()> {
        info!(
            frames = self.script.len(),
            model_complexity = ?options.model_complexity,
            "Scripted pose estimator loaded"
        );
        self.options = Some(options.clone());
        Ok(())
    }

    async fn estimate(&mut self, _frame: &VideoFrame) -> PoseResult<Option<LandmarkFrame>> {
        if self.options.is_none() {
            return Err(PoseError::NotInitialized);
        }
        Ok(self.script.pop_front().flatten())
    }

    fn is_initialized(&self) -> bool {
        self.options.is_some()
    }

    fn get_model_info(&self) -> String {
        format!("Scripted pose estimator ({} results queued)", self.script.len())
    }
}
