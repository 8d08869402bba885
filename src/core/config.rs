use crate::models::capture::CameraOptions;
use crate::models::pose::PoseOptions;
use crate::models::posture::PostureThresholds;
use crate::models::session::{MonitorError, MonitorResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest accepted break interval and alert dwell: one day
pub const MAX_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Limits for the posture heuristics
    pub thresholds: PostureThresholds,
    /// Time between break reminders, in milliseconds
    pub break_interval_ms: u64,
    /// How long an opposite verdict must persist before the alert switches.
    /// 0 switches on the first frame.
    pub alert_dwell_ms: u64,
    /// Pose estimator settings
    pub pose: PoseOptions,
    /// Camera settings
    pub camera: CameraOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: PostureThresholds::default(),
            break_interval_ms: 30 * 60 * 1000, // Remind every 30 minutes
            alert_dwell_ms: 0,
            pose: PoseOptions::default(),
            camera: CameraOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it with defaults if it doesn't exist
    pub fn load() -> MonitorResult<Self> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> MonitorResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| MonitorError::InvalidConfiguration(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> MonitorResult<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> MonitorResult<()> {
        self.validate()?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> MonitorResult<()> {
        let t = &self.thresholds;

        for (name, value) in [
            ("head_forward", t.head_forward),
            ("shoulder_tilt", t.shoulder_tilt),
            ("min_shoulder_width", t.min_shoulder_width),
            ("max_shoulder_width", t.max_shoulder_width),
            ("min_landmark_visibility", t.min_landmark_visibility),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!(
                    "Invalid {} threshold: {}. Must be between 0.0 and 1.0",
                    name, value
                )));
            }
        }

        if !t.arm_angle_deviation.is_finite() || !(0.0..=180.0).contains(&t.arm_angle_deviation) {
            return Err(invalid(format!(
                "Invalid arm angle deviation: {}. Must be between 0 and 180 degrees",
                t.arm_angle_deviation
            )));
        }

        if t.min_shoulder_width >= t.max_shoulder_width {
            return Err(invalid(format!(
                "Invalid shoulder width range: min {} must be below max {}",
                t.min_shoulder_width, t.max_shoulder_width
            )));
        }

        if self.break_interval_ms == 0 || self.break_interval_ms > MAX_INTERVAL_MS {
            return Err(invalid(format!(
                "Invalid break interval: {} ms. Must be between 1 and {} ms",
                self.break_interval_ms, MAX_INTERVAL_MS
            )));
        }

        if self.alert_dwell_ms > MAX_INTERVAL_MS {
            return Err(invalid(format!(
                "Invalid alert dwell: {} ms. Must be at most {} ms",
                self.alert_dwell_ms, MAX_INTERVAL_MS
            )));
        }

        for (name, value) in [
            ("min_detection_confidence", self.pose.min_detection_confidence),
            ("min_tracking_confidence", self.pose.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!(
                    "Invalid {}: {}. Must be between 0.0 and 1.0",
                    name, value
                )));
            }
        }

        if self.camera.target_fps == 0 || self.camera.target_fps > 120 {
            return Err(invalid(format!(
                "Invalid target FPS: {}. Must be between 1 and 120",
                self.camera.target_fps
            )));
        }

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> MonitorResult<Self> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    pub fn break_interval(&self) -> Duration {
        Duration::from_millis(self.break_interval_ms)
    }

    /// Minimum spacing between frame submissions
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.camera.target_fps.max(1)
    }

    /// Get the configuration file path
    fn get_config_path() -> MonitorResult<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| invalid("Could not determine home directory".to_string()))?;

        let mut path = PathBuf::from(home);
        path.push(".posture_monitor");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}

fn invalid(message: String) -> MonitorError {
    MonitorError::InvalidConfiguration(message)
}
