// User-facing feedback: alert sounds, status UI and overlay rendering
// The coordinator only issues requests; playback and drawing belong to the host UI

use crate::models::capture::VideoFrame;
use crate::models::pose::LandmarkFrame;
use crate::models::posture::PostureVerdict;
use crate::models::session::AlertKind;
use tracing::info;

pub trait AlertPlayer: Send + Sync {
    fn play_alert(&self, kind: AlertKind);

    /// Stop playback and rewind so the next `play_alert` starts from the beginning
    fn stop_alert(&self, kind: AlertKind);
}

pub trait StatusDisplay: Send + Sync {
    fn set_status_text(&self, text: &str);
    fn show_break_reminder(&self);
    fn hide_break_reminder(&self);
    fn set_spinner_visible(&self, visible: bool);
}

pub trait FrameRenderer: Send + Sync {
    /// Draw the frame with whatever landmarks and verdict it produced
    fn render(
        &self,
        frame: &VideoFrame,
        landmarks: Option<&LandmarkFrame>,
        verdict: Option<&PostureVerdict>,
    );

    /// Clear the overlay when monitoring stops
    fn clear(&self);
}

/// Renderer for hosts without an overlay
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl FrameRenderer for NullRenderer {
    fn render(&self, _: &VideoFrame, _: Option<&LandmarkFrame>, _: Option<&PostureVerdict>) {}

    fn clear(&self) {}
}

/// Reports alerts and status changes through tracing, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl AlertPlayer for LogFeedback {
    fn play_alert(&self, kind: AlertKind) {
        info!(alert = kind.to_string(), "Alert playing");
    }

    fn stop_alert(&self, kind: AlertKind) {
        info!(alert = kind.to_string(), "Alert stopped");
    }
}

impl StatusDisplay for LogFeedback {
    fn set_status_text(&self, text: &str) {
        info!(status = text, "Status updated");
    }

    fn show_break_reminder(&self) {
        info!("Time for a break");
    }

    fn hide_break_reminder(&self) {
        info!("Break reminder dismissed");
    }

    fn set_spinner_visible(&self, visible: bool) {
        info!(visible, "Loading spinner");
    }
}
