// Data models for monitoring sessions, alerts and errors

use crate::models::capture::CaptureError;
use crate::models::pose::PoseError;
use crate::models::posture::PostureVerdict;
use serde::{Deserialize, Serialize};

// ==============================================================================
// Alerts
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    BadPosture,
    BreakReminder,
}

impl AlertKind {
    pub fn to_string(&self) -> &'static str {
        match self {
            AlertKind::BadPosture => "bad_posture",
            AlertKind::BreakReminder => "break_reminder",
        }
    }
}

// ==============================================================================
// Session State
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub frames_received: u64,
    pub frames_without_tracking: u64,
    pub bad_posture_frames: u64,
    pub alerts_raised: u32,
    pub break_reminders_shown: u32,
}

/// State of one monitoring run, from start to stop
#[derive(Debug, Clone)]
pub struct MonitoringSession {
    pub id: String,
    pub started_at: i64,
    pub is_alert_sounding: bool,
    pub last_bad_posture_timestamp: Option<i64>,
    pub break_timer_deadline: Option<i64>,
    pub break_reminder_visible: bool,
    pub last_verdict: Option<PostureVerdict>,
    pub stats: SessionStats,
    /// When the verdict first disagreed with the alert state
    pub pending_switch_since: Option<i64>,
}

impl MonitoringSession {
    pub fn begin(now: i64, break_interval_ms: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: now,
            is_alert_sounding: false,
            last_bad_posture_timestamp: None,
            break_timer_deadline: Some(deadline_after(now, break_interval_ms)),
            break_reminder_visible: false,
            last_verdict: None,
            stats: SessionStats::default(),
            pending_switch_since: None,
        }
    }
}

/// `now + interval_ms`, clamped to the end of the `i64` timeline
pub(crate) fn deadline_after(now: i64, interval_ms: u64) -> i64 {
    now.saturating_add(i64::try_from(interval_ms).unwrap_or(i64::MAX))
}

/// Read-only view of a coordinator for callers and UIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub session_id: Option<String>,
    pub started_at: Option<i64>,
    pub is_alert_sounding: bool,
    pub alerts_muted: bool,
    pub last_bad_posture_timestamp: Option<i64>,
    pub break_timer_deadline: Option<i64>,
    pub break_reminder_visible: bool,
    pub last_verdict: Option<PostureVerdict>,
    pub stats: SessionStats,
}

impl SessionSnapshot {
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub(crate) fn from_session(session: Option<&MonitoringSession>, alerts_muted: bool) -> Self {
        match session {
            Some(session) => Self {
                state: SessionState::Active,
                session_id: Some(session.id.clone()),
                started_at: Some(session.started_at),
                is_alert_sounding: session.is_alert_sounding,
                alerts_muted,
                last_bad_posture_timestamp: session.last_bad_posture_timestamp,
                break_timer_deadline: session.break_timer_deadline,
                break_reminder_visible: session.break_reminder_visible,
                last_verdict: session.last_verdict.clone(),
                stats: session.stats.clone(),
            },
            None => Self {
                state: SessionState::Idle,
                session_id: None,
                started_at: None,
                is_alert_sounding: false,
                alerts_muted,
                last_bad_posture_timestamp: None,
                break_timer_deadline: None,
                break_reminder_visible: false,
                last_verdict: None,
                stats: SessionStats::default(),
            },
        }
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<CaptureError> for MonitorError {
    fn from(err: CaptureError) -> Self {
        MonitorError::ResourceUnavailable(format!("camera: {}", err))
    }
}

impl From<PoseError> for MonitorError {
    fn from(err: PoseError) -> Self {
        MonitorError::ResourceUnavailable(format!("pose model: {}", err))
    }
}

pub type MonitorResult<T> = Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_schedules_break() {
        let session = MonitoringSession::begin(5_000, 1_000);
        assert_eq!(session.break_timer_deadline, Some(6_000));
        assert!(!session.is_alert_sounding);
        assert!(session.last_bad_posture_timestamp.is_none());
        assert_eq!(session.stats, SessionStats::default());
    }

    #[test]
    fn test_huge_interval_keeps_deadline_in_future() {
        let session = MonitoringSession::begin(10_000, u64::MAX);
        assert_eq!(session.break_timer_deadline, Some(i64::MAX));

        let session = MonitoringSession::begin(10_000, i64::MAX as u64);
        assert_eq!(session.break_timer_deadline, Some(i64::MAX));
    }

    #[test]
    fn test_idle_snapshot() {
        let snapshot = SessionSnapshot::from_session(None, false);
        assert!(!snapshot.is_active());
        assert!(snapshot.break_timer_deadline.is_none());
        assert!(snapshot.session_id.is_none());
    }

    #[test]
    fn test_collaborator_errors_become_resource_unavailable() {
        let err: MonitorError = CaptureError::DeviceNotFound.into();
        assert!(matches!(err, MonitorError::ResourceUnavailable(_)));

        let err: MonitorError = PoseError::ModelLoadFailed("missing file".to_string()).into();
        assert_eq!(err.to_string(), "Resource unavailable: pose model: Model loading failed: missing file");
    }
}
