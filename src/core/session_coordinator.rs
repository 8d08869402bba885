use crate::core::break_timer::BreakTimer;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::Config;
use crate::core::posture_classifier::classify;
use crate::models::pose::LandmarkFrame;
use crate::models::posture::PostureVerdict;
use crate::models::session::{
    deadline_after, AlertKind, MonitorResult, MonitoringSession, SessionSnapshot, SessionStats,
};
use crate::platform::{
    AlertPlayer, FrameRenderer, NullRenderer, PoseEstimator, StatusDisplay, VideoCapture,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const STATUS_BAD_POSTURE: &str = "Posture Status: Bad Posture!";
pub const STATUS_GOOD_POSTURE: &str = "Posture Status: Good Posture";
pub const STATUS_STOPPED: &str = "Posture Status: Monitoring Stopped";
pub const STATUS_START_FAILED: &str =
    "Error starting monitoring. Please check your camera and pose model setup.";

// ==============================================================================
// Session Coordinator
// ==============================================================================

/// Owns one monitoring session and turns per-frame verdicts into alert,
/// status and break-reminder requests.
///
/// All methods take `&mut self`; callers that share a coordinator across
/// tasks wrap it in a mutex (see `PostureMonitor`).
pub struct SessionCoordinator {
    config: Config,
    camera: Box<dyn VideoCapture>,
    estimator: Box<dyn PoseEstimator>,
    alerts: Arc<dyn AlertPlayer>,
    status: Arc<dyn StatusDisplay>,
    renderer: Arc<dyn FrameRenderer>,
    clock: Arc<dyn Clock>,
    session: Option<MonitoringSession>,
    alerts_muted: bool,
    break_timer: BreakTimer,
    timer_notifier: Option<mpsc::UnboundedSender<i64>>,
}

impl SessionCoordinator {
    /// Create an idle coordinator. Fails with `InvalidConfiguration` if the
    /// config does not validate.
    pub fn new(
        config: Config,
        camera: Box<dyn VideoCapture>,
        estimator: Box<dyn PoseEstimator>,
        alerts: Arc<dyn AlertPlayer>,
        status: Arc<dyn StatusDisplay>,
    ) -> MonitorResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            camera,
            estimator,
            alerts,
            status,
            renderer: Arc::new(NullRenderer),
            clock: Arc::new(SystemClock),
            session: None,
            alerts_muted: false,
            break_timer: BreakTimer::new(),
            timer_notifier: None,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn FrameRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Deliver break timer expiries to `notifier` as the armed deadline.
    /// Without a notifier no timer task is spawned and the caller drives
    /// reminders through [`tick`](Self::tick).
    pub fn set_timer_notifier(&mut self, notifier: mpsc::UnboundedSender<i64>) {
        self.timer_notifier = Some(notifier);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from_session(self.session.as_ref(), self.alerts_muted)
    }

    // ==========================================================================
    // Lifecycle
    // ==========================================================================

    /// Acquire the camera and pose model, then begin a session.
    ///
    /// Calling this while a session is active returns the current snapshot
    /// without touching any resource. On failure everything acquired so far
    /// is released and the coordinator stays idle.
    pub async fn start(&mut self) -> MonitorResult<SessionSnapshot> {
        if self.session.is_some() {
            debug!("Monitoring already active");
            return Ok(self.snapshot());
        }

        self.status.set_spinner_visible(true);
        let acquired = self.acquire_resources().await;
        self.status.set_spinner_visible(false);

        if let Err(e) = acquired {
            warn!(error = %e, "Failed to start monitoring");
            self.status.set_status_text(STATUS_START_FAILED);
            return Err(e);
        }

        let now = self.clock.now_millis();
        let session = MonitoringSession::begin(now, self.config.break_interval_ms);
        info!(
            session_id = %session.id,
            break_interval_ms = self.config.break_interval_ms,
            "Monitoring started"
        );
        self.session = Some(session);
        self.schedule_break(now);

        Ok(self.snapshot())
    }

    async fn acquire_resources(&mut self) -> MonitorResult<()> {
        let stream = self.camera.acquire(&self.config.camera).await?;
        debug!(
            device = %stream.device_name,
            width = stream.width,
            height = stream.height,
            "Camera acquired"
        );

        if !self.estimator.is_initialized() {
            if let Err(e) = self.estimator.load(&self.config.pose).await {
                self.release_camera().await;
                return Err(e.into());
            }
            info!(model = %self.estimator.get_model_info(), "Pose model loaded");
        }

        Ok(())
    }

    async fn release_camera(&mut self) {
        if let Err(e) = self.camera.release().await {
            warn!(error = %e, "Failed to release camera");
        }
    }

    /// End the session and release everything it holds.
    /// Returns the session's statistics, or `None` if nothing was running.
    pub async fn stop(&mut self) -> Option<SessionStats> {
        let Some(session) = self.session.take() else {
            debug!("Stop requested while idle");
            return None;
        };

        self.break_timer.cancel();

        if session.is_alert_sounding {
            self.alerts.stop_alert(AlertKind::BadPosture);
        }
        if session.break_reminder_visible {
            self.status.hide_break_reminder();
            self.alerts.stop_alert(AlertKind::BreakReminder);
        }

        self.release_camera().await;
        self.renderer.clear();
        self.status.set_status_text(STATUS_STOPPED);

        info!(
            session_id = %session.id,
            frames = session.stats.frames_received,
            bad_frames = session.stats.bad_posture_frames,
            alerts = session.stats.alerts_raised,
            "Monitoring stopped"
        );

        Some(session.stats)
    }

    // ==========================================================================
    // Frames
    // ==========================================================================

    /// Read one camera frame, run it through the estimator and classifier,
    /// and apply the verdict. Inference errors are logged and count as lost
    /// tracking; camera errors are returned.
    pub async fn process_next_frame(&mut self) -> MonitorResult<Option<PostureVerdict>> {
        if self.session.is_none() {
            return Ok(None);
        }

        let frame = self.camera.read_frame().await?;

        let landmarks = match self.estimator.estimate(&frame).await {
            Ok(landmarks) => landmarks,
            Err(e) => {
                warn!(error = %e, "Pose inference failed, skipping frame");
                None
            }
        };

        let verdict = landmarks
            .as_ref()
            .and_then(|l| classify(l, &self.config.thresholds));

        self.renderer
            .render(&frame, landmarks.as_ref(), verdict.as_ref());
        self.on_frame(verdict.as_ref());

        Ok(verdict)
    }

    /// Handler for results delivered by an external estimator. Nothing is
    /// rendered: no camera frame accompanies these results.
    pub fn handle_pose_result(&mut self, landmarks: Option<&LandmarkFrame>) -> Option<PostureVerdict> {
        if self.session.is_none() {
            return None;
        }

        let verdict = landmarks.and_then(|l| classify(l, &self.config.thresholds));
        self.on_frame(verdict.as_ref());
        verdict
    }

    /// Apply one frame's verdict. `None` (tracking lost) is counted and
    /// otherwise ignored; so is anything arriving while idle.
    pub fn on_frame(&mut self, verdict: Option<&PostureVerdict>) {
        let now = self.clock.now_millis();
        let dwell_ms = i64::try_from(self.config.alert_dwell_ms).unwrap_or(i64::MAX);
        let muted = self.alerts_muted;

        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.stats.frames_received += 1;
        let Some(verdict) = verdict else {
            session.stats.frames_without_tracking += 1;
            return;
        };

        if verdict.is_bad {
            session.stats.bad_posture_frames += 1;
        }
        session.last_verdict = Some(verdict.clone());
        self.status.set_status_text(if verdict.is_bad {
            STATUS_BAD_POSTURE
        } else {
            STATUS_GOOD_POSTURE
        });

        let should_sound = verdict.is_bad && !muted;
        if should_sound == session.is_alert_sounding {
            session.pending_switch_since = None;
            return;
        }

        let since = *session.pending_switch_since.get_or_insert(now);
        if now - since < dwell_ms {
            return;
        }
        session.pending_switch_since = None;

        if should_sound {
            session.is_alert_sounding = true;
            session.last_bad_posture_timestamp = Some(now);
            session.stats.alerts_raised += 1;
            debug!(issues = ?verdict.issues, "Bad posture alert raised");
            self.alerts.play_alert(AlertKind::BadPosture);
        } else {
            session.is_alert_sounding = false;
            debug!("Posture recovered, alert cleared");
            self.alerts.stop_alert(AlertKind::BadPosture);
        }
    }

    /// Silence the bad-posture alert. While muted no new alert starts;
    /// after unmuting the next bad frame alerts again.
    pub fn set_alerts_muted(&mut self, muted: bool) {
        self.alerts_muted = muted;
        if !muted {
            return;
        }

        if let Some(session) = self.session.as_mut() {
            session.pending_switch_since = None;
            if session.is_alert_sounding {
                session.is_alert_sounding = false;
                self.alerts.stop_alert(AlertKind::BadPosture);
            }
        }
    }

    // ==========================================================================
    // Break reminders
    // ==========================================================================

    /// Show the break reminder if the deadline has passed. The reminder is
    /// not rescheduled until [`acknowledge_break`](Self::acknowledge_break).
    pub fn tick(&mut self, now: i64) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        match session.break_timer_deadline {
            Some(deadline) if now >= deadline => {}
            _ => return false,
        }

        session.break_timer_deadline = None;
        session.break_reminder_visible = true;
        session.stats.break_reminders_shown += 1;
        self.break_timer.cancel();

        info!(session_id = %session.id, "Break reminder due");
        self.status.show_break_reminder();
        self.alerts.play_alert(AlertKind::BreakReminder);
        true
    }

    /// Handle an expiry from the break timer task. Deadlines that no longer
    /// match the session (acknowledged or restarted since) are ignored.
    pub fn fire_break_timer(&mut self, deadline: i64) -> bool {
        let current = self.session.as_ref().and_then(|s| s.break_timer_deadline);
        if current != Some(deadline) {
            debug!(deadline, "Ignoring stale break timer");
            return false;
        }

        let now = self.clock.now_millis().max(deadline);
        self.tick(now)
    }

    /// Dismiss the reminder and start the next break interval from now
    pub fn acknowledge_break(&mut self) -> bool {
        let now = self.clock.now_millis();
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if session.break_reminder_visible {
            session.break_reminder_visible = false;
            self.status.hide_break_reminder();
            self.alerts.stop_alert(AlertKind::BreakReminder);
        }

        self.schedule_break(now);
        true
    }

    fn schedule_break(&mut self, now: i64) {
        let deadline = deadline_after(now, self.config.break_interval_ms);
        if let Some(session) = self.session.as_mut() {
            session.break_timer_deadline = Some(deadline);
        }

        match &self.timer_notifier {
            Some(notifier) => {
                self.break_timer
                    .arm(deadline, self.config.break_interval(), notifier.clone());
            }
            None => {
                self.break_timer.cancel();
            }
        }
    }
}

// ==============================================================================
// Test Support
// ==============================================================================


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::core::config::MAX_INTERVAL_MS;
    use crate::core::posture_classifier::fixtures::{slouched_frame, upright_frame};
    use crate::models::pose::PoseError;
    use crate::models::session::{MonitorError, SessionState};
    use std::sync::atomic::Ordering;

    fn verdict(is_bad: bool) -> PostureVerdict {
        let frame = if is_bad { slouched_frame() } else { upright_frame() };
        classify(&frame, &Config::default().thresholds).unwrap()
    }

    #[tokio::test]
    async fn test_start_commits_session() {
        let mut h = harness(config_with_interval(1_000));

        let snapshot = h.coordinator.start().await.unwrap();

        assert_eq!(snapshot.state, SessionState::Active);
        assert!(snapshot.session_id.is_some());
        assert_eq!(snapshot.started_at, Some(START));
        assert_eq!(snapshot.break_timer_deadline, Some(START + 1_000));
        assert!(!snapshot.is_alert_sounding);
        assert!(snapshot.last_bad_posture_timestamp.is_none());
        assert_eq!(h.camera.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(h.estimator.loads.load(Ordering::SeqCst), 1);
        assert_eq!(h.recorder.take(), vec![Event::Spinner(true), Event::Spinner(false)]);
    }

    #[tokio::test]
    async fn test_start_twice_is_a_noop() {
        let mut h = harness(Config::default());

        let first = h.coordinator.start().await.unwrap();
        h.recorder.take();
        h.clock.advance(5_000);
        let second = h.coordinator.start().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.camera.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(h.estimator.loads.load(Ordering::SeqCst), 1);
        assert!(h.recorder.take().is_empty());
    }

    #[tokio::test]
    async fn test_camera_failure_keeps_idle() {
        let mut h = harness(Config::default());
        h.camera.fail_acquire.store(true, Ordering::SeqCst);

        let result = h.coordinator.start().await;

        assert!(matches!(result, Err(MonitorError::ResourceUnavailable(_))));
        assert!(!h.coordinator.is_active());
        assert!(h.coordinator.snapshot().break_timer_deadline.is_none());
        assert_eq!(h.estimator.loads.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.recorder.take(),
            vec![
                Event::Spinner(true),
                Event::Spinner(false),
                Event::Status(STATUS_START_FAILED.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_model_failure_releases_camera() {
        let mut h = harness(Config::default());
        h.estimator.fail_load.store(true, Ordering::SeqCst);

        let result = h.coordinator.start().await;

        assert!(matches!(result, Err(MonitorError::ResourceUnavailable(_))));
        assert!(!h.coordinator.is_active());
        assert_eq!(h.camera.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(h.camera.released.load(Ordering::SeqCst), 1);
        assert!(!h.camera.open.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_start_can_be_retried_after_failure() {
        let mut h = harness(Config::default());
        h.camera.fail_acquire.store(true, Ordering::SeqCst);
        assert!(h.coordinator.start().await.is_err());

        h.camera.fail_acquire.store(false, Ordering::SeqCst);
        assert!(h.coordinator.start().await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_model_is_loaded_once_across_sessions() {
        let mut h = harness(Config::default());

        h.coordinator.start().await.unwrap();
        h.coordinator.stop().await;
        h.coordinator.start().await.unwrap();

        assert_eq!(h.camera.acquired.load(Ordering::SeqCst), 2);
        assert_eq!(h.estimator.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let mut config = Config::default();
        config.break_interval_ms = 0;

        let result = SessionCoordinator::new(
            config,
            Box::new(crate::platform::SyntheticCamera::new(1, 1)),
            Box::new(crate::platform::ScriptedPoseEstimator::new(Vec::new())),
            Arc::new(crate::platform::LogFeedback),
            Arc::new(crate::platform::LogFeedback),
        );
        assert!(matches!(result, Err(MonitorError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_out_of_range_intervals_are_rejected() {
        let build = |config: Config| {
            SessionCoordinator::new(
                config,
                Box::new(crate::platform::SyntheticCamera::new(1, 1)),
                Box::new(crate::platform::ScriptedPoseEstimator::new(Vec::new())),
                Arc::new(crate::platform::LogFeedback),
                Arc::new(crate::platform::LogFeedback),
            )
        };

        for interval in [u64::MAX, i64::MAX as u64] {
            assert!(matches!(
                build(config_with_interval(interval)),
                Err(MonitorError::InvalidConfiguration(_))
            ));
        }

        let mut config = Config::default();
        config.alert_dwell_ms = u64::MAX;
        assert!(matches!(build(config), Err(MonitorError::InvalidConfiguration(_))));
    }

    #[tokio::test]
    async fn test_longest_interval_keeps_reminder_in_future() {
        let mut config = config_with_interval(MAX_INTERVAL_MS);
        config.alert_dwell_ms = MAX_INTERVAL_MS;
        let mut h = harness(config);

        let snapshot = h.coordinator.start().await.unwrap();
        assert_eq!(
            snapshot.break_timer_deadline,
            Some(START + MAX_INTERVAL_MS as i64)
        );
        assert!(!h.coordinator.tick(START));

        // A day-long dwell holds the alert back
        h.coordinator.on_frame(Some(&verdict(true)));
        h.clock.advance(60_000);
        h.coordinator.on_frame(Some(&verdict(true)));
        assert!(!h.coordinator.snapshot().is_alert_sounding);
    }

    #[tokio::test]
    async fn test_bad_posture_alerts_once_until_recovered() {
        let mut h = harness(Config::default());
        h.coordinator.start().await.unwrap();
        h.recorder.take();

        h.clock.set(START + 100);
        h.coordinator.on_frame(Some(&verdict(true)));
        h.clock.set(START + 200);
        h.coordinator.on_frame(Some(&verdict(true)));

        let snapshot = h.coordinator.snapshot();
        assert!(snapshot.is_alert_sounding);
        assert_eq!(snapshot.last_bad_posture_timestamp, Some(START + 100));
        assert_eq!(h.recorder.count(&Event::Play(AlertKind::BadPosture)), 1);

        h.coordinator.on_frame(Some(&verdict(false)));
        assert!(!h.coordinator.snapshot().is_alert_sounding);

        assert_eq!(
            h.recorder.take(),
            vec![
                Event::Status(STATUS_BAD_POSTURE.to_string()),
                Event::Play(AlertKind::BadPosture),
                Event::Status(STATUS_BAD_POSTURE.to_string()),
                Event::Status(STATUS_GOOD_POSTURE.to_string()),
                Event::Stop(AlertKind::BadPosture),
            ]
        );
    }

    #[tokio::test]
    async fn test_absent_verdict_never_toggles_alert() {
        let mut h = harness(Config::default());
        h.coordinator.start().await.unwrap();

        h.coordinator.on_frame(None);
        assert!(!h.coordinator.snapshot().is_alert_sounding);

        h.coordinator.on_frame(Some(&verdict(true)));
        h.recorder.take();
        for _ in 0..3 {
            h.coordinator.on_frame(None);
        }

        let snapshot = h.coordinator.snapshot();
        assert!(snapshot.is_alert_sounding);
        assert_eq!(snapshot.stats.frames_received, 5);
        assert_eq!(snapshot.stats.frames_without_tracking, 4);
        assert!(h.recorder.take().is_empty());
    }

    #[tokio::test]
    async fn test_frames_are_ignored_while_idle() {
        let mut h = harness(Config::default());

        h.coordinator.on_frame(Some(&verdict(true)));
        assert!(h.coordinator.handle_pose_result(Some(&slouched_frame())).is_none());
        assert!(!h.coordinator.tick(START + 10_000_000));
        assert!(!h.coordinator.acknowledge_break());

        assert!(h.recorder.take().is_empty());
        assert_eq!(h.coordinator.snapshot().stats, SessionStats::default());
    }

    #[tokio::test]
    async fn test_handle_pose_result_uses_configured_thresholds() {
        let mut config = Config::default();
        config.thresholds.head_forward = 0.2;
        let mut h = harness(config);
        h.coordinator.start().await.unwrap();

        // 0.1 of forward lean is tolerated with the relaxed limit
        let verdict = h.coordinator.handle_pose_result(Some(&slouched_frame())).unwrap();
        assert!(!verdict.is_bad);
        assert!(!h.coordinator.snapshot().is_alert_sounding);

        assert!(h.coordinator.handle_pose_result(None).is_none());
        assert_eq!(h.coordinator.snapshot().stats.frames_without_tracking, 1);

        // External results carry no camera frame, so nothing is rendered
        assert!(!h
            .recorder
            .take()
            .iter()
            .any(|e| matches!(e, Event::Render { .. })));
    }

    #[tokio::test]
    async fn test_break_reminder_timing() {
        let mut h = harness(config_with_interval(1_000));
        h.coordinator.start().await.unwrap();
        h.recorder.take();

        assert!(!h.coordinator.tick(START + 999));
        assert!(h.recorder.take().is_empty());

        assert!(h.coordinator.tick(START + 1_000));
        assert_eq!(
            h.recorder.take(),
            vec![Event::ShowBreak, Event::Play(AlertKind::BreakReminder)]
        );
        let snapshot = h.coordinator.snapshot();
        assert!(snapshot.break_reminder_visible);
        assert!(snapshot.break_timer_deadline.is_none());

        // Not rescheduled until acknowledged
        assert!(!h.coordinator.tick(START + 5_000));

        h.clock.set(START + 1_000);
        assert!(h.coordinator.acknowledge_break());
        assert_eq!(
            h.recorder.take(),
            vec![Event::HideBreak, Event::Stop(AlertKind::BreakReminder)]
        );
        assert_eq!(h.coordinator.snapshot().break_timer_deadline, Some(START + 2_000));

        assert!(!h.coordinator.tick(START + 1_999));
        assert!(h.coordinator.tick(START + 2_000));
        assert_eq!(h.coordinator.snapshot().stats.break_reminders_shown, 2);
    }

    #[tokio::test]
    async fn test_acknowledge_without_reminder_resets_interval() {
        let mut h = harness(config_with_interval(1_000));
        h.coordinator.start().await.unwrap();
        h.recorder.take();

        h.clock.set(START + 600);
        assert!(h.coordinator.acknowledge_break());
        assert!(h.recorder.take().is_empty());
        assert_eq!(h.coordinator.snapshot().break_timer_deadline, Some(START + 1_600));
        assert!(!h.coordinator.tick(START + 1_000));
    }

    #[tokio::test]
    async fn test_stale_timer_expiry_is_ignored() {
        let mut h = harness(config_with_interval(1_000));
        h.coordinator.start().await.unwrap();

        h.clock.set(START + 500);
        h.coordinator.acknowledge_break();

        assert!(!h.coordinator.fire_break_timer(START + 1_000));
        assert!(!h.coordinator.snapshot().break_reminder_visible);

        // The current deadline fires even if the clock lags slightly behind it
        h.clock.set(START + 1_499);
        assert!(h.coordinator.fire_break_timer(START + 1_500));
        assert!(h.coordinator.snapshot().break_reminder_visible);
    }

    #[tokio::test]
    async fn test_stop_releases_everything() {
        let mut h = harness(config_with_interval(1_000));
        h.coordinator.start().await.unwrap();
        h.coordinator.on_frame(Some(&verdict(true)));
        h.coordinator.tick(START + 1_000);
        h.recorder.take();

        let stats = h.coordinator.stop().await.unwrap();

        assert_eq!(stats.alerts_raised, 1);
        assert_eq!(stats.break_reminders_shown, 1);
        assert_eq!(
            h.recorder.take(),
            vec![
                Event::Stop(AlertKind::BadPosture),
                Event::HideBreak,
                Event::Stop(AlertKind::BreakReminder),
                Event::Clear,
                Event::Status(STATUS_STOPPED.to_string()),
            ]
        );
        assert_eq!(h.camera.released.load(Ordering::SeqCst), 1);

        let snapshot = h.coordinator.snapshot();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert!(snapshot.break_timer_deadline.is_none());
        assert!(!snapshot.is_alert_sounding);

        assert!(h.coordinator.stop().await.is_none());
        assert_eq!(h.camera.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dwell_delays_alert_switching() {
        let mut config = Config::default();
        config.alert_dwell_ms = 500;
        let mut h = harness(config);
        h.coordinator.start().await.unwrap();

        h.coordinator.on_frame(Some(&verdict(true)));
        h.clock.set(START + 499);
        h.coordinator.on_frame(Some(&verdict(true)));
        assert!(!h.coordinator.snapshot().is_alert_sounding);

        h.clock.set(START + 500);
        h.coordinator.on_frame(Some(&verdict(true)));
        assert!(h.coordinator.snapshot().is_alert_sounding);
        assert_eq!(h.coordinator.snapshot().last_bad_posture_timestamp, Some(START + 500));

        // A single good frame inside the dwell window does not clear the alert
        h.clock.set(START + 600);
        h.coordinator.on_frame(Some(&verdict(false)));
        h.clock.set(START + 700);
        h.coordinator.on_frame(Some(&verdict(true)));
        h.clock.set(START + 1_200);
        h.coordinator.on_frame(Some(&verdict(false)));
        assert!(h.coordinator.snapshot().is_alert_sounding);

        h.clock.set(START + 1_700);
        h.coordinator.on_frame(Some(&verdict(false)));
        assert!(!h.coordinator.snapshot().is_alert_sounding);
        assert_eq!(h.recorder.count(&Event::Play(AlertKind::BadPosture)), 1);
        assert_eq!(h.recorder.count(&Event::Stop(AlertKind::BadPosture)), 1);
    }

    #[tokio::test]
    async fn test_muting_silences_alerts() {
        let mut h = harness(Config::default());
        h.coordinator.start().await.unwrap();
        h.coordinator.on_frame(Some(&verdict(true)));
        h.recorder.take();

        h.coordinator.set_alerts_muted(true);
        assert_eq!(h.recorder.take(), vec![Event::Stop(AlertKind::BadPosture)]);
        assert!(!h.coordinator.snapshot().is_alert_sounding);
        assert!(h.coordinator.snapshot().alerts_muted);

        h.coordinator.on_frame(Some(&verdict(true)));
        assert_eq!(h.recorder.count(&Event::Play(AlertKind::BadPosture)), 0);

        h.coordinator.set_alerts_muted(false);
        h.coordinator.on_frame(Some(&verdict(true)));
        assert_eq!(h.recorder.count(&Event::Play(AlertKind::BadPosture)), 1);
        assert!(h.coordinator.snapshot().is_alert_sounding);
    }

    #[tokio::test]
    async fn test_process_next_frame_pipeline() {
        let mut h = harness(Config::default());
        h.estimator.push(Ok(Some(slouched_frame())));
        h.estimator.push(Ok(None));
        h.estimator.push(Err(PoseError::InferenceFailed("gpu lost".to_string())));
        h.estimator.push(Ok(Some(upright_frame())));

        assert!(h.coordinator.process_next_frame().await.unwrap().is_none());
        assert!(h.recorder.take().is_empty());

        h.coordinator.start().await.unwrap();
        h.recorder.take();

        let first = h.coordinator.process_next_frame().await.unwrap().unwrap();
        assert!(first.is_bad);
        assert!(h.coordinator.snapshot().is_alert_sounding);

        assert!(h.coordinator.process_next_frame().await.unwrap().is_none());
        assert!(h.coordinator.process_next_frame().await.unwrap().is_none());
        assert!(h.coordinator.snapshot().is_alert_sounding);

        let last = h.coordinator.process_next_frame().await.unwrap().unwrap();
        assert!(!last.is_bad);
        assert!(!h.coordinator.snapshot().is_alert_sounding);

        let renders: Vec<Event> = h
            .recorder
            .take()
            .into_iter()
            .filter(|e| matches!(e, Event::Render { .. }))
            .collect();
        assert_eq!(
            renders,
            vec![
                Event::Render { tracked: true },
                Event::Render { tracked: false },
                Event::Render { tracked: false },
                Event::Render { tracked: true },
            ]
        );

        let stats = h.coordinator.snapshot().stats;
        assert_eq!(stats.frames_received, 4);
        assert_eq!(stats.frames_without_tracking, 2);
        assert_eq!(stats.bad_posture_frames, 1);
    }

    #[tokio::test]
    async fn test_camera_read_failure_is_returned() {
        let mut h = harness(Config::default());
        h.coordinator.start().await.unwrap();
        h.camera.fail_read.store(true, Ordering::SeqCst);

        assert!(matches!(
            h.coordinator.process_next_frame().await,
            Err(MonitorError::ResourceUnavailable(_))
        ));
    }
}
