use crate::core::session_coordinator::SessionCoordinator;
use crate::models::pose::LandmarkFrame;
use crate::models::posture::PostureVerdict;
use crate::models::session::{MonitorResult, SessionSnapshot, SessionStats};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

// ==============================================================================
// Posture Monitor
// ==============================================================================

/// Runs a [`SessionCoordinator`] on the tokio runtime: a paced frame loop
/// while a session is active, and a task that delivers break timer expiries.
///
/// Every coordinator call goes through one mutex, so frame handling, timer
/// expiries and user commands never interleave.
pub struct PostureMonitor {
    coordinator: Arc<Mutex<SessionCoordinator>>,
    frame_loop: Mutex<Option<JoinHandle<()>>>,
    timer_pump: JoinHandle<()>,
}

impl PostureMonitor {
    /// Must be called from within a tokio runtime
    pub fn new(mut coordinator: SessionCoordinator) -> Self {
        let (notifier, expiries) = mpsc::unbounded_channel();
        coordinator.set_timer_notifier(notifier);

        let coordinator = Arc::new(Mutex::new(coordinator));
        let timer_pump = tokio::spawn(pump_break_timer(Arc::downgrade(&coordinator), expiries));

        Self {
            coordinator,
            frame_loop: Mutex::new(None),
            timer_pump,
        }
    }

    /// Start monitoring and the frame loop. A no-op if already running.
    pub async fn start(&self) -> MonitorResult<SessionSnapshot> {
        let mut frame_loop = self.frame_loop.lock().await;

        let mut coordinator = self.coordinator.lock().await;
        let was_active = coordinator.is_active();
        let snapshot = coordinator.start().await?;
        let frame_interval = coordinator.config().frame_interval();
        drop(coordinator);

        if !was_active {
            // A loop that ended the previous session itself may still be winding down
            if let Some(previous) = frame_loop.take() {
                join_frame_loop(previous).await;
            }

            debug!(interval_ms = frame_interval.as_millis() as u64, "Starting frame loop");
            *frame_loop = Some(tokio::spawn(run_frame_loop(
                Arc::downgrade(&self.coordinator),
                frame_interval,
            )));
        }

        Ok(snapshot)
    }

    /// Stop monitoring and wait for the frame loop to wind down
    pub async fn stop(&self) -> Option<SessionStats> {
        let mut frame_loop = self.frame_loop.lock().await;

        let stats = self.coordinator.lock().await.stop().await;

        if let Some(handle) = frame_loop.take() {
            join_frame_loop(handle).await;
        }

        stats
    }

    pub async fn acknowledge_break(&self) -> bool {
        self.coordinator.lock().await.acknowledge_break()
    }

    pub async fn set_alerts_muted(&self, muted: bool) {
        self.coordinator.lock().await.set_alerts_muted(muted);
    }

    /// Feed a result from an estimator running outside the frame loop.
    /// No camera frame comes with it, so the renderer is not called; hosts
    /// that deliver results this way draw their own overlay.
    pub async fn handle_pose_result(&self, landmarks: Option<&LandmarkFrame>) -> Option<PostureVerdict> {
        self.coordinator.lock().await.handle_pose_result(landmarks)
    }

    pub async fn is_active(&self) -> bool {
        self.coordinator.lock().await.is_active()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.coordinator.lock().await.snapshot()
    }
}

impl Drop for PostureMonitor {
    fn drop(&mut self) {
        self.timer_pump.abort();
        if let Some(handle) = self.frame_loop.get_mut().take() {
            handle.abort();
        }
    }
}

async fn join_frame_loop(handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        if !e.is_cancelled() {
            warn!(error = %e, "Frame loop ended abnormally");
        }
    }
}

/// Pull one frame at a time until the session ends. The next frame is not
/// requested before the previous one has been classified.
async fn run_frame_loop(coordinator: Weak<Mutex<SessionCoordinator>>, frame_interval: Duration) {
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(shared) = coordinator.upgrade() else {
            break;
        };
        let mut coordinator = shared.lock().await;
        if !coordinator.is_active() {
            break;
        }

        if let Err(e) = coordinator.process_next_frame().await {
            error!(error = %e, "Frame capture failed, stopping monitoring");
            coordinator.stop().await;
            break;
        }
    }

    debug!("Frame loop finished");
}

async fn pump_break_timer(
    coordinator: Weak<Mutex<SessionCoordinator>>,
    mut expiries: mpsc::UnboundedReceiver<i64>,
) {
    while let Some(deadline) = expiries.recv().await {
        let Some(shared) = coordinator.upgrade() else {
            break;
        };
        shared.lock().await.fire_break_timer(deadline);
    }
}
