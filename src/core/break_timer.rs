// Cancellable break-reminder timer

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// At most one scheduled break notification.
///
/// When the delay elapses the armed deadline is sent on the notifier
/// channel; receivers compare it with the session's current deadline to
/// discard notifications that were already superseded.
#[derive(Debug, Default)]
pub struct BreakTimer {
    pending: Option<(i64, JoinHandle<()>)>,
}

impl BreakTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a notification for `deadline`, replacing any pending one.
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, deadline: i64, delay: Duration, notifier: mpsc::UnboundedSender<i64>) {
        self.cancel();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the monitor shut down
            let _ = notifier.send(deadline);
        });

        debug!(deadline, delay_ms = delay.as_millis() as u64, "Break timer armed");
        self.pending = Some((deadline, handle));
    }

    /// Cancel the pending notification. Returns whether one was still outstanding.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some((deadline, handle)) => {
                let outstanding = !handle.is_finished();
                handle.abort();
                if outstanding {
                    debug!(deadline, "Break timer cancelled");
                }
                outstanding
            }
            None => false,
        }
    }

    pub fn deadline(&self) -> Option<i64> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map_or(false, |(_, handle)| !handle.is_finished())
    }
}

impl Drop for BreakTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
