pub mod core;
pub mod models;
pub mod platform;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use crate::core::clock::{Clock, ManualClock, SystemClock};
pub use crate::core::config::Config;
pub use crate::core::posture_classifier::{arm_angle, classify};
pub use crate::core::posture_monitor::PostureMonitor;
pub use crate::core::session_coordinator::SessionCoordinator;
pub use crate::models::pose::{BodyLandmark, Landmark, LandmarkFrame};
pub use crate::models::posture::{PostureIssue, PostureThresholds, PostureVerdict};
pub use crate::models::session::{
    AlertKind, MonitorError, MonitorResult, SessionSnapshot, SessionState, SessionStats,
};

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// default `info` level. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
