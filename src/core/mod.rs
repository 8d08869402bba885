pub mod config;
pub mod clock;

// Posture analysis
pub mod posture_classifier;

// Session lifecycle, alerts and break reminders
pub mod break_timer;
pub mod session_coordinator;
pub mod posture_monitor;
