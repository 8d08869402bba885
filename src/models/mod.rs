// Data models for capture, pose landmarks, posture verdicts and monitoring sessions

pub mod capture;
pub mod pose;
pub mod posture;
pub mod session;
