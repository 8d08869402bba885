// Replays recorded MediaPipe results through a full monitoring session.
//
// Usage: replay_session <results.jsonl> [settings.json]
//
// Each line of the results file is one `{"poseLandmarks": [...]}` object as
// delivered by MediaPipe Pose; `null` landmarks mean tracking was lost.

use posture_monitor_lib::core::config::Config;
use posture_monitor_lib::platform::{LogFeedback, ScriptedPoseEstimator, SyntheticCamera};
use posture_monitor_lib::{init_tracing, PostureMonitor, SessionCoordinator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let results_path = args
        .next()
        .map(PathBuf::from)
        .ok_or("usage: replay_session <results.jsonl> [settings.json]")?;
    let config = match args.next() {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::default(),
    };

    let contents = std::fs::read_to_string(&results_path)?;
    let estimator = ScriptedPoseEstimator::from_json_lines(&contents)?;
    let total_frames = estimator.remaining() as u64;
    info!(path = %results_path.display(), frames = total_frames, "Replaying pose results");

    let frame_interval = config.frame_interval();
    let coordinator = SessionCoordinator::new(
        config,
        Box::new(SyntheticCamera::new(640, 480)),
        Box::new(estimator),
        Arc::new(LogFeedback),
        Arc::new(LogFeedback),
    )?;
    let monitor = PostureMonitor::new(coordinator);

    monitor.start().await?;
    while monitor.is_active().await
        && monitor.snapshot().await.stats.frames_received < total_frames
    {
        tokio::time::sleep(frame_interval).await;
    }

    if let Some(stats) = monitor.stop().await {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    Ok(())
}
