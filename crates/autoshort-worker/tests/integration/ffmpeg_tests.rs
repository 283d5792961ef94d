//! End-to-end runs against real FFmpeg.
//!
//! Narration comes from FFmpeg's sine source through the command engine,
//! so no network TTS is needed.

use autoshort_models::StoryText;
use autoshort_worker::{shared_rng, ClipPipeline, Engines, TtsEngine, WorkerConfig};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use tokio::sync::watch;

fn generate_background(path: &Path, secs: u32) {
    let status = Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-f", "lavfi", "-i"])
        .arg(format!("testsrc=size=1280x720:rate=25:duration={}", secs))
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"])
        .arg(path)
        .status()
        .expect("ffmpeg not runnable");
    assert!(status.success());
}

fn sine_config(root: &Path) -> WorkerConfig {
    WorkerConfig {
        temp_dir: root.join("temp_assets"),
        work_dir: root.to_path_buf(),
        tts_engine: TtsEngine::Command,
        tts_command: Some("ffmpeg".to_string()),
        tts_args: [
            "-y", "-nostdin", "-v", "error", "-f", "lavfi", "-i", "sine=duration=1",
            "-c:a", "libmp3lame", "{output}",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        seed: Some(1),
        ..WorkerConfig::default()
    }
}

#[tokio::test]
#[ignore = "requires ffmpeg and ffprobe with libass"]
async fn test_real_clip_is_portrait_and_narration_length() {
    let root = TempDir::new().unwrap();
    let background = root.path().join("bg.mp4");
    generate_background(&background, 20);

    let config = sine_config(root.path());
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let engines = Engines::from_config(&config, cancel_rx).expect("engines");
    let pipeline = ClipPipeline::new(
        engines,
        config.clip_options(),
        &config.temp_dir,
        &config.work_dir,
        shared_rng(config.seed),
    );

    let output = root.path().join("Results/Story_1.mp4");
    let report = pipeline
        .run(&StoryText::new("Story_1", "Hello world\nThis is a test\n"), &background, &output)
        .await
        .expect("clip");

    let info = autoshort_media::probe_video(&output).await.expect("probe");
    assert!(info.height > info.width, "{}x{}", info.width, info.height);
    assert!((info.duration - report.narration_duration).abs() < 0.3);
    assert!(std::fs::read_dir(&config.temp_dir).unwrap().next().is_none());
}
