//! FFprobe media information.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::FfmpegRunner;
use crate::error::{MediaError, MediaResult};

/// Video stream information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec
    pub codec: String,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Measures the playback length of a media file.
///
/// Narration timing is always taken from the written asset through this
/// trait, never estimated from text.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration in seconds; always positive on success.
    async fn duration(&self, path: &Path) -> MediaResult<f64>;
}

/// `DurationProbe` backed by ffprobe; observes the runner's cancel flag and timeout.
#[derive(Debug, Clone, Default)]
pub struct FfprobeDurationProbe {
    runner: FfmpegRunner,
}

impl FfprobeDurationProbe {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn duration(&self, path: &Path) -> MediaResult<f64> {
        probe_duration_with(path, &self.runner).await
    }
}

/// Run ffprobe and parse its JSON output.
async fn run_ffprobe(path: &Path, runner: &FfmpegRunner) -> MediaResult<FfprobeOutput> {
    if runner.is_cancelled() {
        return Err(MediaError::Cancelled);
    }
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let mut command = Command::new("ffprobe");
    command
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null());
    let output = runner.output(command).await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

fn parse_duration(probe: &FfprobeOutput, path: &Path) -> MediaResult<f64> {
    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            MediaError::InvalidMedia(format!("No usable duration reported for {}", path.display()))
        })
}

/// Container duration of any media file in seconds.
pub async fn probe_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    probe_duration_with(path, &FfmpegRunner::default()).await
}

/// `probe_duration` under `runner`'s cancel flag and timeout.
pub async fn probe_duration_with(path: impl AsRef<Path>, runner: &FfmpegRunner) -> MediaResult<f64> {
    let path = path.as_ref();
    let probe = run_ffprobe(path, runner).await?;
    parse_duration(&probe, path)
}

/// Probe a video file for duration and frame geometry.
pub async fn probe_video(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    probe_video_with(path, &FfmpegRunner::default()).await
}

/// `probe_video` under `runner`'s cancel flag and timeout.
pub async fn probe_video_with(path: impl AsRef<Path>, runner: &FfmpegRunner) -> MediaResult<VideoInfo> {
    let path = path.as_ref();
    let probe = run_ffprobe(path, runner).await?;
    video_info(&probe, path)
}

fn video_info(probe: &FfprobeOutput, path: &Path) -> MediaResult<VideoInfo> {
    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidMedia(format!("No video stream in {}", path.display())))?;

    let (width, height) = match (video_stream.width, video_stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(MediaError::InvalidMedia(format!(
                "Video stream without dimensions in {}",
                path.display()
            )))
        }
    };

    let fps = video_stream
        .avg_frame_rate
        .as_ref()
        .or(video_stream.r_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(30.0);

    Ok(VideoInfo {
        duration: parse_duration(probe, path)?,
        width,
        height,
        fps,
        codec: video_stream.codec_name.clone().unwrap_or_default(),
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}
