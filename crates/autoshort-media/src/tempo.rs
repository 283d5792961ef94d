//! Narration tempo adjustment.

use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Per-stage limits of FFmpeg's `atempo` filter.
const ATEMPO_MIN: f64 = 0.5;
const ATEMPO_MAX: f64 = 2.0;

/// Changes playback speed of an audio file without changing pitch.
#[async_trait]
pub trait TempoAdjuster: Send + Sync {
    /// Write `input` played at `factor`x speed to `output`, replacing any existing file.
    async fn adjust(&self, input: &Path, output: &Path, factor: f64) -> MediaResult<()>;
}

/// `TempoAdjuster` backed by FFmpeg's `atempo` filter.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTempoAdjuster {
    runner: FfmpegRunner,
}

impl FfmpegTempoAdjuster {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }

    /// Command for one adjustment: audio only, overwrite enabled.
    pub fn build_command(input: &Path, output: &Path, factor: f64) -> MediaResult<FfmpegCommand> {
        Ok(FfmpegCommand::new(input, output)
            .audio_filter(atempo_chain(factor)?)
            .no_video())
    }
}

#[async_trait]
impl TempoAdjuster for FfmpegTempoAdjuster {
    async fn adjust(&self, input: &Path, output: &Path, factor: f64) -> MediaResult<()> {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        let cmd = Self::build_command(input, output, factor)?;
        debug!(
            input = %input.display(),
            output = %output.display(),
            factor,
            "Adjusting narration tempo"
        );
        self.runner.run(&cmd).await
    }
}

/// Build an `atempo` filter chain whose stages multiply to `factor`.
///
/// Each stage stays within the filter's 0.5..=2.0 range so older FFmpeg
/// builds accept it.
pub fn atempo_chain(factor: f64) -> MediaResult<String> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(MediaError::invalid_argument(format!(
            "Tempo factor must be a positive number, got {}",
            factor
        )));
    }

    let mut stages = Vec::new();
    let mut remaining = factor;

    while remaining > ATEMPO_MAX {
        stages.push(ATEMPO_MAX);
        remaining /= ATEMPO_MAX;
    }
    while remaining < ATEMPO_MIN {
        stages.push(ATEMPO_MIN);
        remaining /= ATEMPO_MIN;
    }
    stages.push(remaining);

    Ok(stages
        .iter()
        .map(|s| format!("atempo={}", format_factor(*s)))
        .collect::<Vec<_>>()
        .join(","))
}

fn format_factor(f: f64) -> String {
    let s = format!("{:.6}", f);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
