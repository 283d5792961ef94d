//! Narration track stitching.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Concatenates audio segments, in order and without gaps, into one file.
#[async_trait]
pub trait AudioStitcher: Send + Sync {
    /// Write the concatenation of `segments` to `output`, replacing any existing file.
    async fn stitch(&self, segments: &[PathBuf], output: &Path) -> MediaResult<()>;
}

/// `AudioStitcher` using FFmpeg's concat demuxer.
#[derive(Debug, Clone)]
pub struct FfmpegAudioStitcher {
    runner: FfmpegRunner,
    codec: String,
    sample_rate: u32,
}

impl FfmpegAudioStitcher {
    pub fn new(runner: FfmpegRunner, codec: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            runner,
            codec: codec.into(),
            sample_rate,
        }
    }

    /// Concat list file written beside the output.
    pub fn list_path(output: &Path) -> PathBuf {
        let mut name = output
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".concat.txt");
        output.with_file_name(name)
    }

    pub fn build_command(&self, list: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(list, output)
            .input_args(["-f", "concat", "-safe", "0"])
            .no_video()
            .sample_rate(self.sample_rate)
            .audio_codec(&self.codec)
    }
}

#[async_trait]
impl AudioStitcher for FfmpegAudioStitcher {
    async fn stitch(&self, segments: &[PathBuf], output: &Path) -> MediaResult<()> {
        if segments.is_empty() {
            return Err(MediaError::invalid_argument("No narration segments to stitch"));
        }

        // Absolute paths: the demuxer resolves entries relative to the list file
        let mut absolute = Vec::with_capacity(segments.len());
        for segment in segments {
            if !segment.exists() {
                return Err(MediaError::FileNotFound(segment.clone()));
            }
            absolute.push(tokio::fs::canonicalize(segment).await?);
        }

        let list = Self::list_path(output);
        tokio::fs::write(&list, concat_list(&absolute)).await?;
        debug!(segments = segments.len(), list = %list.display(), "Stitching narration");

        let result = self.runner.run(&self.build_command(&list, output)).await;

        if let Err(e) = tokio::fs::remove_file(&list).await {
            warn!(list = %list.display(), "Failed to remove concat list: {}", e);
        }

        result
    }
}

/// Render a concat demuxer list.
pub fn concat_list(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|p| format!("file '{}'\n", p.to_string_lossy().replace('\'', "'\\''")))
        .collect()
}
