//! Final clip composition.
//!
//! One FFmpeg invocation takes the background window, crops it to the
//! output aspect, overlays the optional banner, burns in the caption track
//! and muxes the stitched narration as the only audio stream.

use async_trait::async_trait;
use autoshort_models::{AspectRatio, BackgroundWindow, CaptionTrack, CropRect, EncodingConfig};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::banner::BannerConfig;
use crate::captions::write_ass_script;
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{composition_filter, OUTPUT_LABEL};
use crate::probe::probe_video_with;

/// Everything needed to render one clip.
#[derive(Debug, Clone)]
pub struct CompositionPlan {
    /// Background video
    pub background: PathBuf,
    /// Sub-range of the background to use; its duration is the clip length
    pub window: BackgroundWindow,
    /// Optional centered banner
    pub banner: Option<BannerConfig>,
    /// Captions shown back-to-back from t = 0
    pub captions: CaptionTrack,
    /// Where the caption script is written
    pub captions_path: PathBuf,
    /// Stitched narration track
    pub narration: PathBuf,
    /// Output video path
    pub output: PathBuf,
    /// Output aspect ratio
    pub aspect: AspectRatio,
    pub encoding: EncodingConfig,
    /// Extra font directory handed to libass
    pub fonts_dir: Option<PathBuf>,
}

impl CompositionPlan {
    /// Output length in seconds.
    pub fn duration(&self) -> f64 {
        self.window.duration
    }

    /// Build the FFmpeg command for this plan given the computed crop.
    pub fn build_command(&self, crop: &CropRect) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(&self.background, &self.output)
            .seek(self.window.offset)
            .duration(self.window.duration);

        let banner = match &self.banner {
            Some(config) => {
                cmd = cmd.input(config.image_path());
                Some((config, cmd.input_count() - 1))
            }
            None => None,
        };

        cmd = cmd.input(&self.narration);
        let narration_input = cmd.input_count() - 1;

        let filter = composition_filter(
            crop,
            banner,
            &self.captions_path,
            self.fonts_dir.as_deref(),
        );

        cmd.filter_complex(filter)
            .map(format!("[{}]", OUTPUT_LABEL))
            .map(format!("{}:a:0", narration_input))
            .output_duration(self.duration())
            .output_args(self.encoding.to_ffmpeg_args())
    }
}

/// Renders a composition plan into a finished clip.
#[async_trait]
pub trait Compositor: Send + Sync {
    async fn compose(&self, plan: &CompositionPlan) -> MediaResult<()>;
}

/// `Compositor` backed by FFmpeg.
#[derive(Debug, Clone, Default)]
pub struct FfmpegCompositor {
    runner: FfmpegRunner,
}

impl FfmpegCompositor {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Compositor for FfmpegCompositor {
    async fn compose(&self, plan: &CompositionPlan) -> MediaResult<()> {
        if !plan.narration.exists() {
            return Err(MediaError::FileNotFound(plan.narration.clone()));
        }
        if let Some(banner) = &plan.banner {
            banner.validate()?;
        }

        let info = probe_video_with(&plan.background, &self.runner).await?;
        let crop = CropRect::centered(info.width, info.height, plan.aspect);
        if crop.clamped {
            warn!(
                background = %plan.background.display(),
                source_width = info.width,
                crop_width = crop.width,
                "Background is narrower than the output aspect, using full width"
            );
        }

        write_ass_script(&plan.captions, crop.width, crop.height, &plan.captions_path).await?;

        let cmd = plan.build_command(&crop);
        let total = plan.duration();
        info!(
            output = %plan.output.display(),
            offset = plan.window.offset,
            duration = total,
            captions = plan.captions.len(),
            "Composing clip"
        );

        self.runner
            .run_with_progress(&cmd, move |progress| {
                debug!(
                    percent = progress.percentage(total),
                    speed = progress.speed,
                    "Composition progress"
                );
            })
            .await?;

        info!(output = %plan.output.display(), "Clip composed");
        Ok(())
    }
}
