//! Single-clip pipeline.
//!
//! Stages run strictly in order inside one `TransientAssets` scope:
//! narration per line, stitching, window selection, composition, publish.
//! Assets are released on every exit path.

use autoshort_media::{fs_utils::move_file, select_window, BannerConfig, CompositionPlan};
use autoshort_models::{BackgroundWindow, CaptionTrack, ClipOptions, StoryText};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

use crate::assets::TransientAssets;
use crate::engines::Engines;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::ClipLogger;
use crate::narration::{narrate_lines, NarrationSettings};

/// Random source shared by background and window selection.
pub type SharedRng = Arc<Mutex<StdRng>>;

/// Seeded when `seed` is set, otherwise from OS entropy.
pub fn shared_rng(seed: Option<u64>) -> SharedRng {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    Arc::new(Mutex::new(rng))
}

/// Allowed gap between the stitched track's probed length and the segment sum.
const STITCH_TOLERANCE_SECS: f64 = 0.05;

/// Outcome of one successful clip.
#[derive(Debug, Clone)]
pub struct ClipReport {
    pub story: String,
    pub run_id: Uuid,
    /// Narrated lines in playback order
    pub lines: Vec<String>,
    /// Measured tempo-adjusted duration per line
    pub durations: Vec<f64>,
    /// Sum of `durations`
    pub narration_duration: f64,
    pub window: BackgroundWindow,
    pub background: PathBuf,
    pub output: PathBuf,
    pub completed_at: DateTime<Utc>,
}

/// Runs one story through the whole pipeline.
#[derive(Debug, Clone)]
pub struct ClipPipeline {
    engines: Engines,
    options: ClipOptions,
    temp_dir: PathBuf,
    work_dir: PathBuf,
    fonts_dir: Option<PathBuf>,
    rng: SharedRng,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl ClipPipeline {
    pub fn new(
        engines: Engines,
        options: ClipOptions,
        temp_dir: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        rng: SharedRng,
    ) -> Self {
        Self {
            engines,
            options,
            temp_dir: temp_dir.into(),
            work_dir: work_dir.into(),
            fonts_dir: None,
            rng,
            cancel_rx: None,
        }
    }

    pub fn with_fonts_dir(mut self, fonts_dir: Option<PathBuf>) -> Self {
        self.fonts_dir = fonts_dir;
        self
    }

    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    pub fn options(&self) -> &ClipOptions {
        &self.options
    }

    pub fn rng(&self) -> &SharedRng {
        &self.rng
    }

    /// Produce the clip for `story` over `background` at `output`.
    pub async fn run(&self, story: &StoryText, background: &Path, output: &Path) -> WorkerResult<ClipReport> {
        let assets = TransientAssets::acquire(&self.temp_dir, &self.work_dir).await?;
        let logger = ClipLogger::new(&story.id, assets.run_id());
        let span = logger.create_span();

        let result = self
            .run_stages(&assets, &logger, story, background, output)
            .instrument(span)
            .await;

        if let Err(e) = &result {
            logger.log_error(e.stage(), &e.to_string());
        }

        match assets.release().await {
            Ok(removed) => debug!(story = %story.id, removed, "Transient assets cleaned up"),
            Err(e) => warn!(story = %story.id, "Failed to clean up transient assets: {}", e),
        }

        result
    }

    async fn run_stages(
        &self,
        assets: &TransientAssets,
        logger: &ClipLogger,
        story: &StoryText,
        background: &Path,
        output: &Path,
    ) -> WorkerResult<ClipReport> {
        let lines = story.lines();
        if lines.is_empty() {
            return Err(WorkerError::input_not_found(format!(
                "story {} has no narration lines",
                story.id
            )));
        }
        logger.log_start(&format!("{} lines, background {}", lines.len(), background.display()));

        let settings = NarrationSettings {
            lang: &self.options.lang,
            tempo: self.options.tempo,
            style: &self.options.caption_style,
        };
        let narrated = narrate_lines(
            &self.engines,
            assets,
            &lines,
            &settings,
            logger,
            self.cancel_rx.as_ref(),
        )
        .await?;

        // Stitch
        let segments: Vec<PathBuf> = narrated.iter().map(|n| n.tempo_audio.clone()).collect();
        let durations: Vec<f64> = narrated.iter().map(|n| n.duration).collect();
        let narration_duration: f64 = durations.iter().sum();

        self.engines
            .stitcher
            .stitch(&segments, assets.stitched_track())
            .await
            .map_err(|e| WorkerError::composition(&story.id, e))?;

        let stitched_duration = self
            .engines
            .probe
            .duration(assets.stitched_track())
            .await
            .map_err(|e| WorkerError::composition(&story.id, e))?;
        if (stitched_duration - narration_duration).abs() > STITCH_TOLERANCE_SECS {
            logger.log_warning(&format!(
                "stitched track is {:.3}s, segments sum to {:.3}s",
                stitched_duration, narration_duration
            ));
        }
        logger.log_progress("stitch", &format!("narration is {:.3}s", narration_duration));

        // Window
        let required = self.options.output_duration(narration_duration);
        let total = self
            .engines
            .probe
            .duration(background)
            .await
            .map_err(|e| WorkerError::composition(&story.id, e))?;
        let window = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            select_window(total, required, &mut *rng)
        }
        .map_err(|e| WorkerError::composition(&story.id, e))?;
        logger.log_progress(
            "window",
            &format!("{:.3}s..{:.3}s of {:.3}s", window.offset, window.end(), total),
        );

        // Compose
        let captions: CaptionTrack = narrated.iter().map(|n| n.caption.clone()).collect();
        let plan = CompositionPlan {
            background: background.to_path_buf(),
            window,
            banner: self
                .options
                .banner
                .as_ref()
                .map(|path| BannerConfig::new(path).with_scale(self.options.banner_scale)),
            captions,
            captions_path: assets.captions(),
            narration: assets.stitched_track().to_path_buf(),
            output: assets.encoded_output(),
            aspect: self.options.aspect,
            encoding: self.options.encoding.clone(),
            fonts_dir: self.fonts_dir.clone(),
        };

        if self.is_cancelled() {
            return Err(WorkerError::composition(&story.id, autoshort_media::MediaError::Cancelled));
        }

        self.engines
            .compositor
            .compose(&plan)
            .await
            .map_err(|e| WorkerError::composition(&story.id, e))?;

        // Publish only a complete encode
        move_file(&plan.output, output)
            .await
            .map_err(|e| WorkerError::composition(&story.id, e))?;

        logger.log_completion(&format!("{} ({:.3}s)", output.display(), window.duration));

        Ok(ClipReport {
            story: story.id.clone(),
            run_id: assets.run_id(),
            lines: narrated.iter().map(|n| n.line.text.clone()).collect(),
            durations,
            narration_duration,
            window,
            background: background.to_path_buf(),
            output: output.to_path_buf(),
            completed_at: Utc::now(),
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
