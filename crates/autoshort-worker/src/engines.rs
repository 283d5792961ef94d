//! Engine wiring.
//!
//! The pipeline only sees the capability traits; this module picks the
//! concrete implementations from configuration.

use autoshort_media::{
    AudioStitcher, CommandSynthesizer, Compositor, DurationProbe, FfmpegAudioStitcher,
    FfmpegCompositor, FfmpegRunner, FfmpegTempoAdjuster, FfprobeDurationProbe, GoogleTranslateTts,
    Synthesizer, TempoAdjuster,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::config::{TtsEngine, WorkerConfig};
use crate::error::{WorkerError, WorkerResult};

/// The engines one clip run calls into.
#[derive(Clone)]
pub struct Engines {
    pub synthesizer: Arc<dyn Synthesizer>,
    pub tempo: Arc<dyn TempoAdjuster>,
    pub probe: Arc<dyn DurationProbe>,
    pub stitcher: Arc<dyn AudioStitcher>,
    pub compositor: Arc<dyn Compositor>,
}

impl std::fmt::Debug for Engines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engines")
            .field("synthesizer", &self.synthesizer.name())
            .finish_non_exhaustive()
    }
}

impl Engines {
    /// Build the FFmpeg-backed engines plus the configured synthesizer.
    ///
    /// Every FFmpeg, ffprobe and TTS invocation observes `cancel_rx` and its
    /// configured timeout.
    pub fn from_config(config: &WorkerConfig, cancel_rx: watch::Receiver<bool>) -> WorkerResult<Self> {
        let runner = FfmpegRunner::new()
            .with_cancel(cancel_rx.clone())
            .with_optional_timeout(config.ffmpeg_timeout.map(|t| t.as_secs()));

        let synthesizer: Arc<dyn Synthesizer> = match config.tts_engine {
            TtsEngine::Google => Arc::new(
                GoogleTranslateTts::new(&config.tts_tld, config.tts_timeout)
                    .map_err(|e| WorkerError::config(e.to_string()))?
                    .with_cancel(cancel_rx),
            ),
            TtsEngine::Command => {
                let program = config.tts_command.clone().ok_or_else(|| {
                    WorkerError::config("AUTOSHORT_TTS_COMMAND is required for the command engine")
                })?;
                Arc::new(
                    CommandSynthesizer::new(program, config.tts_args.clone())
                        .with_timeout(config.tts_timeout)
                        .with_cancel(cancel_rx),
                )
            }
        };

        let encoding = config.encoding();
        let engines = Self {
            synthesizer,
            tempo: Arc::new(FfmpegTempoAdjuster::new(runner.clone())),
            probe: Arc::new(FfprobeDurationProbe::new(runner.clone())),
            stitcher: Arc::new(FfmpegAudioStitcher::new(
                runner.clone(),
                encoding.narration_codec,
                encoding.sample_rate,
            )),
            compositor: Arc::new(FfmpegCompositor::new(runner)),
        };

        info!(synthesizer = engines.synthesizer.name(), "Engines ready");
        Ok(engines)
    }
}
