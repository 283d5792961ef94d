//! Per-line narration: synthesize, change tempo, measure, caption.

use autoshort_media::MediaError;
use autoshort_models::{CaptionOverlay, CaptionStyle, NarrationLine};
use std::path::PathBuf;
use tokio::sync::watch;

use crate::assets::TransientAssets;
use crate::engines::Engines;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::ClipLogger;

/// One narrated line with its assets and caption.
///
/// `caption.duration` is always the measured duration of `tempo_audio`.
#[derive(Debug, Clone)]
pub struct NarratedLine {
    pub line: NarrationLine,
    pub raw_audio: PathBuf,
    pub tempo_audio: PathBuf,
    /// Measured duration of `tempo_audio` in seconds
    pub duration: f64,
    pub caption: CaptionOverlay,
}

/// Settings shared by every line of a clip.
#[derive(Debug, Clone)]
pub struct NarrationSettings<'a> {
    pub lang: &'a str,
    pub tempo: f64,
    pub style: &'a CaptionStyle,
}

/// Narrate `lines` in order. Any failure aborts the remaining lines.
pub async fn narrate_lines(
    engines: &Engines,
    assets: &TransientAssets,
    lines: &[NarrationLine],
    settings: &NarrationSettings<'_>,
    logger: &ClipLogger,
    cancel_rx: Option<&watch::Receiver<bool>>,
) -> WorkerResult<Vec<NarratedLine>> {
    let story = logger.story();
    let mut narrated = Vec::with_capacity(lines.len());

    for (n, line) in lines.iter().enumerate() {
        if cancel_rx.is_some_and(|rx| *rx.borrow()) {
            return Err(WorkerError::synthesis(story, MediaError::Cancelled));
        }

        let raw_audio = assets.raw_audio(line.index);
        let tempo_audio = assets.tempo_audio(line.index);

        engines
            .synthesizer
            .synthesize(&line.text, settings.lang, &raw_audio)
            .await
            .map_err(|e| WorkerError::synthesis(story, e))?;

        engines
            .tempo
            .adjust(&raw_audio, &tempo_audio, settings.tempo)
            .await
            .map_err(|e| WorkerError::synthesis(story, e))?;

        let duration = engines
            .probe
            .duration(&tempo_audio)
            .await
            .map_err(|e| WorkerError::synthesis(story, e))?;

        logger.log_progress(
            "narration",
            &format!("line {} of {} is {:.3}s", n + 1, lines.len(), duration),
        );

        narrated.push(NarratedLine {
            caption: CaptionOverlay::new(line.text.clone(), settings.style.clone(), duration),
            line: line.clone(),
            raw_audio,
            tempo_audio,
            duration,
        });
    }

    Ok(narrated)
}
