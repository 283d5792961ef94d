//! Byte-counting engines: one byte of audio or video is 0.1s.

use async_trait::async_trait;
use autoshort_media::{
    AudioStitcher, CompositionPlan, Compositor, DurationProbe, MediaError, MediaResult,
    Synthesizer, TempoAdjuster,
};
use autoshort_worker::Engines;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const SECS_PER_BYTE: f64 = 0.1;

pub struct EchoSynthesizer {
    pub refuse: Option<&'static str>,
}

#[async_trait]
impl Synthesizer for EchoSynthesizer {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn synthesize(&self, text: &str, _lang: &str, output: &Path) -> MediaResult<()> {
        if self.refuse == Some(text) {
            return Err(MediaError::synthesis_failed("voice unavailable"));
        }
        tokio::fs::write(output, text).await?;
        Ok(())
    }
}

/// Copies the segment unchanged; tempo is covered by unit tests.
pub struct CopyTempo;

#[async_trait]
impl TempoAdjuster for CopyTempo {
    async fn adjust(&self, input: &Path, output: &Path, _factor: f64) -> MediaResult<()> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

pub struct SizeProbe;

#[async_trait]
impl DurationProbe for SizeProbe {
    async fn duration(&self, path: &Path) -> MediaResult<f64> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|_| MediaError::FileNotFound(path.to_path_buf()))?;
        Ok(meta.len() as f64 * SECS_PER_BYTE)
    }
}

pub struct ConcatStitcher;

#[async_trait]
impl AudioStitcher for ConcatStitcher {
    async fn stitch(&self, segments: &[PathBuf], output: &Path) -> MediaResult<()> {
        let mut track = Vec::new();
        for segment in segments {
            track.extend(tokio::fs::read(segment).await?);
        }
        tokio::fs::write(output, track).await?;
        Ok(())
    }
}

/// Writes the caption timeline as the "video" and keeps the plan.
#[derive(Default)]
pub struct TimelineCompositor {
    pub plans: Mutex<Vec<CompositionPlan>>,
}

#[async_trait]
impl Compositor for TimelineCompositor {
    async fn compose(&self, plan: &CompositionPlan) -> MediaResult<()> {
        let timeline: Vec<String> = plan
            .captions
            .timeline()
            .into_iter()
            .zip(plan.captions.overlays())
            .map(|((start, end), overlay)| format!("{:.1}-{:.1} {}", start, end, overlay.text))
            .collect();
        tokio::fs::write(&plan.output, timeline.join("\n")).await?;
        self.plans.lock().unwrap().push(plan.clone());
        Ok(())
    }
}

pub fn engines(refuse: Option<&'static str>, compositor: Arc<TimelineCompositor>) -> Engines {
    Engines {
        synthesizer: Arc::new(EchoSynthesizer { refuse }),
        tempo: Arc::new(CopyTempo),
        probe: Arc::new(SizeProbe),
        stitcher: Arc::new(ConcatStitcher),
        compositor,
    }
}

/// Directory entries, for leftover checks.
pub fn entries(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(rd) => rd
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}
