//! In-process fakes for the media engines.
//!
//! Durations are derived from file sizes (`SECS_PER_BYTE` per byte), so a
//! stitched track's probed length is exactly the sum of its segments.

use async_trait::async_trait;
use autoshort_media::{
    AudioStitcher, CompositionPlan, Compositor, DurationProbe, MediaError, MediaResult,
    Synthesizer, TempoAdjuster,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::engines::Engines;

pub const SECS_PER_BYTE: f64 = 0.0625;

#[derive(Debug, Default)]
pub struct FakeSynthesizer {
    fail_on: Option<String>,
}

impl FakeSynthesizer {
    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
        }
    }
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn synthesize(&self, text: &str, _lang: &str, output: &Path) -> MediaResult<()> {
        if self.fail_on.as_deref() == Some(text) {
            return Err(MediaError::synthesis_failed(format!("refused: {}", text)));
        }
        // Two "bytes of speech" per character
        tokio::fs::write(output, text.repeat(2)).await?;
        Ok(())
    }
}

/// Writes `len / factor` bytes, rounded up.
#[derive(Debug, Default)]
pub struct FakeTempo;

#[async_trait]
impl TempoAdjuster for FakeTempo {
    async fn adjust(&self, input: &Path, output: &Path, factor: f64) -> MediaResult<()> {
        let bytes = tokio::fs::read(input).await?;
        let len = (bytes.len() as f64 / factor).ceil().max(1.0) as usize;
        tokio::fs::write(output, vec![b'a'; len]).await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeProbe {
    fixed: Mutex<HashMap<PathBuf, f64>>,
}

impl FakeProbe {
    pub fn with_duration(self, path: impl Into<PathBuf>, secs: f64) -> Self {
        self.fixed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), secs);
        self
    }
}

#[async_trait]
impl DurationProbe for FakeProbe {
    async fn duration(&self, path: &Path) -> MediaResult<f64> {
        if let Some(secs) = self.fixed.lock().unwrap_or_else(|e| e.into_inner()).get(path) {
            return Ok(*secs);
        }
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|_| MediaError::FileNotFound(path.to_path_buf()))?;
        Ok(meta.len() as f64 * SECS_PER_BYTE)
    }
}

#[derive(Debug, Default)]
pub struct FakeStitcher;

#[async_trait]
impl AudioStitcher for FakeStitcher {
    async fn stitch(&self, segments: &[PathBuf], output: &Path) -> MediaResult<()> {
        if segments.is_empty() {
            return Err(MediaError::invalid_argument("No narration segments to stitch"));
        }
        let mut track = Vec::new();
        for segment in segments {
            track.extend(tokio::fs::read(segment).await?);
        }
        tokio::fs::write(output, track).await?;
        Ok(())
    }
}

/// Records every plan and writes a placeholder clip.
#[derive(Debug, Default)]
pub struct FakeCompositor {
    pub plans: Mutex<Vec<CompositionPlan>>,
    pub fail: bool,
}

impl FakeCompositor {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn plans(&self) -> Vec<CompositionPlan> {
        self.plans.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Compositor for FakeCompositor {
    async fn compose(&self, plan: &CompositionPlan) -> MediaResult<()> {
        self.plans
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(plan.clone());
        // Partial output, as an interrupted encode would leave it
        tokio::fs::write(&plan.output, b"partial").await?;
        if self.fail {
            return Err(MediaError::ffmpeg_failed("encoder exploded", None, Some(1)));
        }
        tokio::fs::write(&plan.output, format!("{:.3}", plan.duration())).await?;
        Ok(())
    }
}

pub fn fake_engines() -> Engines {
    engines_with(Arc::new(FakeProbe::default()), Arc::new(FakeCompositor::default()))
}

pub fn engines_with(probe: Arc<FakeProbe>, compositor: Arc<FakeCompositor>) -> Engines {
    Engines {
        synthesizer: Arc::new(FakeSynthesizer::default()),
        tempo: Arc::new(FakeTempo),
        probe,
        stitcher: Arc::new(FakeStitcher),
        compositor,
    }
}
