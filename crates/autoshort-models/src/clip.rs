//! Clip options and the background window model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{AspectRatio, CaptionStyle, EncodingConfig};

/// Default synthesis language.
pub const DEFAULT_LANG: &str = "en";
/// Default playback-speed multiplier applied to every narration segment.
pub const DEFAULT_TEMPO: f64 = 1.5;
/// Default banner scale relative to its natural size.
pub const DEFAULT_BANNER_SCALE: f64 = 0.8;

/// Per-clip options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipOptions {
    /// Language code passed to speech synthesis
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Tempo multiplier for narration segments
    #[serde(default = "default_tempo")]
    pub tempo: f64,

    /// Output duration override in seconds; defaults to the narration length
    #[serde(default)]
    pub duration_override: Option<f64>,

    /// Banner image shown centered for the whole clip
    #[serde(default)]
    pub banner: Option<PathBuf>,

    /// Banner scale relative to its natural size
    #[serde(default = "default_banner_scale")]
    pub banner_scale: f64,

    /// Output aspect ratio
    #[serde(default)]
    pub aspect: AspectRatio,

    /// Caption styling
    #[serde(default)]
    pub caption_style: CaptionStyle,

    /// Encoding settings
    #[serde(default)]
    pub encoding: EncodingConfig,
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}
fn default_tempo() -> f64 {
    DEFAULT_TEMPO
}
fn default_banner_scale() -> f64 {
    DEFAULT_BANNER_SCALE
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            tempo: DEFAULT_TEMPO,
            duration_override: None,
            banner: None,
            banner_scale: DEFAULT_BANNER_SCALE,
            aspect: AspectRatio::PORTRAIT,
            caption_style: CaptionStyle::default(),
            encoding: EncodingConfig::default(),
        }
    }
}

impl ClipOptions {
    /// Output duration: the override when set, otherwise the narration length.
    pub fn output_duration(&self, narration_duration: f64) -> f64 {
        self.duration_override.unwrap_or(narration_duration)
    }
}

/// A contiguous sub-range of a background video.
///
/// Invariant: `0 <= offset` and `offset + duration <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BackgroundWindow {
    /// Start of the window in seconds
    pub offset: f64,
    /// Window length in seconds
    pub duration: f64,
    /// Total length of the background video in seconds
    pub total: f64,
}

impl BackgroundWindow {
    /// End of the window in seconds.
    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }
}
