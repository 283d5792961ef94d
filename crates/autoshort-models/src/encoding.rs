//! Output encoding configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default audio codec for the final clip
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default codec for the stitched narration track
pub const DEFAULT_NARRATION_CODEC: &str = "libmp3lame";
/// Sample rate of the stitched narration track
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Encoding configuration.
///
/// The video codec is left to FFmpeg's default for the output container
/// unless one is set explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264"); `None` keeps the engine default
    #[serde(default)]
    pub video_codec: Option<String>,

    /// Audio codec of the final clip
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Optional audio bitrate (e.g., "128k")
    #[serde(default)]
    pub audio_bitrate: Option<String>,

    /// Codec used when writing the stitched narration track
    #[serde(default = "default_narration_codec")]
    pub narration_codec: String,

    /// Sample rate of the stitched narration track
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_narration_codec() -> String {
    DEFAULT_NARRATION_CODEC.to_string()
}
fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_codec: None,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: None,
            narration_codec: DEFAULT_NARRATION_CODEC.to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl EncodingConfig {
    /// Create a new encoding configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit video codec.
    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    /// Use a different audio codec for the final clip.
    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = codec.into();
        self
    }

    /// Set the audio bitrate of the final clip.
    pub fn with_audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.audio_bitrate = Some(bitrate.into());
        self
    }

    /// Convert to FFmpeg output arguments for the final clip.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(codec) = &self.video_codec {
            args.extend(["-c:v".to_string(), codec.clone()]);
        }

        args.extend(["-c:a".to_string(), self.audio_codec.clone()]);

        if let Some(bitrate) = &self.audio_bitrate {
            args.extend(["-b:a".to_string(), bitrate.clone()]);
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncodingConfig::default();
        assert_eq!(config.audio_codec, "aac");
        assert_eq!(config.sample_rate, 44_100);
        assert!(config.video_codec.is_none());
    }

    #[test]
    fn test_ffmpeg_args_default_leaves_video_codec_to_engine() {
        let args = EncodingConfig::default().to_ffmpeg_args();
        assert_eq!(args, vec!["-c:a".to_string(), "aac".to_string()]);
    }

    #[test]
    fn test_ffmpeg_args_with_video_codec() {
        let config = EncodingConfig::default().with_video_codec("libx264");
        let args = config.to_ffmpeg_args();
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"libx264".to_string()));
    }

    #[test]
    fn test_ffmpeg_args_with_audio_bitrate() {
        let args = EncodingConfig::default().with_audio_bitrate("96k").to_ffmpeg_args();
        assert_eq!(args, vec!["-c:a", "aac", "-b:a", "96k"]);
    }
}
