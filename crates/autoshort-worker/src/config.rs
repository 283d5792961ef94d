//! Worker configuration.

use autoshort_media::synth::DEFAULT_TLD;
use autoshort_models::caption::{
    DEFAULT_CAPTION_FONT, DEFAULT_CAPTION_SIZE, DEFAULT_OFFSET_Y, DEFAULT_WRAP_WIDTH,
};
use autoshort_models::encoding::DEFAULT_AUDIO_CODEC;
use autoshort_models::{
    AspectRatio, CaptionStyle, ClipOptions, EncodingConfig, DEFAULT_LANG, DEFAULT_TEMPO,
};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

/// Speech synthesis backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TtsEngine {
    /// Google Translate voice over HTTPS
    #[default]
    Google,
    /// Local program reading text on stdin
    Command,
}

impl FromStr for TtsEngine {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "gtts" => Ok(TtsEngine::Google),
            "command" | "cmd" => Ok(TtsEngine::Command),
            other => Err(WorkerError::config(format!("Unknown TTS engine: {}", other))),
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory holding story text files
    pub stories_dir: PathBuf,
    /// File name prefix a story file must carry
    pub story_prefix: String,
    /// Story file extension (without the dot)
    pub story_extension: String,
    /// Directory holding candidate background videos
    pub backgrounds_dir: PathBuf,
    pub background_extension: String,
    /// Where finished clips are written
    pub results_dir: PathBuf,
    /// Transient per-run assets
    pub temp_dir: PathBuf,
    /// Location of the stitched narration track
    pub work_dir: PathBuf,
    /// Language code passed to synthesis
    pub lang: String,
    pub tts_engine: TtsEngine,
    /// Regional domain for the Google voice
    pub tts_tld: String,
    /// Program for the command engine
    pub tts_command: Option<String>,
    /// Arguments for the command engine; `{output}` and `{lang}` are substituted
    pub tts_args: Vec<String>,
    /// Narration tempo multiplier
    pub tempo: f64,
    /// Output duration override in seconds
    pub duration_override: Option<f64>,
    /// Optional centered banner image
    pub banner: Option<PathBuf>,
    /// Output aspect ratio, `W:H`
    pub aspect: AspectRatio,
    pub caption_font: String,
    pub caption_size: u32,
    pub caption_wrap_width: u32,
    pub caption_offset_y: u32,
    /// Extra font directory for caption rendering
    pub fonts_dir: Option<PathBuf>,
    /// Kill FFmpeg after this long
    pub ffmpeg_timeout: Option<Duration>,
    /// Abort one synthesis call after this long
    pub tts_timeout: Option<Duration>,
    pub video_codec: Option<String>,
    pub audio_codec: String,
    /// Audio bitrate of the final clip, e.g. `128k`
    pub audio_bitrate: Option<String>,
    /// Seed for background and window selection; random when unset
    pub seed: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            stories_dir: PathBuf::from("Stories"),
            story_prefix: "Story_".to_string(),
            story_extension: "txt".to_string(),
            backgrounds_dir: PathBuf::from("BackGroundVideos"),
            background_extension: "webm".to_string(),
            results_dir: PathBuf::from("Results"),
            temp_dir: PathBuf::from("temp_assets"),
            work_dir: PathBuf::from("."),
            lang: DEFAULT_LANG.to_string(),
            tts_engine: TtsEngine::Google,
            tts_tld: DEFAULT_TLD.to_string(),
            tts_command: None,
            tts_args: Vec::new(),
            tempo: DEFAULT_TEMPO,
            duration_override: None,
            banner: None,
            aspect: AspectRatio::PORTRAIT,
            caption_font: DEFAULT_CAPTION_FONT.to_string(),
            caption_size: DEFAULT_CAPTION_SIZE,
            caption_wrap_width: DEFAULT_WRAP_WIDTH,
            caption_offset_y: DEFAULT_OFFSET_Y,
            fonts_dir: None,
            ffmpeg_timeout: None,
            tts_timeout: Some(Duration::from_secs(30)),
            video_codec: None,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: None,
            seed: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup.
    ///
    /// Unset or blank keys keep their defaults; a value that does not parse is
    /// a config error naming the key.
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            stories_dir: get("AUTOSHORT_STORIES_DIR").map(PathBuf::from).unwrap_or(defaults.stories_dir),
            story_prefix: get("AUTOSHORT_STORY_PREFIX").unwrap_or(defaults.story_prefix),
            story_extension: get("AUTOSHORT_STORY_EXTENSION").unwrap_or(defaults.story_extension),
            backgrounds_dir: get("AUTOSHORT_BACKGROUNDS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.backgrounds_dir),
            background_extension: get("AUTOSHORT_BACKGROUND_EXTENSION")
                .unwrap_or(defaults.background_extension),
            results_dir: get("AUTOSHORT_RESULTS_DIR").map(PathBuf::from).unwrap_or(defaults.results_dir),
            temp_dir: get("AUTOSHORT_TEMP_DIR").map(PathBuf::from).unwrap_or(defaults.temp_dir),
            work_dir: get("AUTOSHORT_WORK_DIR").map(PathBuf::from).unwrap_or(defaults.work_dir),
            lang: get("AUTOSHORT_LANG").unwrap_or(defaults.lang),
            tts_engine: parse_var(&get, "AUTOSHORT_TTS_ENGINE")?.unwrap_or(defaults.tts_engine),
            tts_tld: get("AUTOSHORT_TTS_TLD").unwrap_or(defaults.tts_tld),
            tts_command: get("AUTOSHORT_TTS_COMMAND"),
            tts_args: get("AUTOSHORT_TTS_ARGS")
                .map(|v| v.split_whitespace().map(String::from).collect())
                .unwrap_or(defaults.tts_args),
            tempo: parse_var(&get, "AUTOSHORT_TEMPO")?.unwrap_or(defaults.tempo),
            duration_override: parse_var(&get, "AUTOSHORT_DURATION")?,
            banner: get("AUTOSHORT_BANNER").map(PathBuf::from),
            aspect: parse_var(&get, "AUTOSHORT_ASPECT")?.unwrap_or(defaults.aspect),
            caption_font: get("AUTOSHORT_CAPTION_FONT").unwrap_or(defaults.caption_font),
            caption_size: parse_var(&get, "AUTOSHORT_CAPTION_SIZE")?.unwrap_or(defaults.caption_size),
            caption_wrap_width: parse_var(&get, "AUTOSHORT_CAPTION_WRAP_WIDTH")?
                .unwrap_or(defaults.caption_wrap_width),
            caption_offset_y: parse_var(&get, "AUTOSHORT_CAPTION_OFFSET_Y")?
                .unwrap_or(defaults.caption_offset_y),
            fonts_dir: get("AUTOSHORT_FONTS_DIR").map(PathBuf::from),
            ffmpeg_timeout: parse_var(&get, "AUTOSHORT_FFMPEG_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .or(defaults.ffmpeg_timeout),
            tts_timeout: parse_var(&get, "AUTOSHORT_TTS_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .or(defaults.tts_timeout),
            video_codec: get("AUTOSHORT_VIDEO_CODEC"),
            audio_codec: get("AUTOSHORT_AUDIO_CODEC").unwrap_or(defaults.audio_codec),
            audio_bitrate: get("AUTOSHORT_AUDIO_BITRATE"),
            seed: parse_var(&get, "AUTOSHORT_SEED")?,
        })
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> WorkerResult<()> {
        if !self.tempo.is_finite() || self.tempo <= 0.0 {
            return Err(WorkerError::config(format!(
                "AUTOSHORT_TEMPO must be positive, got {}",
                self.tempo
            )));
        }
        if let Some(d) = self.duration_override {
            if !d.is_finite() || d <= 0.0 {
                return Err(WorkerError::config(format!(
                    "AUTOSHORT_DURATION must be positive, got {}",
                    d
                )));
            }
        }
        if self.tts_engine == TtsEngine::Command && self.tts_command.is_none() {
            return Err(WorkerError::config(
                "AUTOSHORT_TTS_COMMAND is required when AUTOSHORT_TTS_ENGINE=command",
            ));
        }
        if self.caption_size == 0 {
            return Err(WorkerError::config("AUTOSHORT_CAPTION_SIZE must be positive"));
        }
        if !self.aspect.is_valid() {
            return Err(WorkerError::config(format!(
                "AUTOSHORT_ASPECT must have non-zero sides, got {}",
                self.aspect
            )));
        }
        if let Some(banner) = &self.banner {
            if !banner.is_file() {
                return Err(WorkerError::config(format!(
                    "AUTOSHORT_BANNER {} does not exist",
                    banner.display()
                )));
            }
        }
        Ok(())
    }

    pub fn caption_style(&self) -> CaptionStyle {
        CaptionStyle::default()
            .with_font(&self.caption_font)
            .with_size(self.caption_size)
            .with_wrap_width(self.caption_wrap_width)
            .with_offset_y(self.caption_offset_y)
    }

    pub fn encoding(&self) -> EncodingConfig {
        let mut encoding = EncodingConfig::new().with_audio_codec(&self.audio_codec);
        if let Some(codec) = &self.video_codec {
            encoding = encoding.with_video_codec(codec);
        }
        if let Some(bitrate) = &self.audio_bitrate {
            encoding = encoding.with_audio_bitrate(bitrate);
        }
        encoding
    }

    /// Per-clip options derived from this config.
    pub fn clip_options(&self) -> ClipOptions {
        ClipOptions {
            lang: self.lang.clone(),
            tempo: self.tempo,
            duration_override: self.duration_override,
            banner: self.banner.clone(),
            aspect: self.aspect,
            caption_style: self.caption_style(),
            encoding: self.encoding(),
            ..ClipOptions::default()
        }
    }
}

/// Parse `key` when set; a malformed value is a config error.
fn parse_var<T, G>(get: &G, key: &str) -> WorkerResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| {
                WorkerError::config(format!("{} has invalid value {:?}: {}", key, value, e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> WorkerConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    fn config_err(pairs: &[(&str, &str)]) -> WorkerError {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_lookup(|key| map.get(key).cloned()).unwrap_err()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.stories_dir, PathBuf::from("Stories"));
        assert_eq!(config.story_prefix, "Story_");
        assert_eq!(config.background_extension, "webm");
        assert_eq!(config.temp_dir, PathBuf::from("temp_assets"));
        assert_eq!(config.lang, "en");
        assert_eq!(config.tts_engine, TtsEngine::Google);
        assert_eq!(config.tts_tld, "ca");
        assert!((config.tempo - 1.5).abs() < f64::EPSILON);
        assert!(config.duration_override.is_none());
        assert_eq!(config.audio_codec, "aac");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("AUTOSHORT_TEMPO", "1.25"),
            ("AUTOSHORT_DURATION", "45"),
            ("AUTOSHORT_TTS_ENGINE", "command"),
            ("AUTOSHORT_TTS_COMMAND", "piper"),
            ("AUTOSHORT_TTS_ARGS", "--model en.onnx --output_file {output}"),
            ("AUTOSHORT_CAPTION_SIZE", "72"),
            ("AUTOSHORT_FFMPEG_TIMEOUT_SECS", "600"),
            ("AUTOSHORT_SEED", "42"),
        ]);
        assert!((config.tempo - 1.25).abs() < f64::EPSILON);
        assert_eq!(config.duration_override, Some(45.0));
        assert_eq!(config.tts_engine, TtsEngine::Command);
        assert_eq!(config.tts_args, vec!["--model", "en.onnx", "--output_file", "{output}"]);
        assert_eq!(config.caption_size, 72);
        assert_eq!(config.ffmpeg_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.seed, Some(42));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = config_from(&[("AUTOSHORT_CAPTION_SIZE", ""), ("AUTOSHORT_TTS_ENGINE", "  ")]);
        assert_eq!(config.caption_size, 64);
        assert_eq!(config.tts_engine, TtsEngine::Google);
    }

    #[test]
    fn test_unknown_tts_engine_is_rejected() {
        let err = config_err(&[("AUTOSHORT_TTS_ENGINE", "piper")]);
        assert!(matches!(err, WorkerError::Config(_)));
        assert!(err.to_string().contains("AUTOSHORT_TTS_ENGINE"));
        assert!(err.to_string().contains("piper"));
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        assert!(config_err(&[("AUTOSHORT_TEMPO", "fast")]).to_string().contains("AUTOSHORT_TEMPO"));
        assert!(config_err(&[("AUTOSHORT_CAPTION_SIZE", "-3")]).to_string().contains("AUTOSHORT_CAPTION_SIZE"));
        assert!(config_err(&[("AUTOSHORT_SEED", "abc")]).to_string().contains("AUTOSHORT_SEED"));
    }

    #[test]
    fn test_aspect_setting() {
        let config = config_from(&[("AUTOSHORT_ASPECT", "4:5")]);
        assert_eq!(config.aspect, AspectRatio::new(4, 5));
        assert_eq!(config.clip_options().aspect, AspectRatio::new(4, 5));

        assert!(config_err(&[("AUTOSHORT_ASPECT", "0:16")]).to_string().contains("AUTOSHORT_ASPECT"));
        assert!(config_err(&[("AUTOSHORT_ASPECT", "tall")]).to_string().contains("AUTOSHORT_ASPECT"));
    }

    #[test]
    fn test_audio_bitrate_reaches_encoding() {
        let config = config_from(&[("AUTOSHORT_AUDIO_BITRATE", "128k")]);
        let args = config.clip_options().encoding.to_ffmpeg_args();
        assert_eq!(args, vec!["-c:a", "aac", "-b:a", "128k"]);
    }

    #[test]
    fn test_missing_banner_fails_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("banner.png");
        let config = WorkerConfig {
            banner: Some(missing.clone()),
            ..WorkerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("AUTOSHORT_BANNER"));

        std::fs::write(&missing, b"png").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(config_from(&[("AUTOSHORT_TEMPO", "0")]).validate().is_err());
        assert!(config_from(&[("AUTOSHORT_TEMPO", "-1.5")]).validate().is_err());
        assert!(config_from(&[("AUTOSHORT_DURATION", "0")]).validate().is_err());
        assert!(config_from(&[("AUTOSHORT_TTS_ENGINE", "command")]).validate().is_err());
    }

    #[test]
    fn test_engine_parse() {
        assert_eq!("Google".parse::<TtsEngine>().unwrap(), TtsEngine::Google);
        assert_eq!("command".parse::<TtsEngine>().unwrap(), TtsEngine::Command);
        assert!("espeak".parse::<TtsEngine>().is_err());
    }

    #[test]
    fn test_clip_options() {
        let config = config_from(&[
            ("AUTOSHORT_LANG", "fr"),
            ("AUTOSHORT_VIDEO_CODEC", "libx264"),
            ("AUTOSHORT_BANNER", "assets/banner.png"),
        ]);
        let options = config.clip_options();
        assert_eq!(options.lang, "fr");
        assert_eq!(options.encoding.video_codec.as_deref(), Some("libx264"));
        assert_eq!(options.banner, Some(PathBuf::from("assets/banner.png")));
        assert_eq!(options.caption_style.size, 64);
        assert!((options.banner_scale - 0.8).abs() < f64::EPSILON);
    }
}
