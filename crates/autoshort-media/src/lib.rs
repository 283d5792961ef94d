#![deny(unreachable_patterns)]
//! Media engines for narrated short clips.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and a cancellable runner
//! - Progress parsing from `-progress pipe:2`
//! - Speech synthesis engines behind the `Synthesizer` trait
//! - Tempo adjustment, duration probing and narration stitching
//! - Random background window selection
//! - Caption scripts, banner overlay and single-pass clip composition

pub mod banner;
pub mod captions;
pub mod command;
pub mod compose;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod probe;
pub mod progress;
pub mod stitch;
pub mod synth;
pub mod tempo;
pub mod window;

pub use banner::BannerConfig;
pub use captions::{render_ass_script, write_ass_script};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compose::{CompositionPlan, Compositor, FfmpegCompositor};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{move_file, remove_if_exists};
pub use probe::{
    probe_duration, probe_duration_with, probe_video, probe_video_with, DurationProbe,
    FfprobeDurationProbe, VideoInfo,
};
pub use progress::FfmpegProgress;
pub use stitch::{AudioStitcher, FfmpegAudioStitcher};
pub use synth::{CommandSynthesizer, GoogleTranslateTts, Synthesizer};
pub use tempo::{FfmpegTempoAdjuster, TempoAdjuster};
pub use window::select_window;
