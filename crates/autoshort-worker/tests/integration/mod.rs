//! Integration tests for the clip worker.
//!
//! `fakes` stands in for speech synthesis and FFmpeg so the pipeline runs
//! in-process; `ffmpeg_tests` needs real `ffmpeg`/`ffprobe` on PATH.

pub mod fakes;
pub mod batch_tests;
pub mod ffmpeg_tests;
pub mod pipeline_tests;
