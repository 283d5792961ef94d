//! Shared data models for the AutoShort pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Stories and their narration lines (segmentation)
//! - Caption styling and back-to-back caption tracks
//! - Frame geometry (aspect ratios, crop rectangles)
//! - Clip options and encoding configuration

pub mod caption;
pub mod clip;
pub mod encoding;
pub mod geometry;
pub mod story;

// Re-export common types
pub use caption::{CaptionOverlay, CaptionStyle, CaptionTrack, Rgb};
pub use clip::{BackgroundWindow, ClipOptions, DEFAULT_LANG, DEFAULT_TEMPO};
pub use encoding::EncodingConfig;
pub use geometry::{AspectRatio, AspectRatioParseError, CropRect};
pub use story::{narration_lines, split, NarrationLine, StoryText, DEFAULT_DELIMITER};
