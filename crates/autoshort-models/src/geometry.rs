//! Frame geometry: aspect ratios and crop rectangles.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Aspect ratio specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Standard portrait (9:16) for TikTok/Reels/Shorts
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    /// Create a new aspect ratio.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both sides non-zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(':')
            .ok_or_else(|| AspectRatioParseError::InvalidFormat(s.to_string()))?;

        let width = width
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(width.to_string()))?;
        let height = height
            .trim()
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(height.to_string()))?;

        if width == 0 || height == 0 {
            return Err(AspectRatioParseError::ZeroValue);
        }

        Ok(AspectRatio { width, height })
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

#[derive(Debug, Error)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H'")]
    InvalidFormat(String),
    #[error("Invalid number in aspect ratio: {0}")]
    InvalidNumber(String),
    #[error("Aspect ratio cannot have zero values")]
    ZeroValue,
}

/// Pixel crop rectangle inside a source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Set when the requested width did not fit the source and was clamped.
    pub clamped: bool,
}

impl CropRect {
    /// Crop to `aspect`, keeping the full source height and centering horizontally.
    ///
    /// Width is `height * aspect` truncated, then rounded down to an even value
    /// (yuv420p encoders reject odd sizes). A source too narrow for that width
    /// is clamped to the full source width and reported via `clamped`, as is
    /// a degenerate aspect with a zero side.
    pub fn centered(source_width: u32, source_height: u32, aspect: AspectRatio) -> Self {
        let height = even_floor(source_height);
        let wanted = if aspect.is_valid() {
            let w = height as u64 * aspect.width as u64 / aspect.height as u64;
            even_floor(u32::try_from(w).unwrap_or(u32::MAX))
        } else {
            u32::MAX
        };

        let (width, clamped) = if wanted > source_width {
            (even_floor(source_width), true)
        } else {
            (wanted, false)
        };

        Self {
            x: (source_width - width) / 2,
            y: (source_height - height) / 2,
            width,
            height,
            clamped,
        }
    }

    /// FFmpeg `crop` filter expression.
    pub fn to_filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

fn even_floor(v: u32) -> u32 {
    v & !1
}
