//! Optional banner image overlaid at the center of the clip.
//!
//! # Architecture
//!
//! - `BannerConfig`: builder-style overlay configuration
//! - `banner_overlay_filter`: filter-graph fragment used by the compositor

use autoshort_models::clip::DEFAULT_BANNER_SCALE;
use std::path::{Path, PathBuf};

use crate::error::{MediaError, MediaResult};

/// Configuration for the banner overlay.
///
/// ```ignore
/// let banner = BannerConfig::new("assets/banner.png").with_scale(0.8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BannerConfig {
    /// Path to the banner image (PNG with transparency works best)
    pub image_path: PathBuf,
    /// Scale relative to the image's natural size
    pub scale: f64,
}

impl BannerConfig {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            scale: DEFAULT_BANNER_SCALE,
        }
    }

    /// Set the scale factor; non-positive values fall back to the default.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            DEFAULT_BANNER_SCALE
        };
        self
    }

    /// Check if the banner image exists.
    pub fn is_available(&self) -> bool {
        self.image_path.exists()
    }

    /// Validate configuration.
    pub fn validate(&self) -> MediaResult<()> {
        if !self.is_available() {
            return Err(MediaError::FileNotFound(self.image_path.clone()));
        }
        Ok(())
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }
}

/// Scale the banner from input `banner_input` and overlay it centered on `[input_label]`.
///
/// The banner is shown for the whole clip.
pub fn banner_overlay_filter(
    config: &BannerConfig,
    banner_input: usize,
    input_label: &str,
    output_label: &str,
) -> String {
    format!(
        "[{idx}:v]scale=iw*{scale}:ih*{scale}[banner];[{input}][banner]overlay=(W-w)/2:(H-h)/2:format=auto[{output}]",
        idx = banner_input,
        scale = config.scale,
        input = input_label,
        output = output_label,
    )
}
