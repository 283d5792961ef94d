//! Video filter graph construction for clip composition.

use autoshort_models::CropRect;
use std::path::Path;

use crate::banner::{banner_overlay_filter, BannerConfig};

/// Label of the final video stream in the composition graph.
pub const OUTPUT_LABEL: &str = "vout";

/// Escape a path for use inside a quoted filter option value.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}

/// `subtitles` filter burning in an ASS script.
pub fn filter_subtitles(captions: &Path, fonts_dir: Option<&Path>) -> String {
    let mut filter = format!("subtitles=filename='{}'", escape_filter_path(captions));
    if let Some(dir) = fonts_dir {
        filter.push_str(&format!(":fontsdir='{}'", escape_filter_path(dir)));
    }
    filter
}

/// Build the composition `filter_complex`.
///
/// Chain: crop the background (input 0), optionally overlay the banner from
/// input `banner_input`, then burn in captions. The result is labeled
/// [`OUTPUT_LABEL`].
pub fn composition_filter(
    crop: &CropRect,
    banner: Option<(&BannerConfig, usize)>,
    captions: &Path,
    fonts_dir: Option<&Path>,
) -> String {
    let mut chains = vec![format!("[0:v]{}[cropped]", crop.to_filter())];

    let captioned_input = match banner {
        Some((config, input)) => {
            chains.push(banner_overlay_filter(config, input, "cropped", "banded"));
            "banded"
        }
        None => "cropped",
    };

    chains.push(format!(
        "[{}]{}[{}]",
        captioned_input,
        filter_subtitles(captions, fonts_dir),
        OUTPUT_LABEL
    ));

    chains.join(";")
}
