//! Caption styling and caption tracks.
//!
//! A caption's display time is never computed here: every `CaptionOverlay`
//! is built with the measured duration of its narration segment, and a
//! `CaptionTrack` simply lays overlays back-to-back.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default caption font family.
pub const DEFAULT_CAPTION_FONT: &str = "Nimbus Sans";
/// Default caption font size (points at output resolution).
pub const DEFAULT_CAPTION_SIZE: u32 = 64;
/// Default stroke width around glyphs.
pub const DEFAULT_STROKE_WIDTH: u32 = 2;
/// Default caption box width in pixels; text wraps inside it.
pub const DEFAULT_WRAP_WIDTH: u32 = 660;
/// Default distance from the top of the frame to the caption box.
pub const DEFAULT_OFFSET_Y: u32 = 860;

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// ASS color literal (`&HAABBGGRR`, fully opaque).
    pub fn to_ass(&self) -> String {
        format!("&H00{:02X}{:02X}{:02X}", self.b, self.g, self.r)
    }
}

/// Caption rendering attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaptionStyle {
    /// Font family
    #[serde(default = "default_font")]
    pub font: String,

    /// Font size
    #[serde(default = "default_size")]
    pub size: u32,

    /// Fill color
    #[serde(default = "default_fill")]
    pub color: Rgb,

    /// Stroke (outline) color
    #[serde(default = "default_stroke")]
    pub stroke_color: Rgb,

    /// Stroke width
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,

    /// Width of the centered caption box
    #[serde(default = "default_wrap_width")]
    pub wrap_width: u32,

    /// Top of the caption box, measured from the top of the frame
    #[serde(default = "default_offset_y")]
    pub offset_y: u32,
}

fn default_font() -> String {
    DEFAULT_CAPTION_FONT.to_string()
}
fn default_size() -> u32 {
    DEFAULT_CAPTION_SIZE
}
fn default_fill() -> Rgb {
    Rgb::WHITE
}
fn default_stroke() -> Rgb {
    Rgb::BLACK
}
fn default_stroke_width() -> u32 {
    DEFAULT_STROKE_WIDTH
}
fn default_wrap_width() -> u32 {
    DEFAULT_WRAP_WIDTH
}
fn default_offset_y() -> u32 {
    DEFAULT_OFFSET_Y
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: default_font(),
            size: DEFAULT_CAPTION_SIZE,
            color: Rgb::WHITE,
            stroke_color: Rgb::BLACK,
            stroke_width: DEFAULT_STROKE_WIDTH,
            wrap_width: DEFAULT_WRAP_WIDTH,
            offset_y: DEFAULT_OFFSET_Y,
        }
    }
}

impl CaptionStyle {
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_wrap_width(mut self, wrap_width: u32) -> Self {
        self.wrap_width = wrap_width;
        self
    }

    pub fn with_offset_y(mut self, offset_y: u32) -> Self {
        self.offset_y = offset_y;
        self
    }
}

/// One caption shown for exactly the duration of its narration segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaptionOverlay {
    pub text: String,
    pub style: CaptionStyle,
    /// Display duration in seconds
    pub duration: f64,
}

impl CaptionOverlay {
    pub fn new(text: impl Into<String>, style: CaptionStyle, duration: f64) -> Self {
        Self {
            text: text.into(),
            style,
            duration,
        }
    }
}

/// Ordered caption overlays displayed back-to-back from t = 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CaptionTrack {
    overlays: Vec<CaptionOverlay>,
}

impl CaptionTrack {
    pub fn new(overlays: Vec<CaptionOverlay>) -> Self {
        Self { overlays }
    }

    pub fn overlays(&self) -> &[CaptionOverlay] {
        &self.overlays
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Total track length in seconds.
    pub fn duration(&self) -> f64 {
        self.overlays.iter().map(|o| o.duration).sum()
    }

    /// `(start, end)` of every overlay. Overlay `i` starts where `i - 1` ends.
    pub fn timeline(&self) -> Vec<(f64, f64)> {
        let mut cursor = 0.0;
        self.overlays
            .iter()
            .map(|overlay| {
                let start = cursor;
                cursor += overlay.duration;
                (start, cursor)
            })
            .collect()
    }
}

impl FromIterator<CaptionOverlay> for CaptionTrack {
    fn from_iter<I: IntoIterator<Item = CaptionOverlay>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
