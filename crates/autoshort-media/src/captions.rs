//! Caption track rendering as an ASS subtitle script.
//!
//! Captions are burned in with FFmpeg's `subtitles` filter (libass). Each
//! overlay becomes one `Dialogue` event. Event boundaries are taken from the
//! rounded cumulative timeline, so the end of caption `i` is the same
//! centisecond as the start of caption `i + 1`.

use autoshort_models::{CaptionStyle, CaptionTrack};
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

use crate::error::MediaResult;

/// Style name shared by every event in the script.
const STYLE_NAME: &str = "Caption";

/// ASS numpad alignment: top center.
const ALIGN_TOP_CENTER: u8 = 8;

/// Render `track` as an ASS script for a `width` x `height` frame.
///
/// All overlays of a track share one style: the style of the first overlay
/// (or the default style for an empty track).
pub fn render_ass_script(track: &CaptionTrack, width: u32, height: u32) -> String {
    let default_style = CaptionStyle::default();
    let style = track
        .overlays()
        .first()
        .map(|o| &o.style)
        .unwrap_or(&default_style);

    let mut script = String::new();
    script.push_str("[Script Info]\n");
    script.push_str("ScriptType: v4.00+\n");
    let _ = writeln!(script, "PlayResX: {}", width);
    let _ = writeln!(script, "PlayResY: {}", height);
    script.push_str("WrapStyle: 0\n");
    script.push_str("ScaledBorderAndShadow: yes\n\n");

    script.push_str("[V4+ Styles]\n");
    script.push_str(
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, \
         Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, \
         Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
    );
    script.push_str(&style_line(style, width));
    script.push('\n');

    script.push_str("[Events]\n");
    script.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");

    for (overlay, (start, end)) in track.overlays().iter().zip(track.timeline()) {
        let _ = writeln!(
            script,
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            format_ass_time(start),
            format_ass_time(end),
            STYLE_NAME,
            escape_ass_text(&overlay.text)
        );
    }

    script
}

/// Render and write the script to `path`.
pub async fn write_ass_script(
    track: &CaptionTrack,
    width: u32,
    height: u32,
    path: &Path,
) -> MediaResult<()> {
    let script = render_ass_script(track, width, height);
    tokio::fs::write(path, script).await?;
    debug!(path = %path.display(), events = track.len(), "Wrote caption script");
    Ok(())
}

fn style_line(style: &CaptionStyle, frame_width: u32) -> String {
    // Horizontal margins shrink the wrap area to a centered box of wrap_width
    let margin = frame_width.saturating_sub(style.wrap_width) / 2;
    format!(
        "Style: {name},{font},{size},{fill},{fill},{stroke},&H00000000,0,0,0,0,100,100,0,0,1,{outline},0,{align},{margin},{margin},{offset},1\n",
        name = STYLE_NAME,
        font = style.font.replace(',', " "),
        size = style.size,
        fill = style.color.to_ass(),
        stroke = style.stroke_color.to_ass(),
        outline = style.stroke_width,
        align = ALIGN_TOP_CENTER,
        margin = margin,
        offset = style.offset_y,
    )
}

/// `H:MM:SS.cc`, rounded to the nearest centisecond.
pub fn format_ass_time(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let s = total_secs % 60;
    let m = (total_secs / 60) % 60;
    let h = total_secs / 3600;
    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}

fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace("\r\n", "\\N")
        .replace('\n', "\\N")
}
