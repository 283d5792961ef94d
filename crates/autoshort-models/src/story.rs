//! Story input and narration segmentation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default line delimiter used to split a story into narration lines.
pub const DEFAULT_DELIMITER: &str = "\n";

/// A story to narrate: an identifier derived from its source file name plus raw content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoryText {
    /// Identifier, also used to name the output video
    pub id: String,
    /// Raw multi-line content
    pub content: String,
}

impl StoryText {
    /// Create a story from an identifier and content.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Create a story from a file name, stripping the extension for the identifier.
    ///
    /// `Story_01.txt` becomes `Story_01`.
    pub fn from_file_name(file_name: &str, content: impl Into<String>) -> Self {
        let id = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        Self::new(id, content)
    }

    /// Split the story into narration lines using the default delimiter.
    pub fn lines(&self) -> Vec<NarrationLine> {
        narration_lines(&self.content, DEFAULT_DELIMITER)
    }
}

impl fmt::Display for StoryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// One non-empty, trimmed unit of narration.
///
/// `index` is the position of the raw segment the line came from, so dropped
/// empty segments leave gaps. Asset file names use this index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NarrationLine {
    pub index: usize,
    pub text: String,
}

impl NarrationLine {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Split text on a delimiter.
///
/// No trimming and no filtering: callers decide what to drop. Text without
/// the delimiter yields a single element. An empty delimiter is treated as
/// "no delimiter".
pub fn split<'a>(text: &'a str, delimiter: &str) -> Vec<&'a str> {
    if delimiter.is_empty() {
        return vec![text];
    }
    text.split(delimiter).collect()
}

/// Split text into ordered narration lines, trimming each segment and
/// discarding segments that are empty after trimming.
pub fn narration_lines(text: &str, delimiter: &str) -> Vec<NarrationLine> {
    split(text, delimiter)
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| NarrationLine::new(index, trimmed))
        })
        .collect()
}
