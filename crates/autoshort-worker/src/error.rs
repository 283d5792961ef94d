//! Worker error types.

use autoshort_media::MediaError;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Process exit codes reported by the `autoshort` binary.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const OTHER: i32 = 1;
    pub const NO_INPUT: i32 = 2;
    pub const SYNTHESIS: i32 = 3;
    pub const COMPOSITION: i32 = 4;
    pub const BACKGROUND_TOO_SHORT: i32 = 5;
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("Narration failed for {story}: {source}")]
    SynthesisFailure {
        story: String,
        #[source]
        source: MediaError,
    },

    #[error("Background too short for {story}: need {required:.2}s, have {available:.2}s")]
    DurationMismatch {
        story: String,
        required: f64,
        available: f64,
    },

    #[error("Composition failed for {story}: {source}")]
    CompositionFailure {
        story: String,
        #[source]
        source: MediaError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn input_not_found(msg: impl Into<String>) -> Self {
        Self::InputNotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn synthesis(story: impl Into<String>, source: MediaError) -> Self {
        Self::SynthesisFailure {
            story: story.into(),
            source,
        }
    }

    /// Composition-stage failure; a too-short background becomes `DurationMismatch`.
    pub fn composition(story: impl Into<String>, source: MediaError) -> Self {
        match source {
            MediaError::OutOfRange { required, available } => Self::DurationMismatch {
                story: story.into(),
                required,
                available,
            },
            source => Self::CompositionFailure {
                story: story.into(),
                source,
            },
        }
    }

    /// Exit code for this failure. Cancelled clips report `OTHER` whatever the stage.
    pub fn exit_code(&self) -> i32 {
        if self.is_cancelled() {
            return exit_code::OTHER;
        }
        match self {
            WorkerError::InputNotFound(_) => exit_code::NO_INPUT,
            WorkerError::SynthesisFailure { .. } => exit_code::SYNTHESIS,
            WorkerError::CompositionFailure { .. } => exit_code::COMPOSITION,
            WorkerError::DurationMismatch { .. } => exit_code::BACKGROUND_TOO_SHORT,
            WorkerError::Media(e) if e.is_out_of_range() => exit_code::BACKGROUND_TOO_SHORT,
            WorkerError::Config(_) | WorkerError::Media(_) | WorkerError::Io(_) => exit_code::OTHER,
        }
    }

    /// Check if the failure was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            WorkerError::SynthesisFailure { source, .. }
            | WorkerError::CompositionFailure { source, .. }
            | WorkerError::Media(source) => source.is_cancelled(),
            _ => false,
        }
    }

    /// Pipeline stage name for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            WorkerError::InputNotFound(_) => "input",
            WorkerError::SynthesisFailure { .. } => "narration",
            WorkerError::DurationMismatch { .. } => "window",
            WorkerError::CompositionFailure { .. } => "composition",
            WorkerError::Config(_) => "config",
            WorkerError::Media(_) | WorkerError::Io(_) => "io",
        }
    }
}
