//! Structured clip logging utilities.
//!
//! Provides consistent, structured logging for one clip run with tracing
//! spans and contextual information.

use tracing::{error, info, warn, Span};

/// Clip logger carrying the story id and run id on every event.
#[derive(Debug, Clone)]
pub struct ClipLogger {
    story: String,
    run_id: String,
}

impl ClipLogger {
    pub fn new(story: &str, run_id: impl ToString) -> Self {
        Self {
            story: story.to_string(),
            run_id: run_id.to_string(),
        }
    }

    /// Log the start of a clip run.
    pub fn log_start(&self, message: &str) {
        info!(story = %self.story, run_id = %self.run_id, "Clip started: {}", message);
    }

    /// Log a stage transition.
    pub fn log_progress(&self, stage: &str, message: &str) {
        info!(
            story = %self.story,
            run_id = %self.run_id,
            stage,
            "Clip progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(story = %self.story, run_id = %self.run_id, "Clip warning: {}", message);
    }

    pub fn log_error(&self, stage: &str, message: &str) {
        error!(
            story = %self.story,
            run_id = %self.run_id,
            stage,
            "Clip failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(story = %self.story, run_id = %self.run_id, "Clip completed: {}", message);
    }

    pub fn story(&self) -> &str {
        &self.story
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Span wrapping the whole clip run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("clip", story = %self.story, run_id = %self.run_id)
    }
}
