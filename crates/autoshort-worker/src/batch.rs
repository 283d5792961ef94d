//! Sequential batch over many stories.
//!
//! Each story gets its own pipeline run; a failed clip is recorded and the
//! batch moves on. Cancellation stops scheduling further clips.

use autoshort_models::StoryText;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{exit_code, WorkerError};
use crate::pipeline::{ClipPipeline, ClipReport};
use crate::sources::select_random_background;

/// Extension of produced clips.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Result of one story in a batch.
#[derive(Debug)]
pub struct ClipOutcome {
    pub story: String,
    pub result: Result<ClipReport, WorkerError>,
}

/// Result of a whole batch.
#[derive(Debug)]
pub struct BatchSummary {
    pub outcomes: Vec<ClipOutcome>,
    /// Stories never started because the batch was cancelled
    pub skipped: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn first_failure(&self) -> Option<&WorkerError> {
        self.outcomes.iter().find_map(|o| o.result.as_ref().err())
    }

    /// Exit code of the first failed clip, or success.
    pub fn exit_code(&self) -> i32 {
        self.first_failure()
            .map(WorkerError::exit_code)
            .unwrap_or(exit_code::SUCCESS)
    }
}

/// Runs the pipeline once per story.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    pipeline: ClipPipeline,
    backgrounds_dir: PathBuf,
    background_extension: String,
    results_dir: PathBuf,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl BatchRunner {
    pub fn new(
        pipeline: ClipPipeline,
        backgrounds_dir: impl Into<PathBuf>,
        background_extension: impl Into<String>,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            pipeline,
            backgrounds_dir: backgrounds_dir.into(),
            background_extension: background_extension.into(),
            results_dir: results_dir.into(),
            cancel_rx: None,
        }
    }

    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Output path for a story: `<results_dir>/<story id>.mp4`.
    pub fn output_path(&self, story: &StoryText) -> PathBuf {
        self.results_dir
            .join(format!("{}.{}", story.id, OUTPUT_EXTENSION))
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub async fn run(&self, stories: &[StoryText]) -> BatchSummary {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(stories.len());
        let mut skipped = Vec::new();

        for (n, story) in stories.iter().enumerate() {
            if self.is_cancelled() {
                warn!(story = %story.id, "Batch cancelled, skipping remaining stories");
                skipped.extend(stories[n..].iter().map(|s| s.id.clone()));
                break;
            }

            info!(story = %story.id, "Clip {} of {}", n + 1, stories.len());
            let result = self.run_one(story).await;
            if let Err(e) = &result {
                error!(
                    story = %story.id,
                    stage = e.stage(),
                    exit_code = e.exit_code(),
                    "Clip failed: {}", e
                );
            }

            outcomes.push(ClipOutcome {
                story: story.id.clone(),
                result,
            });
        }

        let summary = BatchSummary {
            outcomes,
            skipped,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            skipped = summary.skipped.len(),
            elapsed_secs = (summary.finished_at - summary.started_at).num_seconds(),
            "Batch finished"
        );
        summary
    }

    async fn run_one(&self, story: &StoryText) -> Result<ClipReport, WorkerError> {
        let background = select_random_background(
            &self.backgrounds_dir,
            &self.background_extension,
            self.pipeline.rng(),
        )
        .await?;

        self.pipeline
            .run(story, &background, &self.output_path(story))
            .await
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_rx.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
