//! Narrated clip worker.
//!
//! This crate provides:
//! - Configuration from the environment
//! - Run-scoped transient assets with guaranteed cleanup
//! - The single-clip pipeline (narration, stitching, window, composition)
//! - Sequential batch execution with per-clip failure isolation
//! - Story and background discovery

pub mod assets;
pub mod batch;
pub mod config;
pub mod engines;
pub mod error;
pub mod logging;
pub mod narration;
pub mod pipeline;
pub mod sources;

#[cfg(test)]
mod testing;

pub use assets::{sweep, TransientAssets};
pub use batch::{BatchRunner, BatchSummary, ClipOutcome};
pub use config::{TtsEngine, WorkerConfig};
pub use engines::Engines;
pub use error::{WorkerError, WorkerResult};
pub use logging::ClipLogger;
pub use narration::{narrate_lines, NarratedLine, NarrationSettings};
pub use pipeline::{shared_rng, ClipPipeline, ClipReport, SharedRng};
pub use sources::{load_stories, select_random_background};
