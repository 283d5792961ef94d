//! Single-clip pipeline over in-process engines.

use autoshort_models::{ClipOptions, StoryText};
use autoshort_worker::{shared_rng, ClipPipeline, WorkerError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use super::fakes::{engines, entries, TimelineCompositor};

struct Workspace {
    root: TempDir,
    background: PathBuf,
}

impl Workspace {
    /// `background_secs` of background, at 0.1s per byte.
    fn new(background_secs: usize) -> Self {
        let root = TempDir::new().unwrap();
        let background = root.path().join("bg.webm");
        std::fs::write(&background, vec![b'v'; background_secs * 10]).unwrap();
        Self { root, background }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn temp_dir(&self) -> PathBuf {
        self.path().join("temp_assets")
    }

    fn output(&self) -> PathBuf {
        self.path().join("Results/Story_1.mp4")
    }

    fn pipeline(&self, refuse: Option<&'static str>, compositor: Arc<TimelineCompositor>) -> ClipPipeline {
        self.pipeline_with(refuse, compositor, ClipOptions::default())
    }

    fn pipeline_with(
        &self,
        refuse: Option<&'static str>,
        compositor: Arc<TimelineCompositor>,
        options: ClipOptions,
    ) -> ClipPipeline {
        ClipPipeline::new(
            engines(refuse, compositor),
            options,
            self.temp_dir(),
            self.path(),
            shared_rng(Some(42)),
        )
    }

    /// Transient files left in the temp dir or the work dir.
    fn leftovers(&self) -> Vec<String> {
        let mut left = entries(&self.temp_dir());
        left.extend(
            entries(self.path())
                .into_iter()
                .filter(|name| name.ends_with("_temp_audio.mp3") || name.ends_with(".concat.txt")),
        );
        left
    }
}

#[tokio::test]
async fn test_two_line_story_produces_captioned_clip() {
    let ws = Workspace::new(60);
    let compositor = Arc::new(TimelineCompositor::default());
    let pipeline = ws.pipeline(None, compositor.clone());
    let story = StoryText::new("Story_1", "Hello world\nThis is a test\n");

    let report = pipeline.run(&story, &ws.background, &ws.output()).await.unwrap();

    assert_eq!(report.lines, vec!["Hello world", "This is a test"]);
    assert_eq!(report.durations.len(), 2);
    assert!((report.durations[0] - 1.1).abs() < 1e-9);
    assert!((report.durations[1] - 1.4).abs() < 1e-9);
    assert!((report.window.duration - 2.5).abs() < 1e-9);
    assert!(report.window.offset >= 0.0);
    assert!(report.window.end() <= 60.0 + 1e-9);

    let clip = std::fs::read_to_string(ws.output()).unwrap();
    assert_eq!(clip, "0.0-1.1 Hello world\n1.1-2.5 This is a test");

    let plans = compositor.plans.lock().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].background, ws.background);
    assert!(plans[0].banner.is_none());

    assert!(ws.leftovers().is_empty(), "{:?}", ws.leftovers());
}

#[tokio::test]
async fn test_duration_override_sets_window_length() {
    let ws = Workspace::new(60);
    let options = ClipOptions {
        duration_override: Some(30.0),
        ..ClipOptions::default()
    };
    let pipeline = ws.pipeline_with(None, Arc::new(TimelineCompositor::default()), options);

    let report = pipeline
        .run(&StoryText::new("Story_1", "Short"), &ws.background, &ws.output())
        .await
        .unwrap();

    assert_eq!(report.window.duration, 30.0);
    assert!(report.window.end() <= 60.0 + 1e-9);
}

#[tokio::test]
async fn test_synthesis_failure_cleans_up_and_maps_exit_code() {
    let ws = Workspace::new(60);
    let pipeline = ws.pipeline(Some("This is a test"), Arc::new(TimelineCompositor::default()));
    let story = StoryText::new("Story_1", "Hello world\nThis is a test\n");

    let err = pipeline.run(&story, &ws.background, &ws.output()).await.unwrap_err();

    assert!(matches!(err, WorkerError::SynthesisFailure { .. }), "{:?}", err);
    assert_eq!(err.exit_code(), 3);
    assert!(!ws.output().exists());
    assert!(ws.leftovers().is_empty(), "{:?}", ws.leftovers());
}

#[tokio::test]
async fn test_background_shorter_than_narration() {
    let ws = Workspace::new(1);
    let pipeline = ws.pipeline(None, Arc::new(TimelineCompositor::default()));
    let story = StoryText::new("Story_1", "Hello world\nThis is a test\n");

    let err = pipeline.run(&story, &ws.background, &ws.output()).await.unwrap_err();

    assert!(matches!(err, WorkerError::DurationMismatch { .. }), "{:?}", err);
    assert_eq!(err.exit_code(), 5);
    assert!(!ws.output().exists());
    assert!(ws.leftovers().is_empty(), "{:?}", ws.leftovers());
}

#[tokio::test]
async fn test_same_seed_picks_same_window() {
    let ws = Workspace::new(600);
    let story = StoryText::new("Story_1", "Hello world");

    let first = ws
        .pipeline(None, Arc::new(TimelineCompositor::default()))
        .run(&story, &ws.background, &ws.output())
        .await
        .unwrap();
    let second = ws
        .pipeline(None, Arc::new(TimelineCompositor::default()))
        .run(&story, &ws.background, &ws.output())
        .await
        .unwrap();

    assert_eq!(first.window, second.window);
    assert_ne!(first.run_id, second.run_id);
}
