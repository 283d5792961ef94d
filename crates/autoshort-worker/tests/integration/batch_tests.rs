//! Batch runs from story and background directories.

use autoshort_models::ClipOptions;
use autoshort_worker::{load_stories, shared_rng, sweep, BatchRunner, ClipPipeline};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use super::fakes::{engines, entries, TimelineCompositor};

fn write(path: &Path, content: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn runner(root: &Path, refuse: Option<&'static str>) -> BatchRunner {
    let pipeline = ClipPipeline::new(
        engines(refuse, Arc::new(TimelineCompositor::default())),
        ClipOptions::default(),
        root.join("temp_assets"),
        root,
        shared_rng(Some(7)),
    );
    BatchRunner::new(pipeline, root.join("BackGroundVideos"), "webm", root.join("Results"))
}

#[tokio::test]
async fn test_batch_over_story_directory() {
    let root = TempDir::new().unwrap();
    let root = root.path();
    write(&root.join("Stories/Story_1.txt"), b"Hello world\nThis is a test\n");
    write(&root.join("Stories/Story_2.txt"), b"Another story");
    write(&root.join("Stories/README.md"), b"not a story");
    write(&root.join("BackGroundVideos/minecraft.webm"), &[b'v'; 600]);
    write(&root.join("BackGroundVideos/subway.webm"), &[b'v'; 900]);

    let stories = load_stories(root.join("Stories"), "Story_", "txt").await.unwrap();
    assert_eq!(stories.len(), 2);

    let summary = runner(root, None).run(&stories).await;

    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.exit_code(), 0);
    let mut results = entries(&root.join("Results"));
    results.sort();
    assert_eq!(results, vec!["Story_1.mp4", "Story_2.mp4"]);

    for outcome in &summary.outcomes {
        let report = outcome.result.as_ref().unwrap();
        let name = report.background.file_name().unwrap().to_string_lossy();
        assert!(name == "minecraft.webm" || name == "subway.webm");
    }

    assert_eq!(sweep(root.join("temp_assets")).await.unwrap(), 0);
}

#[tokio::test]
async fn test_one_failing_story_keeps_the_rest() {
    let root = TempDir::new().unwrap();
    let root = root.path();
    write(&root.join("Stories/Story_1.txt"), b"fine");
    write(&root.join("Stories/Story_2.txt"), b"broken");
    write(&root.join("Stories/Story_3.txt"), b"also fine");
    write(&root.join("BackGroundVideos/bg.webm"), &[b'v'; 600]);

    let stories = load_stories(root.join("Stories"), "Story_", "txt").await.unwrap();
    let summary = runner(root, Some("broken")).run(&stories).await;

    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.exit_code(), 3);
    assert!(root.join("Results/Story_1.mp4").exists());
    assert!(!root.join("Results/Story_2.mp4").exists());
    assert!(root.join("Results/Story_3.mp4").exists());
    assert!(entries(&root.join("temp_assets")).is_empty());
}

#[tokio::test]
async fn test_no_stories_is_input_not_found() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("Stories")).unwrap();

    let err = load_stories(root.path().join("Stories"), "Story_", "txt")
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
