//! Story and background discovery.

use autoshort_models::StoryText;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{WorkerError, WorkerResult};

/// Files directly inside `dir` with extension `ext` (case-insensitive), sorted by name.
async fn list_files(dir: &Path, ext: &str) -> WorkerResult<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(WorkerError::input_not_found(format!(
                "directory {} does not exist",
                dir.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext));
        if matches && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load every `<prefix>*.<ext>` story in `dir`, sorted by file name.
pub async fn load_stories(dir: impl AsRef<Path>, prefix: &str, ext: &str) -> WorkerResult<Vec<StoryText>> {
    let dir = dir.as_ref();
    let mut stories = Vec::new();

    for path in list_files(dir, ext).await? {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !name.starts_with(prefix) {
            continue;
        }
        let content = tokio::fs::read_to_string(&path).await?;
        stories.push(StoryText::from_file_name(&name, content));
    }

    if stories.is_empty() {
        return Err(WorkerError::input_not_found(format!(
            "no {}*.{} stories in {}",
            prefix,
            ext,
            dir.display()
        )));
    }

    debug!(count = stories.len(), dir = %dir.display(), "Loaded stories");
    Ok(stories)
}

/// Pick one `*.<ext>` background from `dir` at random.
pub async fn select_random_background(
    dir: impl AsRef<Path>,
    ext: &str,
    rng: &Mutex<StdRng>,
) -> WorkerResult<PathBuf> {
    let dir = dir.as_ref();
    let candidates = list_files(dir, ext).await?;

    let mut rng = rng.lock().unwrap_or_else(|e| e.into_inner());
    candidates.choose(&mut *rng).cloned().ok_or_else(|| {
        WorkerError::input_not_found(format!("no *.{} backgrounds in {}", ext, dir.display()))
    })
}
