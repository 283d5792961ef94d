//! Run-scoped transient assets.
//!
//! Every file a clip run writes outside the results directory is named
//! through a `TransientAssets` guard and carries the run id as a prefix, so
//! runs sharing a transient directory never collide. Release deletes only
//! this run's files; the directory itself stays.

use autoshort_media::stitch::FfmpegAudioStitcher;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::WorkerResult;

/// Per-run transient file set; released explicitly or on drop.
#[derive(Debug)]
pub struct TransientAssets {
    run_id: Uuid,
    temp_dir: PathBuf,
    stitched: PathBuf,
    released: bool,
}

impl TransientAssets {
    /// Allocate a new run: creates `temp_dir` if absent and picks a fresh run id.
    pub async fn acquire(temp_dir: impl AsRef<Path>, work_dir: impl AsRef<Path>) -> WorkerResult<Self> {
        let temp_dir = temp_dir.as_ref().to_path_buf();
        let work_dir = work_dir.as_ref();
        tokio::fs::create_dir_all(&temp_dir).await?;
        tokio::fs::create_dir_all(work_dir).await?;

        let run_id = Uuid::new_v4();
        let stitched = work_dir.join(format!("{}_temp_audio.mp3", run_id));
        debug!(run_id = %run_id, temp_dir = %temp_dir.display(), "Acquired transient assets");

        Ok(Self {
            run_id,
            temp_dir,
            stitched,
            released: false,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    fn namespaced(&self, name: &str) -> PathBuf {
        self.temp_dir.join(format!("{}_{}", self.run_id, name))
    }

    /// Raw synthesized narration for line `idx`.
    pub fn raw_audio(&self, idx: usize) -> PathBuf {
        self.namespaced(&format!("audio_{}.mp3", idx))
    }

    /// Tempo-adjusted narration for line `idx`.
    pub fn tempo_audio(&self, idx: usize) -> PathBuf {
        self.namespaced(&format!("audio_SpeedUp_{}.mp3", idx))
    }

    /// Caption script.
    pub fn captions(&self) -> PathBuf {
        self.namespaced("captions.ass")
    }

    /// Concat list the stitcher writes beside the stitched track.
    pub fn concat_list(&self) -> PathBuf {
        FfmpegAudioStitcher::list_path(&self.stitched)
    }

    /// Encoded clip before it is moved into the results directory.
    pub fn encoded_output(&self) -> PathBuf {
        self.namespaced("output.mp4")
    }

    /// Stitched narration track (lives in the work directory).
    pub fn stitched_track(&self) -> &Path {
        &self.stitched
    }

    fn owns(&self, file_name: &str) -> bool {
        file_name.starts_with(&format!("{}_", self.run_id))
    }

    /// Delete every file of this run. Returns the number of files removed.
    pub async fn release(mut self) -> WorkerResult<usize> {
        let mut removed = 0;
        let mut first_error: Option<std::io::Error> = None;
        let mut record = |e: std::io::Error, path: &Path| {
            warn!(path = %path.display(), "Failed to remove transient file: {}", e);
            first_error.get_or_insert(e);
        };

        let mut owned = Vec::new();
        match tokio::fs::read_dir(&self.temp_dir).await {
            Ok(mut entries) => loop {
                match entries.next_entry().await {
                    Ok(Some(entry)) => {
                        if self.owns(&entry.file_name().to_string_lossy()) {
                            owned.push(entry.path());
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        record(e, &self.temp_dir);
                        break;
                    }
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => record(e, &self.temp_dir),
        }

        for path in owned {
            match tokio::fs::symlink_metadata(&path).await {
                Ok(meta) if meta.is_file() => match tokio::fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => record(e, &path),
                },
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => record(e, &path),
            }
        }

        for path in [self.stitched.clone(), self.concat_list()] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => record(e, &path),
            }
        }

        match first_error {
            // Leave `released` unset so drop retries what is left
            Some(e) => Err(e.into()),
            None => {
                self.released = true;
                debug!(run_id = %self.run_id, removed, "Released transient assets");
                Ok(removed)
            }
        }
    }

    fn release_blocking(&self) -> usize {
        let mut removed = 0;

        if let Ok(entries) = std::fs::read_dir(&self.temp_dir) {
            for entry in entries.flatten() {
                if self.owns(&entry.file_name().to_string_lossy())
                    && entry.file_type().is_ok_and(|t| t.is_file())
                    && std::fs::remove_file(entry.path()).is_ok()
                {
                    removed += 1;
                }
            }
        }

        for path in [self.stitched.clone(), self.concat_list()] {
            if std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        removed
    }
}

impl Drop for TransientAssets {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let removed = self.release_blocking();
        warn!(run_id = %self.run_id, removed, "Transient assets released on drop");
    }
}

/// Remove every file in `temp_dir`, keeping the directory.
pub async fn sweep(temp_dir: impl AsRef<Path>) -> WorkerResult<usize> {
    let temp_dir = temp_dir.as_ref();
    let mut entries = match tokio::fs::read_dir(temp_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    Ok(removed)
}
