//! Media file resolution
//!
//! Maps video ids onto files on disk. Files are assumed immutable while a
//! response is in flight; every request opens its own handle.

use std::path::{Path, PathBuf};

use crate::error::{PhaseServerError, Result};

/// Resolves video ids to files under a configured directory using the
/// `case_<id>.mp4` naming convention.
#[derive(Debug, Clone)]
pub struct MediaStore {
    video_dir: PathBuf,
}

impl MediaStore {
    pub fn new<P: Into<PathBuf>>(video_dir: P) -> Self {
        Self {
            video_dir: video_dir.into(),
        }
    }

    /// Path a video id resolves to. Does not touch the filesystem.
    pub fn resolve(&self, video_id: i64) -> PathBuf {
        self.video_dir.join(format!("case_{}.mp4", video_id))
    }

    /// Resolve a video id to its path and total byte size.
    ///
    /// Fails with `VideoNotFound` when the file is missing or unreadable.
    pub async fn resolve_sized(&self, video_id: i64) -> Result<(PathBuf, u64)> {
        let path = self.resolve(video_id);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| PhaseServerError::VideoNotFound(path.display().to_string()))?;
        Ok((path, metadata.len()))
    }

    pub fn video_dir(&self) -> &Path {
        &self.video_dir
    }
}
