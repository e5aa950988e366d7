//! Staging area bookkeeping for in-flight uploads

use std::path::{Path, PathBuf};
use tracing::warn;

/// A file fully or partially received into the staging directory
#[derive(Debug)]
pub(crate) struct StagedEntry {
    pub original_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Removes every tracked path from disk when dropped while armed.
///
/// Covers the cases where the owning future is dropped mid-request
/// (client disconnect) and no async cleanup gets a chance to run.
#[derive(Debug)]
pub(crate) struct CleanupGuard {
    paths: Vec<PathBuf>,
    armed: bool,
}

impl CleanupGuard {
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            armed: true,
        }
    }

    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Remove tracked paths now and stop tracking them
    pub async fn remove_all(&mut self) {
        for path in self.paths.drain(..) {
            remove_quietly_async(&path).await;
        }
    }

    /// Keep the tracked paths on disk
    pub fn disarm(&mut self) {
        self.armed = false;
        self.paths.clear();
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for path in &self.paths {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = ?path, error = %e, "Failed to remove abandoned upload file");
                }
            }
        }
    }
}

async fn remove_quietly_async(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = ?path, error = %e, "Failed to remove upload file");
        }
    }
}

/// Delete leftovers of uploads interrupted by a crash or restart
pub(crate) async fn purge(staging_dir: &Path) -> std::io::Result<usize> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(staging_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            remove_quietly_async(&entry.path()).await;
            removed += 1;
        }
    }
    Ok(removed)
}
