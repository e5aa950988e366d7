//! Filesystem-based storage implementation
//!
//! Every regular file directly inside the backup directory is a stored file.
//! In-flight uploads live in a hidden staging subdirectory and are hard-linked
//! into place on commit, so the catalog never observes a partial file.

mod staging;

use crate::{CommittedFile, Storage, StorageError, StorageResult, StoredFile, UploadSession};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::file_utils::{sanitize_filename, stored_filename, validate_filename};
use staging::{CleanupGuard, StagedEntry};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Staging subdirectory of the backup directory
pub const STAGING_DIR: &str = ".incoming";

/// Upper bound on stored-name collisions resolved for a single file
pub const MAX_COMMIT_ATTEMPTS: u32 = 64;

/// Filesystem-based storage implementation
pub struct FilesystemStorage {
    backup_dir: PathBuf,
    staging_dir: PathBuf,
    clock: fn() -> u64,
}

impl FilesystemStorage {
    /// Create the backup and staging directories and clear stale staging files
    pub async fn initialize(backup_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let backup_dir = backup_dir.into();
        let staging_dir = backup_dir.join(STAGING_DIR);

        tokio::fs::create_dir_all(&staging_dir)
            .await
            .map_err(|e| {
                StorageError::io(format!("Failed to create {}", staging_dir.display()), e)
            })?;

        let removed = staging::purge(&staging_dir).await.map_err(|e| {
            StorageError::io(format!("Failed to clean {}", staging_dir.display()), e)
        })?;
        if removed > 0 {
            info!(removed, "Removed stale staging files from interrupted uploads");
        }

        Ok(Self {
            backup_dir,
            staging_dir,
            clock: common::get_current_timestamp_ms,
        })
    }

    /// Replace the millisecond clock used for stored names
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl Storage for FilesystemStorage {
    async fn begin_upload(&self) -> StorageResult<Box<dyn UploadSession>> {
        Ok(Box::new(FilesystemUploadSession {
            backup_dir: self.backup_dir.clone(),
            staging_dir: self.staging_dir.clone(),
            clock: self.clock,
            staged: Vec::new(),
            guard: CleanupGuard::new(),
            current: None,
        }))
    }

    async fn list_files(&self) -> StorageResult<Vec<StoredFile>> {
        let unavailable = |source| StorageError::CatalogUnavailable {
            path: self.backup_dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.backup_dir)
            .await
            .map_err(unavailable)?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(unavailable(e)),
            };
            // Directories (including staging), symlinks and special files are not stored files
            if !file_type.is_file() {
                continue;
            }

            let Some(stored_name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(path = ?entry.path(), "Skipping entry with non UTF-8 name");
                continue;
            };

            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                // Removed between enumeration and stat
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(unavailable(e)),
            };

            files.push(StoredFile {
                stored_name,
                size_bytes: metadata.len(),
                modified: modified_time(&metadata).map_err(unavailable)?,
            });
        }

        debug!(count = files.len(), "Listed backup directory");
        Ok(files)
    }

    async fn open_file(&self, stored_name: &str) -> StorageResult<(tokio::fs::File, StoredFile)> {
        validate_filename(stored_name).map_err(|e| StorageError::InvalidName {
            name: stored_name.to_string(),
            reason: e.message(),
        })?;

        let path = self.backup_dir.join(stored_name);
        let not_found = || StorageError::NotFound(stored_name.to_string());

        let metadata = match tokio::fs::symlink_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(StorageError::io(format!("Failed to stat {}", stored_name), e)),
        };
        if !metadata.is_file() {
            return Err(not_found());
        }

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(StorageError::io(format!("Failed to open {}", stored_name), e)),
        };

        let modified = modified_time(&metadata)
            .map_err(|e| StorageError::io(format!("Failed to stat {}", stored_name), e))?;

        Ok((
            file,
            StoredFile {
                stored_name: stored_name.to_string(),
                size_bytes: metadata.len(),
                modified,
            },
        ))
    }
}

fn modified_time(metadata: &std::fs::Metadata) -> std::io::Result<DateTime<Utc>> {
    metadata
        .modified()
        .or_else(|_| metadata.created())
        .map(DateTime::<Utc>::from)
}

/// Upload session staging files under `.incoming/`
pub struct FilesystemUploadSession {
    backup_dir: PathBuf,
    staging_dir: PathBuf,
    clock: fn() -> u64,
    staged: Vec<StagedEntry>,
    guard: CleanupGuard,
    current: Option<tokio::fs::File>,
}

impl FilesystemUploadSession {
    async fn close_current(&mut self) -> StorageResult<()> {
        if let Some(mut file) = self.current.take() {
            file.flush()
                .await
                .map_err(|e| StorageError::io("Failed to flush staged file", e))?;
            file.sync_all()
                .await
                .map_err(|e| StorageError::io("Failed to sync staged file", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl UploadSession for FilesystemUploadSession {
    async fn start_file(&mut self, original_name: &str) -> StorageResult<()> {
        self.close_current().await?;

        let path = self.staging_dir.join(format!("{}.part", Uuid::new_v4()));
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| StorageError::io("Failed to create staging file", e))?;

        self.guard.track(path.clone());
        self.staged.push(StagedEntry {
            original_name: original_name.to_string(),
            path,
            size_bytes: 0,
        });
        self.current = Some(file);
        Ok(())
    }

    async fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()> {
        let (Some(file), Some(entry)) = (self.current.as_mut(), self.staged.last_mut()) else {
            return Err(StorageError::Session("write_chunk called before start_file"));
        };
        file.write_all(chunk)
            .await
            .map_err(|e| StorageError::io("Failed to write staged file", e))?;
        entry.size_bytes += chunk.len() as u64;
        Ok(())
    }

    async fn finish_file(&mut self) -> StorageResult<u64> {
        if self.current.is_none() {
            return Err(StorageError::Session("finish_file called before start_file"));
        }
        self.close_current().await?;
        Ok(self.staged.last().map(|e| e.size_bytes).unwrap_or(0))
    }

    fn file_count(&self) -> usize {
        self.staged.len()
    }

    async fn commit(mut self: Box<Self>) -> StorageResult<Vec<CommittedFile>> {
        self.close_current().await?;

        // Files linked into the backup directory so far; dropped armed on any failure
        let mut committed_guard = CleanupGuard::new();
        let mut committed = Vec::with_capacity(self.staged.len());

        for entry in &self.staged {
            let sanitized = sanitize_filename(&entry.original_name);
            let (stored_name, target) =
                link_unique(&entry.path, &self.backup_dir, &sanitized, (self.clock)()).await?;
            committed_guard.track(target);

            info!(
                stored_name = %stored_name,
                original_name = ?entry.original_name,
                size_bytes = entry.size_bytes,
                "Stored file"
            );

            committed.push(CommittedFile {
                stored_name,
                original_name: entry.original_name.clone(),
                size_bytes: entry.size_bytes,
            });
        }

        committed_guard.disarm();
        // Staged links are no longer needed; the stored copies share their inodes
        self.guard.remove_all().await;
        Ok(committed)
    }

    async fn abort(mut self: Box<Self>) {
        self.current = None;
        self.guard.remove_all().await;
    }
}

/// Link `staged` into `backup_dir` under `<timestamp>-<sanitized>`, bumping the
/// timestamp by one millisecond for every name that already exists.
///
/// `hard_link` fails with `AlreadyExists` instead of replacing the target, which
/// makes the existence check and the creation a single atomic step.
async fn link_unique(
    staged: &Path,
    backup_dir: &Path,
    sanitized: &str,
    timestamp_ms: u64,
) -> StorageResult<(String, PathBuf)> {
    let mut timestamp_ms = timestamp_ms;
    for _ in 0..MAX_COMMIT_ATTEMPTS {
        let stored_name = stored_filename(timestamp_ms, sanitized);
        let target = backup_dir.join(&stored_name);
        match tokio::fs::hard_link(staged, &target).await {
            Ok(()) => return Ok((stored_name, target)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(stored_name = %stored_name, "Stored name taken, retrying");
                timestamp_ms += 1;
            }
            // ENAMETOOLONG: the client chose a name the filesystem cannot hold
            Err(e) if e.kind() == ErrorKind::InvalidFilename => {
                return Err(StorageError::InvalidName {
                    name: stored_name,
                    reason: "Filename too long",
                })
            }
            Err(e) => {
                return Err(StorageError::io(
                    format!("Failed to store {}", stored_name),
                    e,
                ))
            }
        }
    }
    Err(StorageError::NameExhausted(
        sanitized.to_string(),
        MAX_COMMIT_ATTEMPTS,
    ))
}
