pub mod backend;
pub mod error;
pub mod filesystem;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};

/// A file currently present in the backup directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub stored_name: String,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

impl StoredFile {
    pub fn retrieval_path(&self) -> String {
        common::file_utils::retrieval_path(&self.stored_name)
    }
}

/// A file persisted by a committed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedFile {
    pub stored_name: String,
    pub original_name: String,
    pub size_bytes: u64,
}

impl CommittedFile {
    pub fn retrieval_path(&self) -> String {
        common::file_utils::retrieval_path(&self.stored_name)
    }
}

/// Storage backend trait for ingestion, catalog and retrieval
#[async_trait]
pub trait Storage: Send + Sync {
    /// Start a new upload. Nothing written through the session is visible
    /// to `list_files` until `UploadSession::commit` succeeds.
    async fn begin_upload(&self) -> StorageResult<Box<dyn UploadSession>>;

    /// Enumerate the stored files in whatever order the directory yields them
    async fn list_files(&self) -> StorageResult<Vec<StoredFile>>;

    /// Open a stored file for reading
    async fn open_file(&self, stored_name: &str) -> StorageResult<(tokio::fs::File, StoredFile)>;
}

/// An in-flight, all-or-nothing upload of one or more files.
///
/// Dropping a session without committing discards everything staged in it.
#[async_trait]
pub trait UploadSession: Send {
    /// Begin staging a new file. Any file still open is finished first.
    async fn start_file(&mut self, original_name: &str) -> StorageResult<()>;

    /// Append bytes to the file started last
    async fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()>;

    /// Flush the current file and return its size in bytes
    async fn finish_file(&mut self) -> StorageResult<u64>;

    /// Number of files staged so far
    fn file_count(&self) -> usize;

    /// Move every staged file into the backup directory under a unique
    /// stored name. On failure nothing from this session remains visible.
    async fn commit(self: Box<Self>) -> StorageResult<Vec<CommittedFile>>;

    /// Remove everything staged so far
    async fn abort(self: Box<Self>);
}
