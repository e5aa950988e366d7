use crate::{filesystem::FilesystemStorage, Storage, StorageResult};
use std::path::PathBuf;
use std::sync::Arc;

/// Storage backend type
pub enum StorageBackend {
    /// Filesystem storage rooted at the backup directory
    Filesystem(PathBuf),
}

impl StorageBackend {
    /// Initialize storage backend based on type
    pub async fn initialize(self) -> StorageResult<Arc<dyn Storage>> {
        match self {
            StorageBackend::Filesystem(backup_dir) => {
                let storage = FilesystemStorage::initialize(backup_dir).await?;
                Ok(Arc::new(storage))
            }
        }
    }
}
