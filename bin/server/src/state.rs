//! Server application state

use std::sync::Arc;
use storage::Storage;

/// Limits applied to every upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest accepted file part, in bytes (inclusive)
    pub max_file_size: u64,
    /// Largest accepted number of file parts per request (inclusive)
    pub max_file_count: usize,
    /// Multipart field name carrying file parts
    pub field_name: String,
}

/// Shared per-worker state. Holds no catalog data; the backup directory is
/// the only source of truth.
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub limits: UploadLimits,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, limits: UploadLimits) -> Self {
        Self { storage, limits }
    }
}
