pub mod file_utils;
pub mod utils;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use utils::get_current_timestamp_ms;

/// One accepted file in an upload manifest
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub filename: String,     // Stored name
    pub originalname: String, // Client-supplied name, untrusted
    pub size: u64,
    pub url: String, // Retrieval path under /files
}

/// Response to a successful `POST /upload`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadManifest {
    pub message: String,
    pub count: usize,
    pub files: Vec<ManifestEntry>,
}

/// One stored file in the catalog
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub filename: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub url: String,
}

/// Response to a catalog listing request
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CatalogResponse {
    pub count: usize,
    pub files: Vec<CatalogEntry>,
}

/// Body of every non-2xx response
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String, // Machine-readable reason, e.g. "too_many_files"
}

/// Response from health check endpoint
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String, // "ok" when healthy
}
