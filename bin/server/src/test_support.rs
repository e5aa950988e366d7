//! Shared fixtures for in-process HTTP tests

use crate::state::{AppState, UploadLimits};
use actix_web::test::TestRequest;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use storage::{Storage, StorageBackend, StorageError, StorageResult, StoredFile, UploadSession};

pub const CATALOG_PATH: &str = "/backup/files";
pub const BOUNDARY: &str = "----backup-test-boundary-7MA4YWxkTrZu0gW";

/// Build an initialized service with every route registered
macro_rules! test_app {
    ($state:expr) => {{
        let state = actix_web::web::Data::new($state);
        actix_web::test::init_service(actix_web::App::new().app_data(state).configure(|cfg| {
            $crate::handlers::configure(cfg, $crate::test_support::CATALOG_PATH)
        }))
        .await
    }};
}
pub(crate) use test_app;

/// One multipart part; `filename` is `None` for plain text fields
pub struct Part {
    field: String,
    filename: Option<String>,
    content: Vec<u8>,
}

impl Part {
    pub fn file(field: &str, filename: &str, content: &[u8]) -> Self {
        Self {
            field: field.to_string(),
            filename: Some(filename.to_string()),
            content: content.to_vec(),
        }
    }

    pub fn text(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            filename: None,
            content: value.as_bytes().to_vec(),
        }
    }
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match &part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.field, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.field
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(&part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(parts: &[Part]) -> TestRequest {
    TestRequest::post()
        .uri("/upload")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(parts))
}

pub async fn test_state(dir: &Path, max_file_size: u64, max_file_count: usize) -> AppState {
    let storage = StorageBackend::Filesystem(dir.to_path_buf())
        .initialize()
        .await
        .unwrap();
    AppState::new(
        storage,
        UploadLimits {
            max_file_size,
            max_file_count,
            field_name: "files".to_string(),
        },
    )
}

/// Names of the regular files directly inside `dir`
pub fn file_names_in(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect()
}

/// Storage whose disk is permanently broken
struct FailingStorage;

fn disk_error() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, "No space left on device")
}

#[async_trait]
impl Storage for FailingStorage {
    async fn begin_upload(&self) -> StorageResult<Box<dyn UploadSession>> {
        Err(StorageError::io("Failed to create staging file", disk_error()))
    }

    async fn list_files(&self) -> StorageResult<Vec<StoredFile>> {
        Err(StorageError::CatalogUnavailable {
            path: "/unavailable".into(),
            source: disk_error(),
        })
    }

    async fn open_file(&self, _stored_name: &str) -> StorageResult<(tokio::fs::File, StoredFile)> {
        Err(StorageError::io("Failed to open", disk_error()))
    }
}

pub fn failing_state() -> AppState {
    AppState::new(
        Arc::new(FailingStorage),
        UploadLimits {
            max_file_size: 1024,
            max_file_count: 3,
            field_name: "files".to_string(),
        },
    )
}
