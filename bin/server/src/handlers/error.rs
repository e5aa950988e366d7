use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::ErrorResponse;
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};

/// Every failure a handler can report to a client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("File too large (limit: {limit} bytes)")]
    FileTooLarge { limit: u64 },

    #[error("Too many files (limit: {limit})")]
    TooManyFiles { limit: usize },

    #[error("No file inserted")]
    NoFile,

    #[error("Invalid multipart body: {0}")]
    InvalidMultipart(String),

    #[error("{0}")]
    InvalidFilename(&'static str),

    #[error("File not found")]
    NotFound,

    #[error("Backup directory unavailable")]
    CatalogUnavailable,

    #[error("Server error")]
    Server,
}

impl ApiError {
    /// Machine-readable reason returned next to the message
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::FileTooLarge { .. } => "file_too_large",
            ApiError::TooManyFiles { .. } => "too_many_files",
            ApiError::NoFile => "no_file",
            ApiError::InvalidMultipart(_) => "invalid_multipart",
            ApiError::InvalidFilename(_) => "invalid_filename",
            ApiError::NotFound => "not_found",
            ApiError::CatalogUnavailable => "catalog_unavailable",
            ApiError::Server => "server_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::TooManyFiles { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NoFile | ApiError::InvalidMultipart(_) | ApiError::InvalidFilename(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::CatalogUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            message: self.to_string(),
            code: self.code().to_string(),
        })
    }
}

/// Helper function for malformed multipart bodies
pub fn handle_multipart_error<E: std::fmt::Display>(e: E) -> ApiError {
    warn!("Failed to read multipart body: {}", e);
    ApiError::InvalidMultipart(e.to_string())
}

/// Helper function mapping storage failures; the cause is logged, never sent to the client
pub fn handle_storage_error(msg: &str, e: StorageError) -> ApiError {
    match e {
        StorageError::NotFound(name) => {
            warn!(stored_name = ?name, "{}: not found", msg);
            ApiError::NotFound
        }
        StorageError::InvalidName { name, reason } => {
            warn!(stored_name = ?name, "{}: {}", msg, reason);
            ApiError::InvalidFilename(reason)
        }
        e @ StorageError::CatalogUnavailable { .. } => {
            error!("{}: {}", msg, e);
            ApiError::CatalogUnavailable
        }
        e => {
            error!("{}: {}", msg, e);
            ApiError::Server
        }
    }
}
