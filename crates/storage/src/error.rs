use std::path::PathBuf;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backup directory {path:?} is unavailable: {source}")]
    CatalogUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File {0} not found")]
    NotFound(String),

    #[error("Invalid stored name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("No unique name found for {0} after {1} attempts")]
    NameExhausted(String, u32),

    #[error("Upload session misuse: {0}")]
    Session(&'static str),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            context: context.into(),
            source,
        }
    }
}
