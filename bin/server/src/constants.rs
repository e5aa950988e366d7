/// Default backup directory
pub const DEFAULT_BACKUP_DIR: &str = "backup_data";

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: &str = "8080";

/// Default per-file size limit (2 GiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Default number of file parts accepted in one upload request
pub const DEFAULT_MAX_FILE_COUNT: usize = 20;

/// Default multipart field name carrying file parts
pub const DEFAULT_UPLOAD_FIELD: &str = "files";

/// Default catalog listing path
pub const DEFAULT_CATALOG_PATH: &str = "/backup/files";

/// Paths owned by fixed routes that the catalog path must not shadow
pub const RESERVED_PATHS: &[&str] = &["/upload", "/health", "/files"];

/// Message returned with a successful upload manifest
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";
