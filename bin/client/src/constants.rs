/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Environment variable overriding the default server URL
pub const SERVER_URL_ENV: &str = "BACKUP_SERVER_URL";

/// Default multipart field name for file parts
pub const DEFAULT_UPLOAD_FIELD: &str = "files";

/// Default catalog listing path
pub const DEFAULT_CATALOG_PATH: &str = "/backup/files";

/// Default downloaded files directory name
pub const DOWNLOADED_DIR: &str = "downloaded";

/// Upload endpoint path
pub const UPLOAD_ENDPOINT: &str = "/upload";
