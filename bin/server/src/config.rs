use crate::constants::{
    DEFAULT_BACKUP_DIR, DEFAULT_CATALOG_PATH, DEFAULT_HOST, DEFAULT_MAX_FILE_COUNT,
    DEFAULT_MAX_FILE_SIZE, DEFAULT_PORT, DEFAULT_UPLOAD_FIELD, RESERVED_PATHS,
};
use crate::state::UploadLimits;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding stored files
    pub backup_dir: PathBuf,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Largest accepted file, in bytes
    pub max_file_size: u64,
    /// Largest accepted number of files per upload
    pub max_file_count: usize,
    /// Multipart field name for file parts
    pub field_name: String,
    /// Path serving the catalog listing
    pub catalog_path: String,
    /// Number of HTTP workers (actix default when unset)
    pub workers: Option<usize>,
}

impl ServerConfig {
    /// Load configuration with priority: command-line args > environment variables > defaults
    pub fn load() -> Result<Self, std::io::Error> {
        let matches = Self::command().get_matches();
        Self::from_matches(&matches, |key| std::env::var(key).ok())
    }

    pub fn command() -> Command {
        Command::new("server")
            .about("File backup server")
            .arg(
                Arg::new("backup-dir")
                    .long("backup-dir")
                    .value_name("DIR")
                    .help("Directory for stored files (default: backup_data, or BACKUP_DIR / UPLOAD_DIR env var)"),
            )
            .arg(
                Arg::new("port")
                    .long("port")
                    .value_name("PORT")
                    .help("Server port (default: 8080, or SERVER_PORT env var)"),
            )
            .arg(
                Arg::new("host")
                    .long("host")
                    .value_name("HOST")
                    .help("Server host (default: 0.0.0.0, or SERVER_HOST env var)"),
            )
            .arg(
                Arg::new("max-file-size")
                    .long("max-file-size")
                    .value_name("SIZE")
                    .help("Per-file size limit, e.g. 2GiB or 1048576 (default: 2GiB, or MAX_FILE_SIZE env var)"),
            )
            .arg(
                Arg::new("max-file-count")
                    .long("max-file-count")
                    .value_name("COUNT")
                    .help("Files accepted per upload (default: 20, or MAX_FILE_COUNT env var)"),
            )
            .arg(
                Arg::new("field-name")
                    .long("field-name")
                    .value_name("NAME")
                    .help("Multipart field carrying files (default: files, or UPLOAD_FIELD_NAME env var)"),
            )
            .arg(
                Arg::new("catalog-path")
                    .long("catalog-path")
                    .value_name("PATH")
                    .help("Catalog listing path (default: /backup/files, or CATALOG_PATH env var)"),
            )
            .arg(
                Arg::new("workers")
                    .long("workers")
                    .value_name("N")
                    .help("HTTP worker threads (default: one per core, or SERVER_WORKERS env var)"),
            )
    }

    pub fn from_matches(
        matches: &ArgMatches,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, std::io::Error> {
        let setting = |arg: &str, keys: &[&str]| -> Option<String> {
            matches
                .get_one::<String>(arg)
                .cloned()
                .or_else(|| keys.iter().find_map(|key| env(key)))
        };

        let backup_dir = PathBuf::from(
            setting("backup-dir", &["BACKUP_DIR", "UPLOAD_DIR"])
                .unwrap_or_else(|| DEFAULT_BACKUP_DIR.to_string()),
        );

        let host = setting("host", &["SERVER_HOST"]).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port_str = setting("port", &["SERVER_PORT"]).unwrap_or_else(|| DEFAULT_PORT.to_string());
        let port = port_str
            .parse()
            .map_err(|_| invalid_input(format!("Invalid port number: {}", port_str)))?;

        let max_file_size = match setting("max-file-size", &["MAX_FILE_SIZE"]) {
            Some(value) => parse_byte_size(&value)
                .map_err(|e| invalid_input(format!("Invalid max file size {:?}: {}", value, e)))?,
            None => DEFAULT_MAX_FILE_SIZE,
        };

        let max_file_count = match setting("max-file-count", &["MAX_FILE_COUNT"]) {
            Some(value) => parse_positive(&value)
                .map_err(|e| invalid_input(format!("Invalid max file count {:?}: {}", value, e)))?,
            None => DEFAULT_MAX_FILE_COUNT,
        };

        let field_name = setting("field-name", &["UPLOAD_FIELD_NAME"])
            .unwrap_or_else(|| DEFAULT_UPLOAD_FIELD.to_string());
        if field_name.trim().is_empty() {
            return Err(invalid_input("Upload field name cannot be empty".to_string()));
        }

        let catalog_path = setting("catalog-path", &["CATALOG_PATH"])
            .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string());
        validate_catalog_path(&catalog_path).map_err(invalid_input)?;

        let workers = setting("workers", &["SERVER_WORKERS"])
            .map(|value| {
                parse_positive(&value)
                    .map_err(|e| invalid_input(format!("Invalid worker count {:?}: {}", value, e)))
            })
            .transpose()?;

        Ok(ServerConfig {
            backup_dir,
            host,
            port,
            max_file_size,
            max_file_count,
            field_name,
            catalog_path,
            workers,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_size: self.max_file_size,
            max_file_count: self.max_file_count,
            field_name: self.field_name.clone(),
        }
    }
}

fn invalid_input(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message)
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Parse a byte size such as `1048576`, `512KB`, `2GiB` or `10 gb`.
/// Decimal suffixes (KB, MB, GB) are powers of 1000, binary ones (KiB, MiB, GiB)
/// powers of 1024. Zero is rejected.
pub fn parse_byte_size(value: &str) -> Result<u64, String> {
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let number: u64 = digits
        .parse()
        .map_err(|_| "expected a number of bytes".to_string())?;

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1_000,
        "m" | "mb" => 1_000_000,
        "g" | "gb" => 1_000_000_000,
        "kib" => 1 << 10,
        "mib" => 1 << 20,
        "gib" => 1 << 30,
        "tib" => 1 << 40,
        other => return Err(format!("unknown unit {:?}", other)),
    };

    let bytes = number
        .checked_mul(multiplier)
        .ok_or_else(|| "size overflows u64".to_string())?;
    if bytes == 0 {
        return Err("must be greater than zero".to_string());
    }
    Ok(bytes)
}

fn validate_catalog_path(path: &str) -> Result<(), String> {
    if !path.starts_with('/') || path.len() < 2 {
        return Err(format!(
            "Catalog path {:?} must start with '/' and name a resource",
            path
        ));
    }
    let trimmed = path.trim_end_matches('/');
    if RESERVED_PATHS.contains(&trimmed) {
        return Err(format!("Catalog path {:?} collides with a built-in route", path));
    }
    if trimmed.starts_with("/files/") {
        return Err(format!("Catalog path {:?} is inside the /files prefix", path));
    }
    Ok(())
}
