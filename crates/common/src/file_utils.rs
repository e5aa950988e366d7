use std::path::Path;

/// URL prefix under which stored files are exposed
pub const FILES_PREFIX: &str = "/files";

/// Error type for stored filename validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameValidationError {
    Empty,
    ContainsNullByte,
    ContainsPathSeparator,
    IsSpecialDirectory,
    InvalidFileName,
}

impl FilenameValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            FilenameValidationError::Empty => "Filename cannot be empty",
            FilenameValidationError::ContainsNullByte => "Filename cannot contain null bytes",
            FilenameValidationError::ContainsPathSeparator => {
                "Filename cannot contain path separators (/ or \\)"
            }
            FilenameValidationError::IsSpecialDirectory => "Filename cannot be '.' or '..'",
            FilenameValidationError::InvalidFileName => {
                "Invalid filename: must be a valid file name"
            }
        }
    }
}

impl std::fmt::Display for FilenameValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for FilenameValidationError {}

/// Returns true for characters allowed in a stored filename: `[A-Za-z0-9._-]`
pub fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Strip every character outside `[A-Za-z0-9._-]` from a client-supplied name.
///
/// Disallowed characters are deleted, not replaced. A name made only of
/// disallowed characters becomes the empty string.
pub fn sanitize_filename(original: &str) -> String {
    original.chars().filter(|c| is_safe_char(*c)).collect()
}

/// Build the stored filename `<epoch-millis>-<sanitized>`
pub fn stored_filename(timestamp_ms: u64, sanitized: &str) -> String {
    format!("{}-{}", timestamp_ms, sanitized)
}

/// Retrieval path for a stored file, relative to the server root
pub fn retrieval_path(stored_name: &str) -> String {
    format!("{}/{}", FILES_PREFIX, stored_name)
}

/// Validate a stored filename requested by a client before it touches the disk.
/// Checks that:
/// - the name is not empty and has no null bytes
/// - it contains no path separators (/, \)
/// - it is not "." or ".."
/// - `Path::new(name).file_name()` round-trips to the same name
pub fn validate_filename(filename: &str) -> Result<(), FilenameValidationError> {
    if filename.is_empty() {
        return Err(FilenameValidationError::Empty);
    }

    if filename.contains('\0') {
        return Err(FilenameValidationError::ContainsNullByte);
    }

    if filename.contains('/') || filename.contains('\\') {
        return Err(FilenameValidationError::ContainsPathSeparator);
    }

    if filename == "." || filename == ".." {
        return Err(FilenameValidationError::IsSpecialDirectory);
    }

    let path = Path::new(filename);
    if path.file_name().and_then(|n| n.to_str()) != Some(filename) {
        return Err(FilenameValidationError::InvalidFileName);
    }

    Ok(())
}
