/// Error types for sheetscout.
///
/// Failures fall into three groups, and callers are expected to treat them
/// differently:
///
/// 1. **Request errors** (`MissingInput`, `FileNotFound`, `NotADirectory`,
///    `InvalidPattern`, `ConfigError`) are raised before a search starts and
///    are shown to the user. Nothing is scanned.
///
/// 2. **Per-file errors** (`Workbook`, `Csv`, `IoError`, `PermissionDenied`)
///    come from reading one candidate file. The session logs them, reports the
///    file as skipped and moves on to the next candidate:
///    ```rust,ignore
///    match processor.find_first_row(&path, &cancel) {
///        Ok(row) => // record the row if any,
///        Err(e) if e.is_per_file() => // skip and continue,
///        Err(e) => return Err(e),
///    }
///    ```
///
/// 3. **Invariant violations** (`UnsupportedExtension`) mean the enumerator let
///    through a file the matcher cannot read. They abort the session.
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while configuring or running a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Missing required input: {0}")]
    MissingInput(&'static str),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(PathBuf),
    #[error("Failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },
    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("A search is already running")]
    AlreadyRunning,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl SearchError {
    pub fn missing_input(field: &'static str) -> Self {
        Self::MissingInput(field)
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn unsupported_extension(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedExtension(path.into())
    }

    pub fn workbook(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Workbook {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an IO error on `path` to the most specific variant
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }

    /// True for failures scoped to a single candidate file. The session skips
    /// such files instead of aborting.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_)
                | Self::PermissionDenied(_)
                | Self::Workbook { .. }
                | Self::Csv { .. }
                | Self::IoError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let path = Path::new("report.xlsx");
        let err = SearchError::file_not_found(path);
        assert!(matches!(err, SearchError::FileNotFound(_)));

        let err = SearchError::permission_denied(path);
        assert!(matches!(err, SearchError::PermissionDenied(_)));

        let err = SearchError::invalid_pattern("[report");
        assert!(matches!(err, SearchError::InvalidPattern(_)));

        let err = SearchError::unsupported_extension("notes.txt");
        assert!(matches!(err, SearchError::UnsupportedExtension(_)));

        let err = SearchError::workbook(path, "zip error");
        assert!(matches!(err, SearchError::Workbook { .. }));
    }

    #[test]
    fn test_error_messages() {
        let err = SearchError::missing_input("search text");
        assert_eq!(err.to_string(), "Missing required input: search text");

        let err = SearchError::workbook("a/b.xlsx", "invalid zip header");
        assert_eq!(
            err.to_string(),
            "Failed to read workbook a/b.xlsx: invalid zip header"
        );

        let err = SearchError::config_error("unknown encoding label: klingon");
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown encoding label: klingon"
        );

        assert_eq!(
            SearchError::AlreadyRunning.to_string(),
            "A search is already running"
        );
    }

    #[test]
    fn test_from_io_maps_kinds() {
        let path = Path::new("locked.xlsx");
        let err = SearchError::from_io(
            path,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, SearchError::PermissionDenied(_)));

        let err = SearchError::from_io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, SearchError::FileNotFound(_)));

        let err = SearchError::from_io(path, std::io::Error::other("disk on fire"));
        assert!(matches!(err, SearchError::IoError(_)));
    }

    #[test]
    fn test_per_file_classification() {
        assert!(SearchError::workbook("x.xlsx", "bad").is_per_file());
        assert!(SearchError::permission_denied("x.xls").is_per_file());
        assert!(!SearchError::unsupported_extension("x.txt").is_per_file());
        assert!(!SearchError::missing_input("path").is_per_file());
        assert!(!SearchError::AlreadyRunning.is_per_file());
    }
}
