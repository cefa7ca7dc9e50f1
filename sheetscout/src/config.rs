use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::{SearchError, SearchResult};
use crate::filters::FileFilter;

/// Options for reading CSV candidates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Field delimiter. `None` sniffs it from the first lines of each file.
    #[serde(default)]
    pub delimiter: Option<u8>,

    /// Encoding label forced on every file without a BOM. `None` detects the
    /// encoding per file.
    #[serde(default)]
    pub encoding: Option<String>,
}

impl CsvOptions {
    /// Resolves the forced encoding label, if one is set
    pub fn forced_encoding(&self) -> SearchResult<Option<&'static Encoding>> {
        let Some(label) = &self.encoding else {
            return Ok(None);
        };
        Encoding::for_label(label.trim().as_bytes())
            .map(Some)
            .ok_or_else(|| SearchError::config_error(format!("unknown encoding label: {}", label)))
    }
}

/// One search, fixed for its whole duration.
///
/// A request is usually built from the saved [`Settings`](crate::settings::Settings)
/// merged with whatever the user typed, then checked with [`validate`](Self::validate)
/// before any directory is touched:
///
/// ```rust,ignore
/// let request = settings.to_request(CsvOptions::default());
/// request.validate()?;
/// let report = SearchSession::new().start(&request, |event| { /* ... */ })?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Directory the walk starts from
    pub root_path: PathBuf,

    /// Substring (glob wildcards allowed) a file name must contain
    pub filename_pattern: String,

    /// Text looked up case-insensitively in every cell
    pub search_text: String,

    /// Descend the whole tree instead of only the immediate subdirectories
    #[serde(default)]
    pub recursive: bool,

    /// Also search `.csv` files
    #[serde(default)]
    pub include_csv: bool,

    #[serde(default)]
    pub csv: CsvOptions,
}

impl SearchRequest {
    pub fn new(
        root_path: impl Into<PathBuf>,
        filename_pattern: impl Into<String>,
        search_text: impl Into<String>,
    ) -> Self {
        Self {
            root_path: root_path.into(),
            filename_pattern: filename_pattern.into(),
            search_text: search_text.into(),
            recursive: false,
            include_csv: false,
            csv: CsvOptions::default(),
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn include_csv(mut self, include_csv: bool) -> Self {
        self.include_csv = include_csv;
        self
    }

    pub fn csv_options(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    /// Checks that the request can start: inputs present, base directory
    /// present, filename pattern and encoding label valid.
    pub fn validate(&self) -> SearchResult<()> {
        if self.root_path.as_os_str().is_empty() {
            return Err(SearchError::missing_input("path"));
        }
        if self.filename_pattern.trim().is_empty() {
            return Err(SearchError::missing_input("filename match"));
        }
        if self.search_text.is_empty() {
            return Err(SearchError::missing_input("search text"));
        }
        if !self.root_path.exists() {
            return Err(SearchError::file_not_found(&self.root_path));
        }
        if !self.root_path.is_dir() {
            return Err(SearchError::NotADirectory(self.root_path.clone()));
        }
        self.file_filter()?;
        self.csv.forced_encoding()?;
        Ok(())
    }

    /// Compiles the filename filter for this request
    pub fn file_filter(&self) -> SearchResult<FileFilter> {
        FileFilter::new(self.filename_pattern.trim(), self.include_csv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_inputs_are_reported_in_order() {
        let dir = tempdir().unwrap();

        let request = SearchRequest::new("", "report", "britain");
        assert!(matches!(
            request.validate(),
            Err(SearchError::MissingInput("path"))
        ));

        let request = SearchRequest::new(dir.path(), "  ", "britain");
        assert!(matches!(
            request.validate(),
            Err(SearchError::MissingInput("filename match"))
        ));

        let request = SearchRequest::new(dir.path(), "report", "");
        assert!(matches!(
            request.validate(),
            Err(SearchError::MissingInput("search text"))
        ));

        let request = SearchRequest::new(dir.path(), "report", "britain");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_base_path_must_be_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let request = SearchRequest::new(&missing, "report", "x");
        assert!(matches!(
            request.validate(),
            Err(SearchError::FileNotFound(_))
        ));

        let file = dir.path().join("file.xlsx");
        std::fs::write(&file, b"").unwrap();
        let request = SearchRequest::new(&file, "report", "x");
        assert!(matches!(
            request.validate(),
            Err(SearchError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_invalid_encoding_label() {
        let dir = tempdir().unwrap();
        let request = SearchRequest::new(dir.path(), "report", "x").csv_options(CsvOptions {
            delimiter: None,
            encoding: Some("klingon".to_string()),
        });
        assert!(matches!(
            request.validate(),
            Err(SearchError::ConfigError(_))
        ));
    }

    #[test]
    fn test_default_csv_options_detect_encoding() {
        let csv = CsvOptions::default();
        assert_eq!(csv.delimiter, None);
        assert_eq!(csv.forced_encoding().unwrap(), None);

        let forced = CsvOptions {
            encoding: Some(" cp1251 ".to_string()),
            ..CsvOptions::default()
        };
        assert_eq!(
            forced.forced_encoding().unwrap(),
            Some(encoding_rs::WINDOWS_1251)
        );
    }
}
