use config::{Config as ConfigBuilder, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{CsvOptions, SearchRequest};
use crate::errors::{SearchError, SearchResult};

const APP_DIR: &str = "sheetscout";
const SETTINGS_FILE: &str = "settings.yaml";

/// What the user entered last time, restored on the next start.
///
/// # Location
///
/// `<config dir>/sheetscout/settings.yaml`, where the config directory is the
/// platform's per-user one (`~/.config` on Linux, `%APPDATA%` on Windows). If
/// the platform has none, the file lives in the temp directory instead. The
/// CLI accepts `--settings <file>` to point somewhere else.
///
/// # Format
///
/// A single `search` section. Every key is optional; unknown keys are ignored.
/// ```yaml
/// search:
///   path: /data/excels
///   filename_match: report
///   search_text: britain
///   open_in_editor: true
///   recursive_search: false
///   include_csv: false
///   log_level: warn
/// ```
///
/// Values typed on the command line take precedence, see
/// [`merge_with_cli`](Settings::merge_with_cli).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base directory of the last search
    #[serde(default)]
    pub path: PathBuf,

    #[serde(default)]
    pub filename_match: String,

    #[serde(default)]
    pub search_text: String,

    /// Export the results and open them once a search completes
    #[serde(default)]
    pub open_in_editor: bool,

    #[serde(default)]
    pub recursive_search: bool,

    #[serde(default)]
    pub include_csv: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            filename_match: String::new(),
            search_text: String::new(),
            open_in_editor: false,
            recursive_search: false,
            include_csv: false,
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    search: Settings,
}

/// Values given on the command line; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub path: Option<PathBuf>,
    pub filename_match: Option<String>,
    pub search_text: Option<String>,
    pub open_in_editor: Option<bool>,
    pub recursive_search: Option<bool>,
    pub include_csv: Option<bool>,
    pub log_level: Option<String>,
}

impl Settings {
    /// The per-user settings file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }

    /// Loads settings from the default location
    pub fn load() -> SearchResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Loads settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> SearchResult<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let file: SettingsFile = ConfigBuilder::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| SearchError::config_error(format!("{}: {}", path.display(), e)))?;

        debug!("Loaded settings from {}", path.display());
        Ok(file.search)
    }

    /// Writes the settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> SearchResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(&SettingsFile {
            search: self.clone(),
        })?;
        fs::write(path, yaml)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Merges command-line values over the stored ones
    pub fn merge_with_cli(mut self, cli: SettingsOverrides) -> Self {
        if let Some(path) = cli.path {
            self.path = path;
        }
        if let Some(filename_match) = cli.filename_match {
            self.filename_match = filename_match;
        }
        if let Some(search_text) = cli.search_text {
            self.search_text = search_text;
        }
        if let Some(open_in_editor) = cli.open_in_editor {
            self.open_in_editor = open_in_editor;
        }
        if let Some(recursive_search) = cli.recursive_search {
            self.recursive_search = recursive_search;
        }
        if let Some(include_csv) = cli.include_csv {
            self.include_csv = include_csv;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Builds the request for a search with these settings
    pub fn to_request(&self, csv: CsvOptions) -> SearchRequest {
        SearchRequest::new(&self.path, &self.filename_match, &self.search_text)
            .recursive(self.recursive_search)
            .include_csv(self.include_csv)
            .csv_options(csv)
    }

    /// Remembers the inputs of a search that was started
    pub fn update_from_request(&mut self, request: &SearchRequest) {
        self.path = request.root_path.clone();
        self.filename_match = request.filename_pattern.clone();
        self.search_text = request.search_text.clone();
        self.recursive_search = request.recursive;
        self.include_csv = request.include_csv;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.yaml");

        let settings = Settings {
            path: PathBuf::from("/data/excels"),
            filename_match: "report".into(),
            search_text: "2024".into(),
            open_in_editor: true,
            recursive_search: true,
            include_csv: false,
            log_level: "debug".into(),
        };
        settings.save_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("search:"));
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "search:\n  filename_match: budget\n  include_csv: true\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.filename_match, "budget");
        assert!(settings.include_csv);
        assert!(!settings.recursive_search);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "search: [unclosed\n").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, SearchError::ConfigError(_)));
    }

    #[test]
    fn test_cli_values_take_precedence() {
        let stored = Settings {
            filename_match: "report".into(),
            search_text: "britain".into(),
            recursive_search: true,
            ..Settings::default()
        };

        let merged = stored.merge_with_cli(SettingsOverrides {
            search_text: Some("france".into()),
            recursive_search: Some(false),
            ..SettingsOverrides::default()
        });

        assert_eq!(merged.filename_match, "report");
        assert_eq!(merged.search_text, "france");
        assert!(!merged.recursive_search);
    }

    #[test]
    fn test_request_round_trip() {
        let settings = Settings {
            path: PathBuf::from("/data"),
            filename_match: "report".into(),
            search_text: "britain".into(),
            include_csv: true,
            ..Settings::default()
        };
        let request = settings.to_request(CsvOptions::default());
        assert_eq!(request.root_path, PathBuf::from("/data"));
        assert!(request.include_csv);
        assert!(!request.recursive);

        let mut updated = Settings::default();
        updated.update_from_request(&request);
        assert_eq!(updated.filename_match, "report");
        assert_eq!(updated.search_text, "britain");
    }
}
