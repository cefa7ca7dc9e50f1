/// Result types produced by a search.
///
/// A search produces at most one [`MatchResult`] per file: the first row of
/// the file that contains the search text. Files that could not be read end
/// up as [`SkippedFile`] entries so a single corrupt workbook never hides the
/// rest of the tree. [`SearchReport`] collects both, together with how the
/// session ended.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The first matching row of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The path to the file
    pub path: PathBuf,
    /// Cell values of the found row, as text
    pub row: Vec<String>,
}

impl MatchResult {
    pub fn new(path: impl Into<PathBuf>, row: Vec<String>) -> Self {
        Self {
            path: path.into(),
            row,
        }
    }

    /// Path relative to `base`, always with `/` separators
    pub fn relative_path(&self, base: &Path) -> String {
        let Ok(relative) = self.path.strip_prefix(base) else {
            return self.path.display().to_string();
        };
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Cell values joined with `, `
    pub fn joined_row(&self) -> String {
        self.row.join(", ")
    }
}

/// A candidate that could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// Every candidate was visited
    Completed,
    /// The user asked to stop before the walk finished
    Stopped,
}

/// Represents the complete search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Matches in the order they were found
    pub matches: Vec<MatchResult>,
    /// Number of candidate files opened
    pub files_scanned: usize,
    /// Candidates that failed to open or parse
    pub skipped: Vec<SkippedFile>,
    pub outcome: SearchOutcome,
}

impl Default for SearchReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchReport {
    /// Creates a new empty report
    pub fn new() -> Self {
        Self {
            matches: Vec::new(),
            files_scanned: 0,
            skipped: Vec::new(),
            outcome: SearchOutcome::Completed,
        }
    }

    pub fn add_match(&mut self, result: MatchResult) {
        self.matches.push(result);
    }

    pub fn add_skipped(&mut self, skipped: SkippedFile) {
        self.skipped.push(skipped);
    }

    pub fn files_with_matches(&self) -> usize {
        self.matches.len()
    }

    pub fn was_stopped(&self) -> bool {
        self.outcome == SearchOutcome::Stopped
    }

    /// True when a "no results" notice should be shown: the walk finished
    /// without any match. A user-initiated stop never warrants the notice.
    pub fn should_notify_empty(&self) -> bool {
        self.matches.is_empty() && !self.was_stopped()
    }
}
