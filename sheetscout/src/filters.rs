/// Filename filtering for candidate files.
///
/// A candidate must satisfy two rules:
///
/// 1. **Extension**: one of the spreadsheet formats the processor can open
///    (`xlsx`, `xltx`, `xlsm`, `xls`), plus `csv` when CSV search is enabled.
///    Extensions compare case-insensitively, so `REPORT.XLSX` qualifies.
///
/// 2. **Name pattern**: the file name must match `*{pattern}*.{ext}` for its
///    extension. The user's pattern is inserted verbatim, so `2024*q1` keeps
///    its wildcard meaning while a plain `report` simply has to appear
///    somewhere before the extension.
///
/// Office owner files (`~$Budget.xlsx`) are created next to workbooks that
/// are open in Excel and are never valid workbooks, so they are ignored.
use glob::{MatchOptions, Pattern};
use std::path::Path;

use crate::errors::{SearchError, SearchResult};

const LOCK_FILE_PREFIX: &str = "~$";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// File formats the processor knows how to scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpreadsheetKind {
    Xlsx,
    Xltx,
    Xlsm,
    Xls,
    Csv,
}

impl SpreadsheetKind {
    pub const ALL: [SpreadsheetKind; 5] = [
        SpreadsheetKind::Xlsx,
        SpreadsheetKind::Xltx,
        SpreadsheetKind::Xlsm,
        SpreadsheetKind::Xls,
        SpreadsheetKind::Csv,
    ];

    /// Lowercase extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            SpreadsheetKind::Xlsx => "xlsx",
            SpreadsheetKind::Xltx => "xltx",
            SpreadsheetKind::Xlsm => "xlsm",
            SpreadsheetKind::Xls => "xls",
            SpreadsheetKind::Csv => "csv",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Formats read through the Office Open XML reader
    pub fn is_open_xml(self) -> bool {
        matches!(
            self,
            SpreadsheetKind::Xlsx | SpreadsheetKind::Xltx | SpreadsheetKind::Xlsm
        )
    }
}

/// Returns the formats that are searched for the given CSV setting
pub fn recognized_kinds(include_csv: bool) -> Vec<SpreadsheetKind> {
    SpreadsheetKind::ALL
        .into_iter()
        .filter(|kind| include_csv || *kind != SpreadsheetKind::Csv)
        .collect()
}

/// Checks if a file should be ignored regardless of the name pattern
pub fn should_ignore(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOCK_FILE_PREFIX))
}

/// Compiled filename filter for one search
#[derive(Debug, Clone)]
pub struct FileFilter {
    rules: Vec<(SpreadsheetKind, Pattern)>,
}

impl FileFilter {
    /// Builds one glob per active extension from the user's name pattern
    pub fn new(name_pattern: &str, include_csv: bool) -> SearchResult<Self> {
        let rules = recognized_kinds(include_csv)
            .into_iter()
            .map(|kind| {
                let glob = format!("*{}*.{}", name_pattern, kind.extension());
                Pattern::new(&glob)
                    .map(|pattern| (kind, pattern))
                    .map_err(|e| SearchError::invalid_pattern(format!("{}: {}", name_pattern, e)))
            })
            .collect::<SearchResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Determines if a file should be handed to the processor
    pub fn should_include_file(&self, path: &Path) -> bool {
        if should_ignore(path) {
            return false;
        }
        let Some(kind) = SpreadsheetKind::from_path(path) else {
            return false;
        };
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.rules
            .iter()
            .filter(|(rule_kind, _)| *rule_kind == kind)
            .any(|(_, pattern)| pattern.matches_with(name, MATCH_OPTIONS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        let filter = FileFilter::new("a", false).unwrap();
        assert!(filter.should_include_file(Path::new("a.xlsx")));
        assert!(filter.should_include_file(Path::new("a.XLSM")));
        assert!(filter.should_include_file(Path::new("a.xltx")));
        assert!(filter.should_include_file(Path::new("a.xls")));
        assert!(!filter.should_include_file(Path::new("a.csv")));
        assert!(!filter.should_include_file(Path::new("a.txt")));
        assert!(!filter.should_include_file(Path::new("xlsx")));

        let with_csv = FileFilter::new("a", true).unwrap();
        assert!(with_csv.should_include_file(Path::new("a.CSV")));
    }

    #[test]
    fn test_should_ignore_lock_files() {
        assert!(should_ignore(Path::new("dir/~$report.xlsx")));
        assert!(!should_ignore(Path::new("dir/report.xlsx")));
        assert!(!should_ignore(Path::new("dir/report~$.xlsx")));
    }

    #[test]
    fn test_substring_pattern() {
        let filter = FileFilter::new("report", false).unwrap();
        assert!(filter.should_include_file(Path::new("Sub1/report_2024.xlsx")));
        assert!(filter.should_include_file(Path::new("Sub1/2024_Report.XLSX")));
        assert!(filter.should_include_file(Path::new("report.xls")));
        assert!(!filter.should_include_file(Path::new("Sub2/notes.txt")));
        assert!(!filter.should_include_file(Path::new("Sub2/summary.xlsx")));
        assert!(!filter.should_include_file(Path::new("report.csv")));
        assert!(!filter.should_include_file(Path::new("~$report.xlsx")));
    }

    #[test]
    fn test_pattern_must_precede_extension() {
        let filter = FileFilter::new("xlsx", false).unwrap();
        assert!(!filter.should_include_file(Path::new("budget.xlsx")));
        assert!(filter.should_include_file(Path::new("xlsx_exports.xlsx")));
    }

    #[test]
    fn test_csv_toggle() {
        let without = FileFilter::new("data", false).unwrap();
        let with = FileFilter::new("data", true).unwrap();
        assert!(!without.should_include_file(Path::new("data.csv")));
        assert!(with.should_include_file(Path::new("data.csv")));
        assert_eq!(recognized_kinds(true).len(), 5);
        assert_eq!(recognized_kinds(false).len(), 4);
    }

    #[test]
    fn test_wildcards_in_pattern() {
        let filter = FileFilter::new("2024*q1", false).unwrap();
        assert!(filter.should_include_file(Path::new("sales_2024_final_q1.xlsx")));
        assert!(!filter.should_include_file(Path::new("sales_2023_q1.xlsx")));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FileFilter::new("[report", false).unwrap_err();
        assert!(matches!(err, SearchError::InvalidPattern(_)));
    }

    #[test]
    fn test_kind_lookup() {
        assert_eq!(
            SpreadsheetKind::from_path(Path::new("a.XlSx")),
            Some(SpreadsheetKind::Xlsx)
        );
        assert_eq!(SpreadsheetKind::from_path(Path::new("a.ods")), None);
        assert!(SpreadsheetKind::Xlsm.is_open_xml());
        assert!(!SpreadsheetKind::Xls.is_open_xml());
    }
}
