/// Plain-text export of search results.
///
/// Each match becomes two lines: the file path relative to the base
/// directory (always with `/` separators) and, indented by four spaces, the
/// cells of the found row joined with `, `.
///
/// ```text
/// Sub1/report_2024.xlsx
///     , Great Britain
/// Sub2/deep/report_q3.xls
///     GB, Great Britain, 42
/// ```
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::SearchResult;
use crate::results::MatchResult;

const ROW_INDENT: &str = "    ";

/// Writes `results` to `writer` in the export format
pub fn write_results<W: Write>(
    writer: &mut W,
    base: &Path,
    results: &[MatchResult],
) -> SearchResult<()> {
    for result in results {
        writeln!(writer, "{}", result.relative_path(base))?;
        writeln!(writer, "{}{}", ROW_INDENT, result.joined_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one JSON object per line for each match, with the keys `path`,
/// `relative_path` and `row`
pub fn write_json_lines<W: Write>(
    writer: &mut W,
    base: &Path,
    results: &[MatchResult],
) -> SearchResult<()> {
    for result in results {
        let line = serde_json::json!({
            "path": result.path,
            "relative_path": result.relative_path(base),
            "row": result.row,
        });
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `results` to a new temporary `.txt` file that outlives the process
pub fn export_to_temp_file(base: &Path, results: &[MatchResult]) -> SearchResult<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("sheetscout-")
        .suffix(".txt")
        .tempfile()?;
    write_results(file.as_file_mut(), base, results)?;

    let (_, path) = file.keep().map_err(|e| e.error)?;
    info!("Exported {} results to {}", results.len(), path.display());
    Ok(path)
}

/// Writes `results` to `path`, replacing any existing file
pub fn export_to_file(path: &Path, base: &Path, results: &[MatchResult]) -> SearchResult<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_results(&mut file, base, results)?;
    info!("Exported {} results to {}", results.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample() -> (PathBuf, Vec<MatchResult>) {
        let base = PathBuf::from("/data/excels");
        let results = vec![
            MatchResult::new(
                base.join("Sub1").join("report_2024.xlsx"),
                vec!["".into(), "Great Britain".into()],
            ),
            MatchResult::new(
                base.join("Sub2").join("deep").join("report_q3.xls"),
                vec!["GB".into(), "Great Britain".into(), "42".into()],
            ),
        ];
        (base, results)
    }

    #[test]
    fn test_write_results_format() {
        let (base, results) = sample();
        let mut out = Vec::new();
        write_results(&mut out, &base, &results).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Sub1/report_2024.xlsx\n    , Great Britain\n\
             Sub2/deep/report_q3.xls\n    GB, Great Britain, 42\n"
        );
    }

    #[test]
    fn test_json_lines() {
        let (base, results) = sample();
        let mut out = Vec::new();
        write_json_lines(&mut out, &base, &results).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["relative_path"], "Sub1/report_2024.xlsx");
        assert_eq!(lines[1]["row"][2], "42");
    }

    #[test]
    fn test_no_results_writes_nothing() {
        let mut out = Vec::new();
        write_results(&mut out, Path::new("/data"), &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_temp_file_is_kept() {
        let (base, results) = sample();
        let path = export_to_temp_file(&base, &results).unwrap();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("txt"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Sub1/report_2024.xlsx\n"));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let (base, results) = sample();
        let path = dir.path().join("out.txt");
        export_to_file(&path, &base, &results).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 4);
    }
}
