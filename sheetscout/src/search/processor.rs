use calamine::{open_workbook, Data, Reader, Xls, Xlsx};
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

use super::cancel::CancelToken;
use super::encoding::decode_text;
use super::matcher::TextMatcher;
use crate::config::{CsvOptions, SearchRequest};
use crate::errors::{SearchError, SearchResult};
use crate::filters::SpreadsheetKind;

/// Delimiters tried when a CSV file's delimiter is not configured
const DELIMITER_CANDIDATES: &[u8] = b"\t;,|";

/// Lines inspected when sniffing a delimiter
const SNIFF_LINES: usize = 10;

/// Text form of a cell as shown to the user and matched against
fn cell_text(cell: &Data) -> Cow<'_, str> {
    match cell {
        Data::Empty => Cow::Borrowed(""),
        Data::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

fn trim_trailing_empty(mut row: Vec<String>) -> Vec<String> {
    while row.last().is_some_and(|cell| cell.is_empty()) {
        row.pop();
    }
    row
}

/// Picks the delimiter that splits the first lines into the most consistent
/// number of fields. Falls back to a comma.
fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(SNIFF_LINES).collect();
    if sample.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0usize;

    for &delimiter in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delimiter)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let first = counts[0];
        if first <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == first).count();
        let score = consistent * first;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }

    best
}

/// Walks `rows` in order and returns the cells of the first one accepted by
/// `row_matches`. `cancel` is checked before each row.
fn first_matching_row<I, T, M, C>(
    rows: I,
    cancel: &CancelToken,
    row_matches: M,
    to_cells: C,
) -> SearchResult<Option<Vec<String>>>
where
    I: IntoIterator<Item = SearchResult<T>>,
    M: Fn(&T) -> bool,
    C: FnOnce(T) -> Vec<String>,
{
    for row in rows {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let row = row?;
        if row_matches(&row) {
            return Ok(Some(trim_trailing_empty(to_cells(row))));
        }
    }
    Ok(None)
}

/// Opens one candidate and finds its first matching row
#[derive(Debug, Clone)]
pub struct FileProcessor {
    matcher: TextMatcher,
    csv_delimiter: Option<u8>,
    forced_encoding: Option<&'static Encoding>,
}

impl FileProcessor {
    /// Creates a new FileProcessor with the given matcher and CSV options
    pub fn new(matcher: TextMatcher, csv: &CsvOptions) -> SearchResult<Self> {
        Ok(Self {
            matcher,
            csv_delimiter: csv.delimiter,
            forced_encoding: csv.forced_encoding()?,
        })
    }

    pub fn from_request(request: &SearchRequest) -> SearchResult<Self> {
        Self::new(TextMatcher::new(&request.search_text), &request.csv)
    }

    /// Returns the first row of `path` with a cell containing the search text.
    ///
    /// Returns `Ok(None)` when no row matches or when `cancel` fires between
    /// rows. Only the first sheet of a workbook is read.
    pub fn find_first_row(
        &self,
        path: &Path,
        cancel: &CancelToken,
    ) -> SearchResult<Option<Vec<String>>> {
        trace!("Processing file: {}", path.display());

        let kind = SpreadsheetKind::from_path(path)
            .ok_or_else(|| SearchError::unsupported_extension(path))?;

        match kind {
            SpreadsheetKind::Xls => self.scan_workbook::<Xls<_>>(path, cancel),
            SpreadsheetKind::Csv => self.scan_csv(path, cancel),
            k if k.is_open_xml() => self.scan_workbook::<Xlsx<_>>(path, cancel),
            _ => Err(SearchError::unsupported_extension(path)),
        }
    }

    fn scan_workbook<R>(
        &self,
        path: &Path,
        cancel: &CancelToken,
    ) -> SearchResult<Option<Vec<String>>>
    where
        R: Reader<BufReader<File>>,
        R::Error: std::fmt::Display,
    {
        let mut workbook = open_workbook::<R, _>(path)
            .map_err(|e| SearchError::workbook(path, e.to_string()))?;

        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(|e| SearchError::workbook(path, e.to_string()))?,
            None => {
                trace!("Workbook has no sheets: {}", path.display());
                return Ok(None);
            }
        };

        // The range starts at the first used cell; rows are reported from column A
        let leading_blank = range.start().map_or(0, |(_, col)| col as usize);

        first_matching_row(
            range.rows().map(Ok),
            cancel,
            |row: &&[Data]| row.iter().any(|cell| self.matcher.is_match(&cell_text(cell))),
            |row: &[Data]| {
                std::iter::repeat(String::new())
                    .take(leading_blank)
                    .chain(row.iter().map(|cell| cell_text(cell).into_owned()))
                    .collect()
            },
        )
    }

    fn scan_csv(&self, path: &Path, cancel: &CancelToken) -> SearchResult<Option<Vec<String>>> {
        let bytes = std::fs::read(path).map_err(|e| SearchError::from_io(path, e))?;
        let decoded = decode_text(&bytes, self.forced_encoding);
        let delimiter = self
            .csv_delimiter
            .unwrap_or_else(|| sniff_delimiter(&decoded.text));

        trace!(
            "Reading {} as {} with delimiter {:?}",
            path.display(),
            decoded.encoding.name(),
            delimiter as char
        );

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(decoded.text.as_bytes());

        first_matching_row(
            reader
                .records()
                .map(|record| record.map_err(|e| SearchError::csv(path, e))),
            cancel,
            |record: &csv::StringRecord| self.matcher.any_match(record.iter()),
            |record: csv::StringRecord| record.iter().map(String::from).collect(),
        )
    }
}
