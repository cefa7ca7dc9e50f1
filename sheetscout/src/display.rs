/// Path abbreviation for narrow status areas.
///
/// A path that does not fit keeps its first segment and as many trailing
/// segments as possible, with `...` standing in for the middle:
///
/// ```text
/// /home/ana/projects/sheets/Sub1/report_2024.xlsx
/// /home/.../Sub1/report_2024.xlsx
/// ```
///
/// Trailing segments win over leading ones because the directory currently
/// being searched is the interesting part. When not even the first and last
/// segment fit, the path is cut in the middle character by character.
use std::path::Path;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const ELLIPSIS: &str = "...";

/// How text width is counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidthMeasure {
    /// One unit per `char`
    Chars,
    /// Terminal columns, so wide CJK characters count twice
    #[default]
    Columns,
}

impl WidthMeasure {
    pub fn width(self, text: &str) -> usize {
        match self {
            WidthMeasure::Chars => text.chars().count(),
            WidthMeasure::Columns => UnicodeWidthStr::width(text),
        }
    }

    fn char_width(self, ch: char) -> usize {
        match self {
            WidthMeasure::Chars => 1,
            WidthMeasure::Columns => UnicodeWidthChar::width(ch).unwrap_or(0),
        }
    }
}

/// Abbreviates `path` to at most `max_width` units of `measure`
pub fn shorten_path(path: &Path, max_width: usize, measure: WidthMeasure) -> String {
    shorten(&path.display().to_string(), max_width, measure)
}

/// Abbreviates a path given as text
pub fn shorten(text: &str, max_width: usize, measure: WidthMeasure) -> String {
    if measure.width(text) <= max_width {
        return text.to_string();
    }

    let separator = if text.contains('\\') && !text.contains('/') {
        '\\'
    } else {
        '/'
    };
    let segments = split_segments(text, separator);

    if let Some(shortened) = keep_segments(&segments, separator, max_width, measure) {
        return shortened;
    }
    cut_middle(text, max_width, measure)
}

/// Splits on `separator`, gluing leading separators (root, UNC prefix) onto
/// the first real segment.
fn split_segments(text: &str, separator: char) -> Vec<String> {
    let mut segments: Vec<String> = text.split(separator).map(String::from).collect();
    while segments.len() > 1 && segments[0].is_empty() {
        segments.remove(0);
        segments[0].insert(0, separator);
    }
    segments
}

fn keep_segments(
    segments: &[String],
    separator: char,
    max_width: usize,
    measure: WidthMeasure,
) -> Option<String> {
    let count = segments.len();
    if count < 3 {
        return None;
    }

    let sep = separator.to_string();
    let join = |head: usize, tail: usize| {
        let mut parts: Vec<&str> = segments[..head].iter().map(String::as_str).collect();
        parts.push(ELLIPSIS);
        parts.extend(segments[count - tail..].iter().map(String::as_str));
        parts.join(&sep)
    };
    let fits = |head: usize, tail: usize| measure.width(&join(head, tail)) <= max_width;

    let (mut head, mut tail) = (1, 1);
    if !fits(head, tail) {
        return None;
    }
    while head + tail + 1 < count && fits(head, tail + 1) {
        tail += 1;
    }
    while head + tail + 1 < count && fits(head + 1, tail) {
        head += 1;
    }
    Some(join(head, tail))
}

fn cut_middle(text: &str, max_width: usize, measure: WidthMeasure) -> String {
    let ellipsis_width = measure.width(ELLIPSIS);
    if max_width <= ellipsis_width {
        return take_prefix(text, max_width, measure).to_string();
    }

    let budget = max_width - ellipsis_width;
    let suffix_budget = budget / 2;
    let prefix = take_prefix(text, budget - suffix_budget, measure);
    let suffix = take_suffix(text, suffix_budget, measure);
    format!("{prefix}{ELLIPSIS}{suffix}")
}

fn take_prefix(text: &str, budget: usize, measure: WidthMeasure) -> &str {
    let mut used = 0;
    for (i, ch) in text.char_indices() {
        let width = measure.char_width(ch);
        if used + width > budget {
            return &text[..i];
        }
        used += width;
    }
    text
}

fn take_suffix(text: &str, budget: usize, measure: WidthMeasure) -> &str {
    let mut used = 0;
    for (i, ch) in text.char_indices().rev() {
        let width = measure.char_width(ch);
        if used + width > budget {
            return &text[i + ch.len_utf8()..];
        }
        used += width;
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "/home/user/projects/sheets/Sub1/report_2024.xlsx";

    #[test]
    fn test_fitting_path_is_unchanged() {
        assert_eq!(shorten(LONG, 100, WidthMeasure::Chars), LONG);
        assert_eq!(shorten(LONG, LONG.len(), WidthMeasure::Chars), LONG);
    }

    #[test]
    fn test_keeps_first_and_trailing_segments() {
        assert_eq!(
            shorten(LONG, 30, WidthMeasure::Chars),
            "/home/.../report_2024.xlsx"
        );
        assert_eq!(
            shorten(LONG, 31, WidthMeasure::Chars),
            "/home/.../Sub1/report_2024.xlsx"
        );
    }

    #[test]
    fn test_adds_leading_segments_when_room_remains() {
        let path = "/a/bb/cccccccccccccccccccc/ddddddddddddddddddddddddd/e.xlsx";
        // The next trailing segment is too long, the next leading one is not
        assert_eq!(shorten(path, 24, WidthMeasure::Chars), "/a/bb/.../e.xlsx");
    }

    #[test]
    fn test_windows_separators() {
        let path = r"C:\Users\ana\Documents\Excels\Sub1\report.xlsx";
        assert_eq!(
            shorten(path, 25, WidthMeasure::Chars),
            r"C:\...\Sub1\report.xlsx"
        );
    }

    #[test]
    fn test_falls_back_to_middle_cut() {
        let path = "/averyveryverylongdirectoryname/anotherlongname.xlsx";
        let short = shorten(path, 20, WidthMeasure::Chars);
        assert_eq!(short, "/averyver...ame.xlsx");
        assert_eq!(short.chars().count(), 20);
    }

    #[test]
    fn test_tiny_budgets() {
        assert_eq!(shorten(LONG, 0, WidthMeasure::Chars), "");
        assert_eq!(shorten(LONG, 2, WidthMeasure::Chars), "/h");
        assert_eq!(shorten(LONG, 4, WidthMeasure::Chars), "/...");
    }

    #[test]
    fn test_display_columns_for_wide_characters() {
        let path = "/データ/報告書/2024/東京支社/売上報告.xlsx";
        let columns = shorten(path, 26, WidthMeasure::Columns);
        assert!(WidthMeasure::Columns.width(&columns) <= 26);
        assert!(columns.contains(ELLIPSIS));

        // The same budget counted in chars fits the whole path
        assert_eq!(shorten(path, 40, WidthMeasure::Chars), path);
    }

    #[test]
    fn test_shorten_path() {
        let path = Path::new(LONG);
        assert_eq!(
            shorten_path(path, 30, WidthMeasure::Columns),
            "/home/.../report_2024.xlsx"
        );
    }
}
