/// Case-insensitive literal matching of cell text.
///
/// The needle is lowercased once when the matcher is built; every cell is
/// lowercased as it is checked. Lowercasing is Unicode-aware, so `BRITAIN`
/// matches `Great Britain` and `ÉTÉ` matches `été`.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Creates a new TextMatcher for the given search text
    pub fn new(search_text: &str) -> Self {
        Self {
            needle: search_text.to_lowercase(),
        }
    }

    /// True if `text` contains the search text, ignoring case
    pub fn is_match(&self, text: &str) -> bool {
        if text.is_empty() {
            return self.needle.is_empty();
        }
        text.to_lowercase().contains(&self.needle)
    }

    /// True if any of the cells matches
    pub fn any_match<'a, I>(&self, cells: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        cells.into_iter().any(|cell| self.is_match(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_substring() {
        let matcher = TextMatcher::new("britain");
        assert!(matcher.is_match("Great Britain"));
        assert!(matcher.is_match("GREAT BRITAIN"));
        assert!(matcher.is_match("britain"));
        assert!(!matcher.is_match("Brit ain"));
        assert!(!matcher.is_match(""));
    }

    #[test]
    fn test_unicode_folding() {
        let matcher = TextMatcher::new("ÉTÉ");
        assert!(matcher.is_match("un été chaud"));
        let matcher = TextMatcher::new("müller");
        assert!(matcher.is_match("Hans MÜLLER"));
    }

    #[test]
    fn test_literal_not_pattern() {
        let matcher = TextMatcher::new("a.c");
        assert!(matcher.is_match("xa.cx"));
        assert!(!matcher.is_match("abc"));
    }

    #[test]
    fn test_any_match() {
        let matcher = TextMatcher::new("oslo");
        assert!(matcher.any_match(["", "Norway", "Oslo"]));
        assert!(!matcher.any_match(["", "Sweden", "Stockholm"]));
        assert!(!matcher.any_match(Vec::<&str>::new()));
    }
}
