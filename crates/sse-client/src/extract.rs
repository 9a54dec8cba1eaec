//! Best-effort keyword extraction from document text.
//!
//! Has no security role; any extractor works as long as the same keywords
//! are later typed at search time.

pub trait KeywordExtractor {
    fn extract(&self, text: &str) -> Vec<String>;
}

/// Splits on every character that is not an ASCII letter, ASCII digit, or
/// CJK unified ideograph, and keeps parts of at least `min_len` characters.
#[derive(Debug, Clone)]
pub struct SimpleExtractor {
    pub min_len: usize,
}

impl Default for SimpleExtractor {
    fn default() -> Self {
        Self { min_len: 2 }
    }
}

impl KeywordExtractor for SimpleExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !is_word_char(c))
            .filter(|part| part.chars().count() >= self.min_len)
            .map(str::to_string)
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('\u{4e00}'..='\u{9fff}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_punctuation_and_whitespace() {
        let words = SimpleExtractor::default().extract("Hello, world! crypto-privacy\tv2");
        assert_eq!(words, vec!["Hello", "world", "crypto", "privacy", "v2"]);
    }

    #[test]
    fn test_drops_short_parts() {
        let words = SimpleExtractor::default().extract("a bb c ddd");
        assert_eq!(words, vec!["bb", "ddd"]);

        let words = SimpleExtractor { min_len: 3 }.extract("a bb c ddd");
        assert_eq!(words, vec!["ddd"]);
    }

    #[test]
    fn test_keeps_cjk_runs() {
        let words = SimpleExtractor::default().extract("隐私保护，加密 search");
        assert_eq!(words, vec!["隐私保护", "加密", "search"]);
    }

    #[test]
    fn test_other_scripts_are_separators() {
        // Only ASCII alphanumerics and CJK ideographs form words
        let words = SimpleExtractor::default().extract("café naïve");
        assert_eq!(words, vec!["caf", "na", "ve"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(SimpleExtractor::default().extract("").is_empty());
        assert!(SimpleExtractor::default().extract("  ,,; ").is_empty());
    }
}
