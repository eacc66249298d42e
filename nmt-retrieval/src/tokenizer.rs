//! Query/content tokenization for keyword scoring. A CJK-detection
//! predicate toggles the tokenization strategy: whitespace/punctuation
//! splitting works for space-delimited scripts, but CJK text has no word
//! boundaries, so it falls back to per-character tokens.

use regex::Regex;
use std::sync::OnceLock;

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "of", "to", "in", "on",
    "at", "for", "with", "by", "and", "or", "but", "if", "then", "this", "that", "it", "as",
    "from", "into", "do", "does", "did", "not", "no",
];

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+").unwrap())
}

/// True if any character falls in a CJK Unicode block (Han, Hiragana,
/// Katakana, or Hangul).
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| {
        let cp = c as u32;
        (0x4E00..=0x9FFF).contains(&cp)   // CJK Unified Ideographs
            || (0x3040..=0x30FF).contains(&cp) // Hiragana + Katakana
            || (0xAC00..=0xD7A3).contains(&cp) // Hangul syllables
    })
}

/// Lowercased, stop-word-filtered tokens. CJK text is split into
/// individual characters; everything else is split on word boundaries.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    if contains_cjk(&lower) {
        return lower
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_ascii_punctuation())
            .map(|c| c.to_string())
            .collect();
    }
    word_regex()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|tok| !STOPWORDS.contains(&tok.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_is_lowercased_and_stopwords_removed() {
        let tokens = tokenize("The Quick Brown Fox is fast");
        assert_eq!(tokens, vec!["quick", "brown", "fox", "fast"]);
    }

    #[test]
    fn cjk_text_is_detected() {
        assert!(contains_cjk("数据库优化"));
        assert!(!contains_cjk("database optimization"));
    }

    #[test]
    fn cjk_text_tokenizes_per_character() {
        let tokens = tokenize("数据库");
        assert_eq!(tokens, vec!["数", "据", "库"]);
    }
}
