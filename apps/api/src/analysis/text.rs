//! Shared text primitives: word tokenization, stop words, and boundary-aware term matching.
//!
//! Every matcher here expects a lowercase haystack and a lowercase term.

use std::sync::LazyLock;

use regex::Regex;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’-][\p{L}\p{N}]+)*").expect("word pattern is valid")
});

/// Fixed English stop-word set, shared by keyword extraction and title synthesis.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "being", "between", "both", "but", "by", "can", "could", "did", "do",
    "does", "during", "each", "etc", "every", "few", "for", "from", "further", "get", "given",
    "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if",
    "in", "into", "is", "it", "its", "just", "like", "may", "me", "might", "more", "most",
    "much", "must", "my", "need", "needs", "no", "nor", "not", "now", "of", "off", "on", "once",
    "one", "only", "or", "other", "our", "ours", "out", "over", "own", "per", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "upon", "us", "very", "via", "want", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "within", "without", "would", "you", "your",
    "yours",
];

/// Words left lowercase inside a synthesized title.
const MINOR_TITLE_WORDS: &[&str] = &["a", "an", "and", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with"];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Iterates over word tokens (letters/digits, with inner apostrophes or hyphens) in `text`.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    WORD_RE.find_iter(text).map(|m| m.as_str())
}

/// Like [`words`], but flags each word that opens a sentence (or a line).
pub fn words_with_sentence_start(text: &str) -> impl Iterator<Item = (&str, bool)> {
    let mut last_end = 0usize;
    WORD_RE.find_iter(text).map(move |m| {
        let gap = &text[last_end..m.start()];
        let starts = last_end == 0
            || gap.contains(|c: char| matches!(c, '.' | '!' | '?' | ':' | '\n' | '•'));
        last_end = m.end();
        (m.as_str(), starts)
    })
}

/// Lowercases and replaces every non-alphanumeric run with a single space.
pub fn normalize_for_matching(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Counts whole-word occurrences of `term` in `haystack`, tolerating a plural `s`/`es` suffix.
pub fn count_term(haystack: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    haystack
        .match_indices(term)
        .filter(|(start, _)| {
            let before_ok = haystack[..*start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let rest = &haystack[start + term.len()..];
            let after_ok = ["es", "s", ""].iter().any(|suffix| {
                rest.strip_prefix(suffix)
                    .is_some_and(|r| r.chars().next().map_or(true, |c| !c.is_alphanumeric()))
            });
            before_ok && after_ok
        })
        .count()
}

pub fn contains_term(haystack: &str, term: &str) -> bool {
    count_term(haystack, term) > 0
}

/// Title-cases a sequence of words, keeping minor words lowercase after the first.
pub fn title_case<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    words
        .into_iter()
        .enumerate()
        .map(|(idx, word)| {
            let lower = word.to_lowercase();
            if idx > 0 && MINOR_TITLE_WORDS.contains(&lower.as_str()) {
                return lower;
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the first character is uppercase.
pub fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}
