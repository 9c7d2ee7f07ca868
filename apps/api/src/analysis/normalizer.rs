//! Text Normalizer: turns raw extracted page text into analyzable lines.
//!
//! Rules, in order:
//! 1. Unicode NFKC (folds ligatures like "ﬁ" into "fi") and bullet glyph unification
//! 2. Control characters stripped, zero-width and soft-hyphen characters removed
//! 3. Words split across a line break by a hyphen are rejoined
//! 4. Whitespace runs collapsed per line; bare page-number lines dropped
//! 5. Blank-line runs collapse into a single paragraph break (an empty string)
//!
//! Never fails. Non-empty input with any printable character yields at least one line.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::models::document::Document;

static HYPHEN_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{L})-[ \t]*\n[ \t]*(\p{Ll})").expect("hyphen break pattern is valid")
});

static PAGE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:page\s+)?\d{1,4}(?:\s*(?:of|/)\s*\d{1,4})?$")
        .expect("page number pattern is valid")
});

/// Normalized lines of one page. An empty string marks a paragraph break.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPage {
    pub number: u32,
    pub lines: Vec<String>,
}

impl NormalizedPage {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }
}

/// Normalizes every page of a document, preserving page order and numbers.
pub fn normalize_document(document: &Document) -> Vec<NormalizedPage> {
    document
        .pages
        .iter()
        .map(|page| NormalizedPage {
            number: page.number,
            lines: normalize_page_text(&page.text),
        })
        .collect()
}

/// Cleans one page of raw text into lines.
pub fn normalize_page_text(raw: &str) -> Vec<String> {
    let cleaned = clean_characters(raw);
    let joined = HYPHEN_BREAK_RE.replace_all(&cleaned, "${1}${2}");

    let collapsed: Vec<String> = joined.split('\n').map(collapse_whitespace).collect();
    // Page numbers only ever sit at the top or bottom of a page.
    let first = collapsed.iter().position(|l| !l.is_empty());
    let last = collapsed.iter().rposition(|l| !l.is_empty());

    let mut lines: Vec<String> = Vec::new();
    for (idx, line) in collapsed.into_iter().enumerate() {
        let at_edge = Some(idx) == first || Some(idx) == last;
        if line.is_empty() || (at_edge && PAGE_NUMBER_RE.is_match(&line)) {
            // Paragraph break; never two in a row, never leading.
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push(String::new());
            }
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        // Best effort: keep whatever printable text survived, even a lone page number.
        let fallback = collapse_whitespace(&cleaned);
        if !fallback.is_empty() {
            lines.push(fallback);
        }
    }
    lines
}

fn clean_characters(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .nfkc()
        .filter_map(|c| match c {
            '\r' | '\u{000C}' | '\u{2028}' | '\u{2029}' => Some('\n'),
            '\t' => Some(' '),
            '\u{00AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => None,
            '●' | '▪' | '◦' | '‣' | '■' | '►' | '\u{F0B7}' => Some('•'),
            c if c.is_control() && c != '\n' => None,
            c => Some(c),
        })
        .collect()
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
