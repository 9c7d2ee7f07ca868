//! Section Detector: partitions a document's normalized lines into titled sections.
//!
//! Heading detection is an ordered rule table (`HEADING_RULES`). Each rule is an
//! independent predicate over a line and its neighbours, contributing a weight.
//! The shape rule is a gate: a line that does not look like a heading is never one.
//! A line whose summed weight reaches `HEADING_THRESHOLD` opens a new section.
//!
//! Generic headers ("Introduction", "Overview", ...) still open a section, but the
//! title is replaced by a phrase synthesized from the body whenever one exists.
//! Text before the first heading lands in an implicit section titled the same way.

use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::normalizer::NormalizedPage;
use crate::analysis::text::{
    count_term, is_capitalized, is_stop_word, normalize_for_matching, title_case, words,
    words_with_sentence_start,
};
use crate::models::document::{QualityMetrics, Section, SectionType, TitleSource};

pub const MAX_HEADING_CHARS: usize = 90;
pub const MAX_HEADING_WORDS: usize = 12;
const HEADING_THRESHOLD: f32 = 0.6;
const MAX_TITLE_CHARS: usize = 80;
/// Words of the body inspected when synthesizing a title.
const TITLE_SCAN_WORDS: usize = 60;
/// Body characters inspected when inferring a section type from content.
const TYPE_SCAN_CHARS: usize = 2_000;
/// On a page without headings, a section shorter than this absorbs the next paragraph.
const MIN_PARAGRAPH_CHARS: usize = 50;

/// Ultra-common headers that never stand as a title when the body offers something better.
pub const GENERIC_HEADERS: &[&str] = &[
    "about",
    "abstract",
    "acknowledgements",
    "acknowledgments",
    "background",
    "bibliography",
    "conclusion",
    "conclusions",
    "contents",
    "foreword",
    "index",
    "introduction",
    "overview",
    "preface",
    "references",
    "summary",
    "table of contents",
];

/// Connectors allowed inside a run of capitalized words ("Bay of Angels", "Aix de Provence").
const NAME_CONNECTORS: &[&str] = &["of", "de", "du", "la", "le", "des", "en"];

/// Technical-looking vocabulary counted towards technical-term density.
const TECHNICAL_TERMS: &[&str] = &[
    "analysis", "benchmark", "data", "dataset", "evaluation", "experiment", "framework",
    "hypothesis", "metric", "method", "methodology", "model", "parameter", "protocol",
    "research", "result", "statistic", "study", "specification", "system",
];

static STRUCTURAL_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:chapter|section|part|step|day|appendix)\s+[0-9ivxlc]+\b[.:)]?|\d{1,2}(?:\.\d{1,2})*[.)]?\s|[ivx]{1,4}[.)]\s|#{1,6}\s|[•*\-]\s)",
    )
    .expect("structural prefix pattern is valid")
});

static KNOWN_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^(?:comprehensive |ultimate |complete )?guide to\b|\btips and tricks\b|^top\s+\d+\b|^best\s+\w+|\band entertainment\b|^(?:where|how|what) to\b|\b(?:activities|experiences|adventures|attractions|itinerary|highlights|essentials)$)",
    )
    .expect("known heading pattern is valid")
});

static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[•*\-]\s|\d{1,2}[.)]\s)").expect("list item pattern is valid")
});

// ────────────────────────────────────────────────────────────────────────────
// Heading rule table
// ────────────────────────────────────────────────────────────────────────────

/// A line with its neighbours on the same page.
/// `prev == None` means the line opens the page; `Some("")` is a paragraph break.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub line: &'a str,
    pub prev: Option<&'a str>,
    pub next: Option<&'a str>,
}

/// One heading heuristic. Rules are evaluated in table order.
pub struct HeadingRule {
    pub name: &'static str,
    pub weight: f32,
    /// A required rule that fails rejects the line outright.
    pub required: bool,
    pub test: fn(&LineContext<'_>) -> bool,
}

pub const HEADING_RULES: &[HeadingRule] = &[
    HeadingRule {
        name: "heading_shape",
        weight: 0.5,
        required: true,
        test: has_heading_shape,
    },
    HeadingRule {
        name: "blank_line_gap",
        weight: 0.2,
        required: false,
        test: has_blank_line_gap,
    },
    HeadingRule {
        name: "structural_prefix",
        weight: 0.2,
        required: false,
        test: has_structural_prefix,
    },
    HeadingRule {
        name: "known_heading_phrase",
        weight: 0.3,
        required: false,
        test: matches_known_heading_phrase,
    },
    HeadingRule {
        name: "emphatic_case",
        weight: 0.15,
        required: false,
        test: is_emphatic_case,
    },
    HeadingRule {
        name: "followed_by_body",
        weight: 0.1,
        required: false,
        test: is_followed_by_body,
    },
    HeadingRule {
        name: "continues_sentence",
        weight: -0.3,
        required: false,
        test: continues_previous_sentence,
    },
];

/// Sums the weights of matching rules. `None` when a required rule fails.
pub fn heading_score(ctx: &LineContext<'_>) -> Option<f32> {
    let mut score = 0.0_f32;
    for rule in HEADING_RULES {
        let hit = (rule.test)(ctx);
        if rule.required && !hit {
            tracing::trace!(line = ctx.line, rule = rule.name, "Heading rule rejected line");
            return None;
        }
        if hit {
            score += rule.weight;
        }
    }
    Some(score)
}

pub fn is_heading(ctx: &LineContext<'_>) -> bool {
    heading_score(ctx).is_some_and(|score| score >= HEADING_THRESHOLD)
}

fn has_heading_shape(ctx: &LineContext<'_>) -> bool {
    let line = ctx.line;
    if line.chars().count() > MAX_HEADING_CHARS {
        return false;
    }
    if line.ends_with(['.', ',', ';', '!', '?']) {
        return false;
    }
    let core = strip_structural_prefix(line);
    let tokens: Vec<&str> = words(core).collect();
    if tokens.is_empty() || tokens.len() > MAX_HEADING_WORDS {
        return false;
    }
    if core.chars().filter(|c| c.is_alphabetic()).count() < 3 {
        return false;
    }
    let starts_well = core
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit());
    if !starts_well {
        return false;
    }
    if is_all_caps(core) {
        return true;
    }
    let significant: Vec<&&str> = tokens
        .iter()
        .filter(|w| !is_stop_word(&w.to_lowercase()) && w.chars().any(char::is_alphabetic))
        .collect();
    if significant.is_empty() {
        return false;
    }
    let capitalized = significant.iter().filter(|w| is_capitalized(w)).count();
    capitalized as f32 / significant.len() as f32 >= 0.6
}

fn has_blank_line_gap(ctx: &LineContext<'_>) -> bool {
    matches!(ctx.prev, None | Some("")) || ctx.next == Some("")
}

fn has_structural_prefix(ctx: &LineContext<'_>) -> bool {
    STRUCTURAL_PREFIX_RE.is_match(ctx.line)
}

fn matches_known_heading_phrase(ctx: &LineContext<'_>) -> bool {
    KNOWN_HEADING_RE.is_match(strip_structural_prefix(ctx.line).trim_end_matches(':'))
}

fn is_emphatic_case(ctx: &LineContext<'_>) -> bool {
    let core = strip_structural_prefix(ctx.line);
    core.chars().filter(|c| c.is_alphabetic()).count() >= 4 && is_all_caps(core)
}

fn is_followed_by_body(ctx: &LineContext<'_>) -> bool {
    ctx.next.is_some_and(|next| {
        !next.is_empty() && (next.ends_with(['.', '!', '?']) || words(next).count() >= 8)
    })
}

fn continues_previous_sentence(ctx: &LineContext<'_>) -> bool {
    ctx.prev.is_some_and(|prev| {
        !prev.is_empty()
            && !prev.ends_with(['.', '!', '?', ':'])
            && words(prev).count() >= 8
    })
}

fn is_all_caps(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

fn strip_structural_prefix(line: &str) -> &str {
    match STRUCTURAL_PREFIX_RE.find(line) {
        Some(m) if m.end() < line.len() => line[m.end()..].trim_start(),
        _ => line,
    }
}

/// Removes list markers and a trailing colon; numbering is kept.
fn clean_heading(line: &str) -> String {
    let trimmed = line
        .trim_start_matches(['•', '*', '#'])
        .trim_start_matches("- ")
        .trim()
        .trim_end_matches(':')
        .trim();
    truncate_title(trimmed)
}

// ────────────────────────────────────────────────────────────────────────────
// Generic headers and title synthesis
// ────────────────────────────────────────────────────────────────────────────

/// True for bare generic headers, ignoring numbering ("1. Introduction").
pub fn is_generic_header(title: &str) -> bool {
    let normalized = normalize_for_matching(strip_structural_prefix(title));
    let stripped = normalized
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == ' ')
        .trim();
    GENERIC_HEADERS.binary_search(&stripped).is_ok()
}

/// Synthesizes a title from the first distinctive phrase of a section body.
///
/// Preference: a run of capitalized words (a proper noun phrase), then a run of
/// content words from the opening sentence, then the opening words themselves.
/// Returns `None` when every candidate is empty or generic.
pub fn synthesize_title(body: &str) -> Option<String> {
    let scanned: Vec<(&str, bool)> = words_with_sentence_start(body)
        .take(TITLE_SCAN_WORDS)
        .collect();

    [
        proper_noun_phrase(&scanned),
        content_phrase(&scanned),
        opening_words(&scanned),
    ]
    .into_iter()
    .flatten()
    .map(|candidate| truncate_title(&candidate))
    .find(|candidate| !candidate.is_empty() && !is_generic_header(candidate))
}

fn proper_noun_phrase(scanned: &[(&str, bool)]) -> Option<String> {
    let mut runs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut single_mid_sentence: Option<&str> = None;

    for (idx, &(word, sentence_start)) in scanned.iter().enumerate() {
        let lower = word.to_lowercase();
        let is_name_word = is_capitalized(word)
            && !is_stop_word(&lower)
            && word.chars().any(char::is_alphabetic);
        let is_connector = !current.is_empty()
            && NAME_CONNECTORS.contains(&lower.as_str())
            && scanned
                .get(idx + 1)
                .is_some_and(|(next, starts)| !starts && is_capitalized(next));

        if (is_name_word && (current.is_empty() || !sentence_start)) || is_connector {
            if current.is_empty() && !sentence_start && single_mid_sentence.is_none() {
                single_mid_sentence = Some(word);
            }
            current.push(word);
        } else {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            if is_name_word {
                current.push(word);
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs.into_iter()
        .find(|run| run.len() >= 2 && !is_generic_header(&run.join(" ")))
        .map(|run| run.into_iter().take(6).collect::<Vec<_>>().join(" "))
        .or_else(|| {
            single_mid_sentence
                .filter(|w| w.chars().count() >= 4)
                .map(str::to_string)
        })
}

fn content_phrase(scanned: &[(&str, bool)]) -> Option<String> {
    let mut run: Vec<&str> = Vec::new();
    for (idx, &(word, sentence_start)) in scanned.iter().enumerate() {
        // Only the opening sentence is considered.
        if sentence_start && idx > 0 {
            break;
        }
        let lower = word.to_lowercase();
        let is_content = word.chars().count() >= 3
            && word.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'')
            && !is_stop_word(&lower);
        if is_content {
            run.push(word);
            if run.len() == 4 {
                break;
            }
        } else if run.len() >= 2 {
            break;
        } else {
            run.clear();
        }
    }
    (run.len() >= 2).then(|| title_case(run))
}

fn opening_words(scanned: &[(&str, bool)]) -> Option<String> {
    let opening: Vec<&str> = scanned.iter().take(6).map(|(w, _)| *w).collect();
    (!opening.is_empty()).then(|| title_case(opening))
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_CHARS {
        return title.to_string();
    }
    let mut out = String::new();
    for word in title.split_whitespace() {
        if out.chars().count() + word.chars().count() + 1 > MAX_TITLE_CHARS {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Section type inference
// ────────────────────────────────────────────────────────────────────────────

/// Section types and the terms that signal them, in priority order.
pub const SECTION_TYPE_RULES: &[(SectionType, &[&str])] = &[
    (SectionType::Summary, &["summary", "abstract", "overview", "highlights", "key takeaways"]),
    (SectionType::Introduction, &["introduction", "background", "preface"]),
    (SectionType::Methodology, &["method", "methodology", "approach", "technique", "experimental setup"]),
    (SectionType::Results, &["result", "finding", "outcome", "evaluation"]),
    (SectionType::Analysis, &["analysis", "discussion", "insight", "comparison"]),
    (SectionType::Conclusion, &["conclusion", "future work", "final thoughts"]),
    (SectionType::Financial, &["financial", "revenue", "profit", "earnings", "cash flow", "balance sheet"]),
    (SectionType::Itinerary, &["itinerary", "day trip", "schedule", "getaway", "travel plan", "days in"]),
    (SectionType::Accommodation, &["hotel", "accommodation", "resort", "hostel", "lodging", "where to stay"]),
    (SectionType::Recipe, &["recipe", "ingredients", "vegetarian", "vegan", "gluten", "dinner", "lunch", "breakfast", "buffet"]),
    (SectionType::Dining, &["restaurant", "dining", "cuisine", "culinary", "food", "dish", "wine", "cafe"]),
    (SectionType::Activities, &["activity", "activities", "things to do", "adventure", "nightlife", "entertainment", "beach", "outdoor", "excursion", "tour"]),
    (SectionType::Culture, &["culture", "cultural", "history", "historical", "heritage", "museum", "tradition", "landmark", "festival"]),
    (SectionType::Tips, &["tips", "tricks", "packing", "advice", "essentials", "budget", "safety", "etiquette"]),
    (SectionType::Transportation, &["transport", "transportation", "getting around", "train", "bus", "airport", "car rental", "ferry"]),
    (SectionType::Procedure, &["how to", "step", "instructions", "create", "convert", "fill", "sign", "export", "form"]),
];

/// Infers the section type from the title, falling back to body evidence (≥ 2 hits).
pub fn infer_section_type(title: &str, body: &str) -> SectionType {
    let title_norm = normalize_for_matching(title);
    for (section_type, terms) in SECTION_TYPE_RULES {
        if terms.iter().any(|term| count_term(&title_norm, term) > 0) {
            return *section_type;
        }
    }

    let head: String = body.chars().take(TYPE_SCAN_CHARS).collect();
    let body_norm = normalize_for_matching(&head);
    let mut best = (SectionType::General, 1usize);
    for (section_type, terms) in SECTION_TYPE_RULES {
        let hits: usize = terms.iter().map(|term| count_term(&body_norm, term)).sum();
        if hits > best.1 {
            best = (*section_type, hits);
        }
    }
    best.0
}

// ────────────────────────────────────────────────────────────────────────────
// Quality metrics
// ────────────────────────────────────────────────────────────────────────────

/// Computes content-quality signals over the body lines of a section.
pub fn compute_quality_metrics(lines: &[String]) -> QualityMetrics {
    let mut word_count = 0usize;
    let mut technical = 0usize;
    let mut has_proper_nouns = false;
    let mut char_count = 0usize;

    for line in lines {
        char_count += line.chars().count();
        for (word, sentence_start) in words_with_sentence_start(line) {
            word_count += 1;
            let lower = word.to_lowercase();
            if is_technical_token(word, &lower) {
                technical += 1;
            }
            if !sentence_start && is_capitalized(word) && !is_stop_word(&lower) {
                has_proper_nouns = true;
            }
        }
    }

    QualityMetrics {
        word_count,
        char_count,
        technical_density: if word_count == 0 {
            0.0
        } else {
            (technical as f64 / word_count as f64).clamp(0.0, 1.0)
        },
        has_list_markers: lines.iter().any(|l| LIST_ITEM_RE.is_match(l)),
        has_numbers: lines.iter().any(|l| l.chars().any(|c| c.is_ascii_digit())),
        has_proper_nouns,
    }
}

fn is_technical_token(word: &str, lower: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
        || word.chars().count() >= 11
        || (word.chars().count() >= 2 && word.chars().all(|c| c.is_ascii_uppercase()))
        || TECHNICAL_TERMS
            .iter()
            .any(|term| lower == *term || lower.strip_suffix('s') == Some(*term))
}

// ────────────────────────────────────────────────────────────────────────────
// Detection
// ────────────────────────────────────────────────────────────────────────────

struct SectionBuilder {
    page_number: u32,
    /// `None` for the implicit section that precedes the first heading.
    heading: Option<String>,
    lines: Vec<String>,
}

impl SectionBuilder {
    fn finish(self, document_id: &str, document_index: usize, ordinal: usize) -> Section {
        let body = self.lines.join("\n");
        let (title, title_source) = resolve_title(self.heading, &body, document_id);
        let section_type = infer_section_type(&title, &body);
        let metrics = compute_quality_metrics(&self.lines);
        Section {
            document_id: document_id.to_string(),
            document_index,
            ordinal,
            page_number: self.page_number,
            title,
            title_source,
            section_type,
            body,
            metrics,
        }
    }
}

fn resolve_title(heading: Option<String>, body: &str, document_id: &str) -> (String, TitleSource) {
    match heading {
        Some(title) if !is_generic_header(&title) => (title, TitleSource::Heading),
        Some(generic) => match synthesize_title(body) {
            Some(title) => (title, TitleSource::Synthesized),
            None => (generic, TitleSource::GenericFallback),
        },
        None => {
            let title = synthesize_title(body).unwrap_or_else(|| title_from_document_id(document_id));
            (title, TitleSource::Synthesized)
        }
    }
}

fn title_from_document_id(document_id: &str) -> String {
    let stem = document_id
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(document_id);
    let stem = stem.strip_suffix(".pdf").unwrap_or(stem);
    let title = title_case(words(stem));
    if title.is_empty() {
        stem.to_string()
    } else {
        title
    }
}

/// Splits a document into sections. Page numbers are preserved; a section that
/// spans a page break keeps the page on which it started. Pages with no
/// heading at all are split at paragraph breaks instead.
///
/// A document with at least one line of text always yields at least one section.
pub fn detect_sections(
    document_id: &str,
    document_index: usize,
    pages: &[NormalizedPage],
) -> Vec<Section> {
    let mut builders: Vec<SectionBuilder> = Vec::new();

    for page in pages.iter().filter(|page| !page.is_empty()) {
        let headings: Vec<bool> = page
            .lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                !line.is_empty()
                    && is_heading(&LineContext {
                        line: line.as_str(),
                        prev: idx.checked_sub(1).map(|i| page.lines[i].as_str()),
                        next: page.lines.get(idx + 1).map(String::as_str),
                    })
            })
            .collect();

        if !headings.contains(&true) {
            split_paragraphs(&mut builders, page);
            continue;
        }

        for (line, &heading) in page.lines.iter().zip(&headings) {
            if line.is_empty() {
                continue;
            }
            if heading {
                open_heading(&mut builders, clean_heading(line), page.number);
                continue;
            }

            match builders.last_mut() {
                Some(open) => open.lines.push(line.clone()),
                None => builders.push(SectionBuilder {
                    page_number: page.number,
                    heading: None,
                    lines: vec![line.clone()],
                }),
            }
        }
    }

    // Headings with no body carry nothing to rank, unless they are all there is.
    if builders.iter().all(|b| b.lines.is_empty()) {
        if let Some(mut only) = builders.into_iter().next() {
            if let Some(heading) = only.heading.clone() {
                only.lines.push(heading);
            }
            return vec![only.finish(document_id, document_index, 0)];
        }
        return Vec::new();
    }

    builders
        .into_iter()
        .filter(|b| !b.lines.is_empty())
        .enumerate()
        .map(|(ordinal, b)| b.finish(document_id, document_index, ordinal))
        .collect()
}

/// Pages without any heading are split at paragraph breaks. The first
/// paragraph continues a headed section left open by an earlier page; a
/// paragraph following a short section on the same page joins it.
fn split_paragraphs(builders: &mut Vec<SectionBuilder>, page: &NormalizedPage) {
    let mut opened_here = false;
    let paragraphs = page
        .lines
        .split(|line| line.is_empty())
        .filter(|paragraph| !paragraph.is_empty());

    for (idx, paragraph) in paragraphs.enumerate() {
        let attach = match builders.last() {
            Some(open) if opened_here => text_len(&open.lines) < MIN_PARAGRAPH_CHARS,
            Some(open) => idx == 0 && open.heading.is_some(),
            None => false,
        };

        if let Some(open) = builders.last_mut().filter(|_| attach) {
            open.lines.extend(paragraph.iter().cloned());
            continue;
        }
        builders.push(SectionBuilder {
            page_number: page.number,
            heading: None,
            lines: paragraph.to_vec(),
        });
        opened_here = true;
    }
}

fn text_len(lines: &[String]) -> usize {
    lines.iter().map(|line| line.chars().count()).sum()
}

/// Opens a section for `heading`. Consecutive headings collapse into one: the
/// later heading wins unless it is generic and the earlier one is not.
fn open_heading(builders: &mut Vec<SectionBuilder>, heading: String, page_number: u32) {
    if let Some(open) = builders.last_mut() {
        if open.lines.is_empty() {
            let keep_open = is_generic_header(&heading)
                && open.heading.as_deref().is_some_and(|h| !is_generic_header(h));
            if !keep_open {
                open.heading = Some(heading);
                open.page_number = page_number;
            }
            return;
        }
    }
    builders.push(SectionBuilder {
        page_number,
        heading: Some(heading),
        lines: Vec::new(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::normalize_page_text;

    fn page(number: u32, text: &str) -> NormalizedPage {
        NormalizedPage {
            number,
            lines: normalize_page_text(text),
        }
    }

    fn ctx<'a>(line: &'a str, prev: Option<&'a str>, next: Option<&'a str>) -> LineContext<'a> {
        LineContext { line, prev, next }
    }

    #[test]
    fn test_generic_headers_sorted_for_binary_search() {
        let mut sorted = GENERIC_HEADERS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, GENERIC_HEADERS);
    }

    #[test]
    fn test_heading_shape_gate_rejects_sentences() {
        let c = ctx("The coast offers many beaches.", None, None);
        assert!(heading_score(&c).is_none(), "terminal punctuation fails the shape gate");
        let c = ctx("lowercase start line", None, None);
        assert!(heading_score(&c).is_none());
    }

    #[test]
    fn test_title_case_line_after_blank_is_heading() {
        let c = ctx(
            "Coastal Adventures",
            Some(""),
            Some("The coastline is dotted with sandy coves and clear water."),
        );
        assert!(is_heading(&c));
    }

    #[test]
    fn test_all_caps_line_is_heading() {
        let c = ctx("NIGHTLIFE AND ENTERTAINMENT", Some("Previous body text ends here."), None);
        assert!(is_heading(&c));
    }

    #[test]
    fn test_numbered_prefix_boosts_heading() {
        let c = ctx("2.1 Data Collection", Some("Earlier text."), Some("x"));
        let score = heading_score(&c).unwrap();
        assert!(score >= HEADING_THRESHOLD, "score was {score}");
    }

    #[test]
    fn test_wrapped_paragraph_fragment_is_not_heading() {
        let c = ctx(
            "Old Town Markets",
            Some("Visitors who arrive early in the morning can wander through the"),
            Some("stalls before the crowds arrive."),
        );
        assert!(!is_heading(&c), "mid-paragraph fragment must not open a section");
    }

    #[test]
    fn test_known_phrase_heading_without_gap() {
        let c = ctx(
            "Comprehensive Guide to Major Cities in the South of France",
            Some("Short line"),
            Some("x"),
        );
        assert!(is_heading(&c));
    }

    #[test]
    fn test_is_generic_header_ignores_numbering_and_case() {
        assert!(is_generic_header("Introduction"));
        assert!(is_generic_header("1. INTRODUCTION"));
        assert!(is_generic_header("Table of Contents"));
        assert!(!is_generic_header("Introduction to Provençal Cuisine"));
    }

    #[test]
    fn test_synthesize_title_prefers_proper_noun_phrase() {
        let title = synthesize_title("The Calanques National Park offers dramatic limestone cliffs.");
        assert_eq!(title.as_deref(), Some("Calanques National Park"));
    }

    #[test]
    fn test_synthesize_title_uses_mid_sentence_name() {
        let title = synthesize_title("Beaches around Nice are pebbly but popular.");
        assert_eq!(title.as_deref(), Some("Nice"));
    }

    #[test]
    fn test_synthesize_title_falls_back_to_content_words() {
        let title = synthesize_title("explore coastal hiking trails along the shore.");
        assert_eq!(title.as_deref(), Some("Explore Coastal Hiking Trails"));
    }

    #[test]
    fn test_synthesize_title_never_returns_generic() {
        assert_eq!(synthesize_title("Overview"), None);
        assert_eq!(synthesize_title(""), None);
    }

    #[test]
    fn test_generic_only_heading_gets_synthesized_title() {
        let pages = vec![page(
            1,
            "Introduction\n\nThe Calanques National Park offers dramatic limestone cliffs and hidden coves.",
        )];
        let sections = detect_sections("france.pdf", 0, &pages);
        assert_eq!(sections.len(), 1);
        assert_ne!(sections[0].title, "Introduction");
        assert_eq!(sections[0].title, "Calanques National Park");
        assert_eq!(sections[0].title_source, TitleSource::Synthesized);
    }

    #[test]
    fn test_generic_heading_kept_when_body_offers_nothing_better() {
        let pages = vec![page(1, "Introduction\n\noverview.")];
        let sections = detect_sections("doc.pdf", 0, &pages);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Introduction");
        assert_eq!(sections[0].title_source, TitleSource::GenericFallback);
    }

    #[test]
    fn test_headings_split_sections_in_order() {
        let pages = vec![page(
            1,
            "Coastal Adventures\n\nThe coastline offers sandy coves and clear water for swimming.\n\nNightlife and Entertainment\n\nBars in the old port stay open late into the night.",
        )];
        let sections = detect_sections("things.pdf", 2, &pages);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Coastal Adventures");
        assert_eq!(sections[1].title, "Nightlife and Entertainment");
        assert_eq!(sections[0].ordinal, 0);
        assert_eq!(sections[1].ordinal, 1);
        assert!(sections.iter().all(|s| s.document_index == 2));
        assert!(sections[1].body.contains("old port"));
    }

    #[test]
    fn test_text_before_first_heading_opens_implicit_section() {
        let pages = vec![page(
            1,
            "Marseille is the oldest city in France and a busy port.\n\nCulinary Experiences\n\nBouillabaisse is the signature fish stew of the city.",
        )];
        let sections = detect_sections("cities.pdf", 0, &pages);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title_source, TitleSource::Synthesized);
        assert!(!sections[0].title.is_empty());
        assert_eq!(sections[1].title, "Culinary Experiences");
    }

    #[test]
    fn test_single_plain_line_document_yields_one_section() {
        let pages = vec![page(1, "just a single line of lowercase text")];
        let sections = detect_sections("notes.pdf", 0, &pages);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].page_number, 1);
        assert!(!sections[0].title.is_empty());
    }

    #[test]
    fn test_heading_only_document_still_yields_a_section() {
        let pages = vec![page(1, "Packing Essentials")];
        let sections = detect_sections("tips.pdf", 0, &pages);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Packing Essentials");
    }

    #[test]
    fn test_empty_document_yields_no_sections() {
        let pages = vec![page(1, ""), page(2, "  \n ")];
        assert!(detect_sections("empty.pdf", 0, &pages).is_empty());
    }

    #[test]
    fn test_section_spanning_pages_keeps_start_page() {
        let pages = vec![
            page(1, "Intro text on the first page sits here.\n\nWine Regions\n\nThe Rhône valley produces bold reds."),
            page(2, "Côtes de Provence is famous for rosé wines served chilled."),
            page(3, "Where to Stay\n\nBoutique hotels line the harbour."),
        ];
        let sections = detect_sections("wine.pdf", 0, &pages);
        let wine = sections.iter().find(|s| s.title == "Wine Regions").unwrap();
        assert_eq!(wine.page_number, 1);
        assert!(wine.body.contains("rosé"));
        let stay = sections.iter().find(|s| s.title == "Where to Stay").unwrap();
        assert_eq!(stay.page_number, 3);
    }

    #[test]
    fn test_pages_without_headings_split_at_paragraphs() {
        let pages = vec![
            page(1, "the harbour wakes early and fishing boats unload their catch on the quay.\n\nmarkets near the water sell olives, cheese and bread to anyone passing by."),
            page(2, "inland the hills turn purple in july when the lavender fields bloom for weeks.\n\nsmall villages perch on the ridges with narrow lanes and shaded squares."),
            page(3, "trains connect the coastal towns every hour and tickets are cheap all year round.\n\nbuses reach the hill villages, though the last one leaves before sunset."),
        ];
        let sections = detect_sections("prose.pdf", 0, &pages);
        let pages_cited: Vec<u32> = sections.iter().map(|s| s.page_number).collect();
        assert_eq!(pages_cited, vec![1, 1, 2, 2, 3, 3]);
        assert!(sections.iter().all(|s| s.title_source == TitleSource::Synthesized && !s.title.is_empty()));
        assert!(sections[3].body.starts_with("small villages"));
        let ordinals: Vec<usize> = sections.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_short_paragraph_joins_following_text_on_headingless_page() {
        let pages = vec![page(
            1,
            "see below.\n\nthe old town is best explored on foot early in the morning before the crowds.",
        )];
        let sections = detect_sections("notes.pdf", 0, &pages);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].body.contains("old town"));
    }

    #[test]
    fn test_consecutive_headings_collapse_to_specific_title() {
        let pages = vec![page(
            1,
            "Chapter 3\n\nCoastal Adventures\n\nIntroduction\n\nKayaking along the cliffs is the highlight of any visit.",
        )];
        let sections = detect_sections("guide.pdf", 0, &pages);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Coastal Adventures");
    }

    #[test]
    fn test_bullet_markers_stripped_from_titles() {
        assert_eq!(clean_heading("• Beach Hopping:"), "Beach Hopping");
        assert_eq!(clean_heading("1. Getting There"), "1. Getting There");
    }

    #[test]
    fn test_infer_section_type_from_title() {
        assert_eq!(infer_section_type("Research Methodology", ""), SectionType::Methodology);
        assert_eq!(infer_section_type("Nightlife and Entertainment", ""), SectionType::Activities);
        assert_eq!(infer_section_type("Where to Stay in Nice", ""), SectionType::Accommodation);
        assert_eq!(infer_section_type("4-Day Itinerary", ""), SectionType::Itinerary);
    }

    #[test]
    fn test_infer_section_type_from_body_needs_two_hits() {
        assert_eq!(
            infer_section_type("Marseille", "The restaurant scene and the local cuisine are lively."),
            SectionType::Dining
        );
        assert_eq!(
            infer_section_type("Marseille", "One restaurant by the port."),
            SectionType::General
        );
    }

    #[test]
    fn test_quality_metrics_flags_structure() {
        let lines = vec![
            "• Visit the Musée Picasso in Antibes.".to_string(),
            "• Budget about 20 euros for entry and data roaming.".to_string(),
        ];
        let m = compute_quality_metrics(&lines);
        assert!(m.has_list_markers);
        assert!(m.has_numbers);
        assert!(m.has_proper_nouns);
        assert!(m.word_count > 10);
        assert!(m.technical_density > 0.0 && m.technical_density <= 1.0);
    }

    #[test]
    fn test_quality_metrics_empty_lines() {
        let m = compute_quality_metrics(&[]);
        assert_eq!(m.word_count, 0);
        assert_eq!(m.technical_density, 0.0);
        assert!(!m.has_list_markers);
    }

    #[test]
    fn test_title_from_document_id_strips_extension() {
        assert_eq!(title_from_document_id("dir/south_of_france-cities.pdf"), "South of France-cities");
    }
}
