//! Content Refiner: condenses a ranked section into its most relevant sentences.
//!
//! Sentences are produced lazily by [`Sentences`]. Each one is scored by job-keyword
//! density (weighted) plus a smaller persona-vocabulary bonus. The best sentences
//! are packed greedily into the character budget, then re-emitted in document order
//! so the excerpt reads naturally. Output never ends mid-sentence.

use std::sync::LazyLock;

use regex::{Match, Regex};
use serde::{Deserialize, Serialize};

use crate::analysis::job_keywords::JobKeywords;
use crate::analysis::persona::{PersonaArchetype, PersonaProfile};
use crate::analysis::ranker::RankedSection;
use crate::analysis::relevance::{Factor, ScoredSection};
use crate::analysis::text::{count_term, words};

pub const DEFAULT_REFINED_TEXT_MAX_CHARS: usize = 500;
/// Sentences shorter than this are never picked on keyword score alone.
const MIN_SENTENCE_CHARS: usize = 20;
/// Bonus per persona keyword hit, relative to a job keyword of weight 1.0.
const PERSONA_WORD_BONUS: f64 = 0.5;
/// Minimum factor strength for a factor to be named in an explanation.
const EXPLANATION_MIN_STRENGTH: f64 = 0.25;
const EXPLANATION_KEYWORDS: usize = 3;
pub const FALLBACK_EXPLANATION: &str = "Provides contextual information relevant to the task";

static SENTENCE_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?]+["'”’)\]]*\s+|\n\s*(?:[•*\-–]|\d{1,2}[.)])\s+"#)
        .expect("sentence boundary pattern is valid")
});

static LIST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[•*\-–]|\d{1,2}[.)])\s+").expect("list marker pattern is valid")
});

/// Lowercase tokens that end with a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "approx", "dept", "dr", "e.g", "est", "fig", "ft", "i.e", "inc", "jr", "ltd", "mr", "mrs",
    "ms", "mt", "no", "prof", "sr", "st", "vs",
];

// ────────────────────────────────────────────────────────────────────────────
// Sentence iterator
// ────────────────────────────────────────────────────────────────────────────

/// Lazy sentence splitter over borrowed text. Yields trimmed slices with list
/// markers removed; inner line breaks are left for the caller to collapse.
pub struct Sentences<'a> {
    text: &'a str,
    start: usize,
    cursor: usize,
}

pub fn sentences(text: &str) -> Sentences<'_> {
    Sentences {
        text,
        start: 0,
        cursor: 0,
    }
}

impl<'a> Sentences<'a> {
    fn is_boundary(&self, m: &Match<'a>) -> bool {
        if m.as_str().starts_with('\n') {
            return true;
        }
        let before = &self.text[self.start..m.start()];
        let last_word = before
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or("")
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        let is_initial = last_word.chars().count() == 1 && last_word.chars().all(char::is_alphabetic);
        if is_initial || ABBREVIATIONS.contains(&last_word.as_str()) {
            return false;
        }
        // A lowercase continuation means the period was not a sentence end.
        !self.text[m.end()..].chars().next().is_some_and(char::is_lowercase)
    }
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while self.start < self.text.len() {
            let (end, next_start) = match SENTENCE_BOUNDARY_RE.find_at(self.text, self.cursor) {
                Some(m) => {
                    self.cursor = m.end();
                    if !self.is_boundary(&m) {
                        continue;
                    }
                    // List boundaries end before the newline; punctuation stays with its sentence.
                    let end = if m.as_str().starts_with('\n') { m.start() } else { m.end() };
                    (end, m.end())
                }
                None => (self.text.len(), self.text.len()),
            };

            let raw = self.text[self.start..end].trim();
            self.start = next_start;
            self.cursor = next_start;

            let sentence = match LIST_MARKER_RE.find(raw) {
                Some(marker) => raw[marker.end()..].trim_start(),
                None => raw,
            };
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Refined excerpt of one ranked section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinedSubsection {
    pub document_id: String,
    pub page_number: u32,
    pub importance_rank: u32,
    pub section_title: String,
    pub refined_text: String,
    pub relevance_explanation: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Refinement
// ────────────────────────────────────────────────────────────────────────────

pub fn refine_sections(
    ranked: &[RankedSection],
    profile: &PersonaProfile,
    job: &JobKeywords,
    max_chars: usize,
) -> Vec<RefinedSubsection> {
    ranked
        .iter()
        .map(|r| refine_section(r, profile, job, max_chars))
        .collect()
}

pub fn refine_section(
    ranked: &RankedSection,
    profile: &PersonaProfile,
    job: &JobKeywords,
    max_chars: usize,
) -> RefinedSubsection {
    let section = &ranked.scored.section;
    let mut refined_text = select_sentences(&section.body, profile, job, max_chars);
    if refined_text.is_empty() {
        refined_text = truncate_at_word(&finalize_sentence(&section.title), max_chars);
    }

    RefinedSubsection {
        document_id: section.document_id.clone(),
        page_number: section.page_number,
        importance_rank: ranked.importance_rank,
        section_title: section.title.clone(),
        refined_text,
        relevance_explanation: explain_relevance(&ranked.scored, profile),
    }
}

/// Keyword density of one sentence: Σ(job weight × hits) + bonus × persona hits, per word.
pub fn score_sentence(sentence: &str, profile: &PersonaProfile, job: &JobKeywords) -> f64 {
    let lower = sentence.to_lowercase();
    let word_count = words(&lower).count();
    if word_count == 0 {
        return 0.0;
    }

    let job_hits: f64 = job
        .iter()
        .map(|kw| kw.weighted_score as f64 * count_term(&lower, &kw.keyword) as f64)
        .sum();
    let persona_hits: usize = profile.keywords.iter().map(|kw| count_term(&lower, kw)).sum();

    (job_hits + PERSONA_WORD_BONUS * persona_hits as f64) / word_count as f64
}

struct Candidate {
    index: usize,
    text: String,
    score: f64,
}

/// Picks sentences from `body` within `max_chars`.
///
/// 1. Sentences of at least 20 chars with a positive score, best first, packed greedily
/// 2. Otherwise the leading sentences, in order, until the next one does not fit
/// 3. Otherwise the first sentence cut at a word boundary and closed with a period
pub fn select_sentences(body: &str, profile: &PersonaProfile, job: &JobKeywords, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }

    let all: Vec<Candidate> = sentences(body)
        .enumerate()
        .map(|(index, raw)| {
            let text = finalize_sentence(raw);
            let score = if text.chars().count() >= MIN_SENTENCE_CHARS {
                score_sentence(&text, profile, job)
            } else {
                0.0
            };
            Candidate { index, text, score }
        })
        .collect();

    let mut by_score: Vec<&Candidate> = all.iter().filter(|c| c.score > 0.0).collect();
    by_score.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    let picked = pack(by_score, max_chars, false);
    if !picked.is_empty() {
        return join_in_document_order(picked);
    }

    let lead = pack(all.iter().collect(), max_chars, true);
    if !lead.is_empty() {
        return join_in_document_order(lead);
    }

    all.first()
        .map(|c| truncate_at_word(&c.text, max_chars))
        .unwrap_or_default()
}

/// Greedy packing; `contiguous` stops at the first sentence that does not fit.
fn pack(candidates: Vec<&Candidate>, max_chars: usize, contiguous: bool) -> Vec<&Candidate> {
    let mut used = 0usize;
    let mut picked = Vec::new();
    for candidate in candidates {
        let len = candidate.text.chars().count();
        let needed = if picked.is_empty() { len } else { len + 1 };
        if used + needed <= max_chars {
            used += needed;
            picked.push(candidate);
        } else if contiguous {
            break;
        }
    }
    picked
}

fn join_in_document_order(mut picked: Vec<&Candidate>) -> String {
    picked.sort_by_key(|c| c.index);
    picked
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses whitespace and guarantees terminal punctuation.
fn finalize_sentence(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut sentence = collapsed
        .trim_end_matches([',', ';', ':', '-', '–', ' '])
        .to_string();
    if sentence.is_empty() {
        return sentence;
    }
    if !is_terminated(&sentence) {
        sentence.push('.');
    }
    sentence
}

fn is_terminated(sentence: &str) -> bool {
    sentence
        .trim_end_matches(['"', '\'', '”', '’', ')', ']'])
        .ends_with(['.', '!', '?'])
}

/// Cuts `text` to at most `max_chars` at a word boundary, closing with a period.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let cut: String = text.chars().take(max_chars - 1).collect();
    let at_word = match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    let mut truncated = at_word
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '–' | '.'))
        .to_string();
    truncated.push('.');
    truncated
}

// ────────────────────────────────────────────────────────────────────────────
// Explanations
// ────────────────────────────────────────────────────────────────────────────

/// Names the one or two strongest factors behind a section's score.
pub fn explain_relevance(scored: &ScoredSection, profile: &PersonaProfile) -> String {
    let mut strengths = scored.breakdown.strengths();
    // Stable sort keeps factor order among equal strengths.
    strengths.sort_by(|a, b| b.1.total_cmp(&a.1));

    let phrases: Vec<String> = strengths
        .iter()
        .filter(|(_, strength)| *strength >= EXPLANATION_MIN_STRENGTH)
        .filter_map(|(factor, _)| describe_factor(*factor, scored, profile))
        .take(2)
        .collect();

    if phrases.is_empty() {
        return FALLBACK_EXPLANATION.to_string();
    }
    capitalize_first(&phrases.join("; "))
}

fn describe_factor(factor: Factor, scored: &ScoredSection, profile: &PersonaProfile) -> Option<String> {
    let breakdown = &scored.breakdown;
    match factor {
        Factor::JobAlignment if !breakdown.matched_job_keywords.is_empty() => Some(format!(
            "covers task keywords ({})",
            keyword_list(&breakdown.matched_job_keywords)
        )),
        Factor::PersonaKeywords if !breakdown.matched_persona_keywords.is_empty() => Some(format!(
            "matches {} interests ({})",
            profile.archetype.label(),
            keyword_list(&breakdown.matched_persona_keywords)
        )),
        Factor::SectionPriority if profile.archetype != PersonaArchetype::Generic => Some(format!(
            "{} content is a priority for a {}",
            scored.section.section_type.label(),
            profile.archetype.label()
        )),
        Factor::ContentQuality => Some("substantive, well-structured content".to_string()),
        _ => None,
    }
}

fn keyword_list(keywords: &[String]) -> String {
    keywords
        .iter()
        .take(EXPLANATION_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
