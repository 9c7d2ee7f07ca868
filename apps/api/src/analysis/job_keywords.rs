//! Job Keyword Extractor: weighted keyword set from a job-to-be-done description.
//!
//! Unigrams are content words (alphabetic, at least three characters, not a stop
//! word). Bigrams and trigrams are built only from runs of adjacent content words
//! inside one clause, so a phrase never straddles a stop word or punctuation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::text::{is_stop_word, words};

const MIN_KEYWORD_CHARS: usize = 3;
const MAX_NGRAM: usize = 3;
/// Upper bound on entries kept; lowest weights are dropped first.
const MAX_KEYWORDS: usize = 40;

/// A single keyword from the job description, weighted by relative frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub frequency: u32,
    /// Number of words in the keyword (1 – 3).
    pub ngram_len: u8,
    /// frequency / highest frequency in the set, 0.0 – 1.0
    pub weighted_score: f32,
}

/// Weighted keyword set derived from the job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobKeywords {
    pub keywords: Vec<KeywordEntry>,
}

impl JobKeywords {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordEntry> {
        self.keywords.iter()
    }

    pub fn total_weight(&self) -> f32 {
        self.keywords.iter().map(|k| k.weighted_score).sum()
    }

    #[cfg(test)]
    pub fn weight_of(&self, keyword: &str) -> Option<f32> {
        self.keywords
            .iter()
            .find(|k| k.keyword == keyword)
            .map(|k| k.weighted_score)
    }
}

/// Extracts the weighted keyword set. An empty or stop-word-only description yields an empty set.
pub fn extract_job_keywords(job: &str) -> JobKeywords {
    let lowered = job.to_lowercase();

    // Runs of adjacent content words; a stop word or clause punctuation closes a run.
    let mut runs: Vec<Vec<&str>> = Vec::new();
    for clause in lowered.split(is_clause_break) {
        let mut current: Vec<&str> = Vec::new();
        for word in words(clause) {
            if is_content_word(word) {
                current.push(word);
            } else if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
    }

    // Counts in first-seen order so equal weights keep a stable order.
    let mut order: Vec<(String, u8)> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();
    for run in &runs {
        for n in 1..=MAX_NGRAM.min(run.len()) {
            for window in run.windows(n) {
                let phrase = window.join(" ");
                let count = counts.entry(phrase.clone()).or_insert(0);
                if *count == 0 {
                    order.push((phrase, n as u8));
                }
                *count += 1;
            }
        }
    }

    let max_frequency = counts.values().copied().max().unwrap_or(0);
    if max_frequency == 0 {
        return JobKeywords::default();
    }

    let mut keywords: Vec<KeywordEntry> = order
        .into_iter()
        .map(|(keyword, ngram_len)| {
            let frequency = counts.get(&keyword).copied().unwrap_or(0);
            KeywordEntry {
                weighted_score: frequency as f32 / max_frequency as f32,
                keyword,
                frequency,
                ngram_len,
            }
        })
        .collect();

    if keywords.len() > MAX_KEYWORDS {
        // Stable sort keeps first-seen order among equal weights.
        keywords.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));
        keywords.truncate(MAX_KEYWORDS);
    }

    JobKeywords { keywords }
}

fn is_clause_break(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '(' | ')' | '\n' | '•' | '/')
}

fn is_content_word(word: &str) -> bool {
    word.chars().count() >= MIN_KEYWORD_CHARS
        && word.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'' || c == '’')
        && !is_stop_word(word)
}
