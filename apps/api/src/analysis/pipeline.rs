//! Analysis pipeline: normalizer → section detector → scorer → ranker → refiner.
//!
//! Documents are consumed one at a time; only their scored sections outlive the
//! loop. Per-document work has no cross-document dependency, and the final merge
//! is the ranker's total order, so the result never depends on processing order.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::job_keywords::{extract_job_keywords, JobKeywords};
use crate::analysis::normalizer::normalize_document;
use crate::analysis::persona::{PersonaProfile, PersonaTable};
use crate::analysis::ranker::{rank_sections, RankedSection, DEFAULT_TOP_N};
use crate::analysis::refiner::{refine_sections, RefinedSubsection, DEFAULT_REFINED_TEXT_MAX_CHARS};
use crate::analysis::relevance::{RelevanceScorer, ScoredSection};
use crate::analysis::section_detector::detect_sections;
use crate::models::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub top_n: usize,
    pub refined_text_max_chars: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            refined_text_max_chars: DEFAULT_REFINED_TEXT_MAX_CHARS,
        }
    }
}

/// Everything the output assembler needs, ordered by importance rank.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    /// Document ids in input order.
    pub document_ids: Vec<String>,
    pub profile: PersonaProfile,
    pub persona_match_count: usize,
    pub job_keywords: JobKeywords,
    /// Sections detected across all documents, before truncation.
    pub sections_considered: usize,
    pub ranked: Vec<RankedSection>,
    pub refined: Vec<RefinedSubsection>,
}

/// Detects and scores the sections of one document.
/// A document without extractable text yields an empty list.
pub fn analyze_document(
    document: &Document,
    document_index: usize,
    profile: &PersonaProfile,
    job: &JobKeywords,
    scorer: &dyn RelevanceScorer,
) -> Vec<ScoredSection> {
    if !document.has_text() {
        warn!(document = %document.id, pages = document.pages.len(), "Document has no extractable text");
        return Vec::new();
    }

    let pages = normalize_document(document);
    let sections = detect_sections(&document.id, document_index, &pages);

    if sections.is_empty() {
        warn!(document = %document.id, pages = document.pages.len(), "Document contributed no sections");
        return Vec::new();
    }
    debug!(document = %document.id, sections = sections.len(), "Detected sections");

    sections
        .into_iter()
        .map(|section| scorer.score(section, profile, job))
        .collect()
}

/// Runs the full analysis. Infallible: bad documents degrade to zero sections.
pub fn run_analysis<I>(
    documents: I,
    persona: &str,
    job: &str,
    personas: &PersonaTable,
    scorer: &dyn RelevanceScorer,
    options: &AnalysisOptions,
) -> AnalysisOutcome
where
    I: IntoIterator<Item = Document>,
{
    let persona_match = personas.classify(persona);
    let profile = persona_match.profile.clone();
    let job_keywords = extract_job_keywords(job);

    let mut document_ids = Vec::new();
    let mut scored: Vec<ScoredSection> = Vec::new();
    for (document_index, document) in documents.into_iter().enumerate() {
        scored.extend(analyze_document(&document, document_index, &profile, &job_keywords, scorer));
        document_ids.push(document.id);
    }

    let sections_considered = scored.len();
    let ranking = rank_sections(scored, options.top_n);
    let refined = refine_sections(
        &ranking.ranked,
        &profile,
        &job_keywords,
        options.refined_text_max_chars,
    );

    info!(
        documents = document_ids.len(),
        archetype = profile.archetype.label(),
        job_keywords = job_keywords.len(),
        sections = sections_considered,
        ranked = ranking.ranked.len(),
        discarded = ranking.discarded,
        backend = scorer.backend(),
        "Analysis complete"
    );

    AnalysisOutcome {
        document_ids,
        profile,
        persona_match_count: persona_match.match_count,
        job_keywords,
        sections_considered,
        ranked: ranking.ranked,
        refined,
    }
}
