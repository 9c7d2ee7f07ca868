//! Ranker: orders scored sections across all documents and keeps the top N.
//!
//! Ordering is a strict total order:
//! score desc → content-quality desc → document index asc → page asc → ordinal asc.
//! Identical inputs therefore always produce the identical ranking.

use std::cmp::Ordering;

use serde::Serialize;

use crate::analysis::relevance::ScoredSection;

pub const DEFAULT_TOP_N: usize = 5;

/// A scored section with its 1-based importance rank.
#[derive(Debug, Clone, Serialize)]
pub struct RankedSection {
    pub scored: ScoredSection,
    pub importance_rank: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RankingResult {
    pub ranked: Vec<RankedSection>,
    /// Sections that scored but fell outside the top N.
    pub discarded: usize,
}

/// Total order over scored sections; `Less` means "ranks higher".
pub fn compare_scored(a: &ScoredSection, b: &ScoredSection) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.breakdown.content_quality.total_cmp(&a.breakdown.content_quality))
        .then_with(|| a.section.document_index.cmp(&b.section.document_index))
        .then_with(|| a.section.page_number.cmp(&b.section.page_number))
        .then_with(|| a.section.ordinal.cmp(&b.section.ordinal))
        .then_with(|| a.section.document_id.cmp(&b.section.document_id))
}

/// Sorts and truncates to `limit`, assigning ranks 1..=limit.
pub fn rank_sections(mut scored: Vec<ScoredSection>, limit: usize) -> RankingResult {
    scored.sort_by(compare_scored);

    let discarded = scored.len().saturating_sub(limit);
    scored.truncate(limit);

    let ranked = scored
        .into_iter()
        .enumerate()
        .map(|(idx, scored)| RankedSection {
            scored,
            importance_rank: idx as u32 + 1,
        })
        .collect();

    RankingResult { ranked, discarded }
}
