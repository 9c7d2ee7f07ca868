//! Relevance Scoring: pluggable, trait-based scorer for one section against a
//! persona profile and a job keyword set.
//!
//! Default: `WeightedRelevanceScorer` (pure-Rust, deterministic, fully testable).
//!
//! `AppState` holds an `Arc<dyn RelevanceScorer>`, chosen at startup.

use serde::{Deserialize, Serialize};

use crate::analysis::job_keywords::JobKeywords;
use crate::analysis::persona::{PersonaProfile, SECTION_PRIORITY_CEILING, SECTION_PRIORITY_FLOOR};
use crate::analysis::text::contains_term;
use crate::models::document::{QualityMetrics, Section};

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Weights of the additive factors. Section priority is added unweighted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub persona_keywords: f64,
    pub job_alignment: f64,
    pub content_quality: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            persona_keywords: 0.10,
            job_alignment: 0.15,
            content_quality: 0.10,
        }
    }
}

impl ScoringWeights {
    /// Largest possible raw sum; the composite score is divided by this.
    pub fn max_raw(&self) -> f64 {
        self.persona_keywords + SECTION_PRIORITY_CEILING + self.job_alignment + self.content_quality
    }
}

/// One of the four scoring factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    PersonaKeywords,
    SectionPriority,
    JobAlignment,
    ContentQuality,
}

/// Per-factor sub-scores, each 0.0 – 1.0 except `section_priority` (floor – ceiling).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub persona_match: f64,
    pub section_priority: f64,
    pub job_alignment: f64,
    pub content_quality: f64,
    /// Persona keywords found in the section, in profile order.
    pub matched_persona_keywords: Vec<String>,
    /// Job keywords found in the section, heaviest first.
    pub matched_job_keywords: Vec<String>,
}

impl ScoreBreakdown {
    /// Each factor's strength rescaled to 0.0 – 1.0, in fixed factor order.
    pub fn strengths(&self) -> [(Factor, f64); 4] {
        let priority_span = SECTION_PRIORITY_CEILING - SECTION_PRIORITY_FLOOR;
        [
            (Factor::PersonaKeywords, self.persona_match),
            (
                Factor::SectionPriority,
                ((self.section_priority - SECTION_PRIORITY_FLOOR) / priority_span).clamp(0.0, 1.0),
            ),
            (Factor::JobAlignment, self.job_alignment),
            (Factor::ContentQuality, self.content_quality),
        ]
    }
}

/// A section paired with its composite relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSection {
    pub section: Section,
    /// Normalized composite, 0.0 – 1.0.
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The relevance scorer trait. Implement this to swap scoring backends without
/// touching the pipeline or handlers.
///
/// Carried in `AppState` as `Arc<dyn RelevanceScorer>`.
pub trait RelevanceScorer: Send + Sync {
    fn score(&self, section: Section, profile: &PersonaProfile, job: &JobKeywords) -> ScoredSection;

    fn weights(&self) -> ScoringWeights;

    /// Short backend name, logged for transparency.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedRelevanceScorer: default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Additive four-factor scorer.
///
/// Algorithm:
/// 1. persona_match   = fraction of persona keywords present in title + body
/// 2. section_priority = profile priority for the section type (0.30 – 0.90)
/// 3. job_alignment   = Σ weight of matched job keywords / Σ weight of all job keywords
/// 4. content_quality = length band, technical density, structural markers
/// 5. score = (w_p·persona + priority + w_j·job + w_q·quality) / max_raw
#[derive(Debug, Clone, Default)]
pub struct WeightedRelevanceScorer {
    pub weights: ScoringWeights,
}

impl RelevanceScorer for WeightedRelevanceScorer {
    fn score(&self, section: Section, profile: &PersonaProfile, job: &JobKeywords) -> ScoredSection {
        let haystack = format!("{}\n{}", section.title, section.body).to_lowercase();

        let matched_persona_keywords: Vec<String> = profile
            .keywords
            .iter()
            .filter(|kw| contains_term(&haystack, kw))
            .cloned()
            .collect();
        let persona_match = if profile.keywords.is_empty() {
            0.0
        } else {
            matched_persona_keywords.len() as f64 / profile.keywords.len() as f64
        };

        let (job_alignment, matched_job_keywords) = compute_job_alignment(&haystack, job);
        let section_priority = profile.priority_for(section.section_type);
        let content_quality = compute_content_quality(&section.metrics);

        let w = &self.weights;
        let raw = w.persona_keywords * persona_match
            + section_priority
            + w.job_alignment * job_alignment
            + w.content_quality * content_quality;
        let score = (raw / w.max_raw()).clamp(0.0, 1.0);

        ScoredSection {
            section,
            score,
            breakdown: ScoreBreakdown {
                persona_match,
                section_priority,
                job_alignment,
                content_quality,
                matched_persona_keywords,
                matched_job_keywords,
            },
        }
    }

    fn weights(&self) -> ScoringWeights {
        self.weights
    }

    fn backend(&self) -> &'static str {
        "weighted"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Factor computations
// ────────────────────────────────────────────────────────────────────────────

/// Weighted fraction of job keywords present in `haystack` (lowercase).
/// Returns matched keywords sorted by weight, heaviest first.
pub fn compute_job_alignment(haystack: &str, job: &JobKeywords) -> (f64, Vec<String>) {
    let total_weight = job.total_weight() as f64;
    if total_weight <= 0.0 {
        return (0.0, Vec::new());
    }

    let mut matched: Vec<(&str, f32)> = job
        .iter()
        .filter(|entry| contains_term(haystack, &entry.keyword))
        .map(|entry| (entry.keyword.as_str(), entry.weighted_score))
        .collect();
    let matched_weight: f64 = matched.iter().map(|(_, w)| *w as f64).sum();

    // Stable: equal weights keep keyword-set order.
    matched.sort_by(|a, b| b.1.total_cmp(&a.1));
    let names = matched.into_iter().map(|(kw, _)| kw.to_string()).collect();

    ((matched_weight / total_weight).clamp(0.0, 1.0), names)
}

/// Content-quality sub-score, 0.0 – 1.0.
///
/// half length band (50–500 words best), a quarter technical density,
/// a quarter structural markers (lists, numbers, proper nouns).
pub fn compute_content_quality(metrics: &QualityMetrics) -> f64 {
    let length = match metrics.word_count {
        0 => 0.0,
        50..=500 => 1.0,
        20..=1000 => 0.5,
        _ => 0.2,
    };
    // Saturates at 15% technical tokens.
    let density = (metrics.technical_density / 0.15).clamp(0.0, 1.0);
    let markers = [metrics.has_list_markers, metrics.has_numbers, metrics.has_proper_nouns]
        .iter()
        .filter(|m| **m)
        .count() as f64
        / 3.0;

    0.5 * length + 0.25 * density + 0.25 * markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::job_keywords::extract_job_keywords;
    use crate::analysis::persona::{PersonaArchetype, PersonaTable};
    use crate::models::document::{SectionType, TitleSource};

    fn section(title: &str, body: &str, section_type: SectionType, word_count: usize) -> Section {
        Section {
            document_id: "doc.pdf".to_string(),
            document_index: 0,
            ordinal: 0,
            page_number: 1,
            title: title.to_string(),
            title_source: TitleSource::Heading,
            section_type,
            body: body.to_string(),
            metrics: QualityMetrics {
                word_count,
                char_count: body.len(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_default_weights_normalize_by_one_point_two_five() {
        let w = ScoringWeights::default();
        assert!((w.max_raw() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_score_within_unit_interval() {
        let table = PersonaTable::builtin();
        let profile = table.profile(PersonaArchetype::TravelPlanner);
        let job = extract_job_keywords("Plan a trip with beaches, nightlife and restaurants");
        let scorer = WeightedRelevanceScorer::default();

        let best = section(
            "Beaches and Nightlife",
            "Visit the beach at dawn, then the restaurant and nightlife district. Hotel deals, tour options, budget tips.",
            SectionType::Itinerary,
            120,
        );
        let scored = scorer.score(best, profile, &job);
        assert!(scored.score > 0.0 && scored.score <= 1.0);

        let worst = section("Notes", "", SectionType::Methodology, 0);
        let scored = scorer.score(worst, profile, &job);
        assert!(scored.score >= 0.0 && scored.score < 0.5);
    }

    #[test]
    fn test_maximal_section_scores_one() {
        let table = PersonaTable::builtin();
        let profile = table.profile(PersonaArchetype::FoodContractor);
        let job = extract_job_keywords("vegetarian buffet");
        let body = profile.keywords.join(" ") + " vegetarian buffet";
        let mut s = section("Buffet", &body, SectionType::Recipe, 100);
        s.metrics.technical_density = 0.5;
        s.metrics.has_list_markers = true;
        s.metrics.has_numbers = true;
        s.metrics.has_proper_nouns = true;

        let scored = WeightedRelevanceScorer::default().score(s, profile, &job);
        assert!((scored.score - 1.0).abs() < 1e-9, "got {}", scored.score);
    }

    #[test]
    fn test_generic_persona_empty_job_ranks_by_priority_and_quality() {
        let table = PersonaTable::builtin();
        let profile = table.profile(PersonaArchetype::Generic);
        let job = extract_job_keywords("");
        let scorer = WeightedRelevanceScorer::default();

        let long = scorer.score(section("A", "text", SectionType::General, 200), profile, &job);
        let short = scorer.score(section("B", "text", SectionType::General, 5), profile, &job);
        assert_eq!(long.breakdown.persona_match, 0.0);
        assert_eq!(long.breakdown.job_alignment, 0.0);
        assert!(long.score > short.score);
    }

    #[test]
    fn test_job_alignment_is_weighted_fraction() {
        // beach: 2/2 = 1.0, museum: 1/2 = 0.5 → total 1.5
        let job = extract_job_keywords("beach, beach, museum");
        let (alignment, matched) = compute_job_alignment("a quiet beach nearby", &job);
        assert!((alignment - 1.0 / 1.5).abs() < 1e-6);
        assert_eq!(matched, vec!["beach".to_string()]);
    }

    #[test]
    fn test_job_alignment_orders_matches_by_weight() {
        let job = extract_job_keywords("museum, beach, beach");
        let (_, matched) = compute_job_alignment("museum and beach", &job);
        assert_eq!(matched, vec!["beach".to_string(), "museum".to_string()]);
    }

    #[test]
    fn test_section_priority_reflects_persona_table() {
        let table = PersonaTable::builtin();
        let profile = table.profile(PersonaArchetype::TravelPlanner);
        let job = JobKeywords::default();
        let scorer = WeightedRelevanceScorer::default();

        let itinerary = scorer.score(section("Day 1", "walk", SectionType::Itinerary, 60), profile, &job);
        let method = scorer.score(section("Setup", "walk", SectionType::Methodology, 60), profile, &job);
        assert_eq!(itinerary.breakdown.section_priority, 0.90);
        assert_eq!(method.breakdown.section_priority, SECTION_PRIORITY_FLOOR);
        assert!(itinerary.score > method.score);
    }

    #[test]
    fn test_content_quality_bands() {
        let mut m = QualityMetrics {
            word_count: 100,
            ..Default::default()
        };
        assert!((compute_content_quality(&m) - 0.5).abs() < 1e-9);
        m.word_count = 800;
        assert!((compute_content_quality(&m) - 0.25).abs() < 1e-9);
        m.word_count = 0;
        assert_eq!(compute_content_quality(&m), 0.0);
        m.word_count = 100;
        m.has_list_markers = true;
        m.has_numbers = true;
        m.has_proper_nouns = true;
        m.technical_density = 0.15;
        assert!((compute_content_quality(&m) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_strengths_rescale_priority() {
        let breakdown = ScoreBreakdown {
            section_priority: SECTION_PRIORITY_CEILING,
            ..Default::default()
        };
        let strengths = breakdown.strengths();
        assert_eq!(strengths[1], (Factor::SectionPriority, 1.0));
    }

    #[test]
    fn test_scorer_reports_backend_and_weights() {
        let scorer: &dyn RelevanceScorer = &WeightedRelevanceScorer::default();
        assert_eq!(scorer.backend(), "weighted");
        assert_eq!(scorer.weights(), ScoringWeights::default());
    }
}
