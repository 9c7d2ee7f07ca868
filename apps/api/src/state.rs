use std::sync::Arc;

use crate::analysis::persona::PersonaTable;
use crate::analysis::relevance::{RelevanceScorer, WeightedRelevanceScorer};
use crate::config::Config;
use crate::extraction::{PageExtractor, PdfPageExtractor};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Archetype lookup table, built once at startup and never mutated.
    pub personas: Arc<PersonaTable>,
    /// Pluggable relevance scorer. Default: WeightedRelevanceScorer.
    pub scorer: Arc<dyn RelevanceScorer>,
    /// PDF → page text collaborator for the multipart route.
    pub extractor: Arc<dyn PageExtractor>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            personas: Arc::new(PersonaTable::builtin()),
            scorer: Arc::new(WeightedRelevanceScorer::default()),
            extractor: Arc::new(PdfPageExtractor),
        }
    }
}
