use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::persona::PersonaArchetype;
use crate::analysis::pipeline::AnalysisOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    /// RFC 3339, UTC.
    pub processing_timestamp: String,
    pub persona_archetype: PersonaArchetype,
}

/// One row of the extracted-sections record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: u32,
    pub page_number: u32,
}

/// One row of the subsection-analysis record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_explanation: Option<String>,
}

/// Final JSON document returned to callers. Both lists are ordered by importance rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl AnalysisReport {
    pub fn assemble(
        outcome: &AnalysisOutcome,
        persona: &str,
        job_to_be_done: &str,
        include_explanations: bool,
        processed_at: DateTime<Utc>,
    ) -> Self {
        let extracted_sections = outcome
            .ranked
            .iter()
            .map(|r| ExtractedSection {
                document: r.scored.section.document_id.clone(),
                section_title: r.scored.section.title.clone(),
                importance_rank: r.importance_rank,
                page_number: r.scored.section.page_number,
            })
            .collect();

        let subsection_analysis = outcome
            .refined
            .iter()
            .map(|r| SubsectionAnalysis {
                document: r.document_id.clone(),
                refined_text: r.refined_text.clone(),
                page_number: r.page_number,
                relevance_explanation: include_explanations.then(|| r.relevance_explanation.clone()),
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                input_documents: outcome.document_ids.clone(),
                persona: persona.to_string(),
                job_to_be_done: job_to_be_done.to_string(),
                processing_timestamp: processed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                persona_archetype: outcome.profile.archetype,
            },
            extracted_sections,
            subsection_analysis,
        }
    }
}
