use serde::{Deserialize, Serialize};

/// One page of extracted text. `number` is 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

/// A document as handed over by the extraction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Usually the source filename.
    pub id: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(id: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id: id.into(),
            pages,
        }
    }

    /// Builds a document from page texts in reading order, numbering pages from 1.
    pub fn from_page_texts<I, S>(id: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(idx, text)| Page {
                number: idx as u32 + 1,
                text: text.into(),
            })
            .collect();
        Self::new(id, pages)
    }

    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|p| !p.text.trim().is_empty())
    }
}

/// Closed set of content categories a section can be classified into.
/// Persona priority tables are keyed by these labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Summary,
    Introduction,
    Methodology,
    Results,
    Analysis,
    Conclusion,
    Financial,
    Itinerary,
    Accommodation,
    Dining,
    Activities,
    Culture,
    Tips,
    Transportation,
    Procedure,
    Recipe,
    General,
}

impl SectionType {
    pub fn label(&self) -> &'static str {
        match self {
            SectionType::Summary => "summary",
            SectionType::Introduction => "introduction",
            SectionType::Methodology => "methodology",
            SectionType::Results => "results",
            SectionType::Analysis => "analysis",
            SectionType::Conclusion => "conclusion",
            SectionType::Financial => "financial",
            SectionType::Itinerary => "itinerary",
            SectionType::Accommodation => "accommodation",
            SectionType::Dining => "dining",
            SectionType::Activities => "activities",
            SectionType::Culture => "culture",
            SectionType::Tips => "tips",
            SectionType::Transportation => "transportation",
            SectionType::Procedure => "procedure",
            SectionType::Recipe => "recipe",
            SectionType::General => "general",
        }
    }
}

/// Where a section's title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleSource {
    /// A detected heading line, used verbatim.
    Heading,
    /// Synthesized from the body because the heading was generic or absent.
    Synthesized,
    /// A generic heading kept because the body offered nothing more distinctive.
    GenericFallback,
}

/// Content-quality signals computed once when the section is closed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub word_count: usize,
    pub char_count: usize,
    /// Technical-looking tokens per word, 0.0 – 1.0.
    pub technical_density: f64,
    pub has_list_markers: bool,
    pub has_numbers: bool,
    pub has_proper_nouns: bool,
}

/// A candidate section. Created by the section detector and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub document_id: String,
    /// Position of the owning document in the input; used for tie-breaking.
    pub document_index: usize,
    /// Position of this section within its document.
    pub ordinal: usize,
    pub page_number: u32,
    pub title: String,
    pub title_source: TitleSource,
    pub section_type: SectionType,
    pub body: String,
    pub metrics: QualityMetrics,
}
