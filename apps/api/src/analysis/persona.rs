//! Persona Classifier: maps a free-text persona description to a fixed archetype.
//!
//! The archetype dictionaries are static data; `PersonaTable::builtin()` turns them
//! into an immutable lookup table once at startup. The table is shared read-only
//! through `AppState`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::analysis::text::{count_term, normalize_for_matching};
use crate::models::document::SectionType;

/// Lowest and highest section-type priority a profile may assign.
pub const SECTION_PRIORITY_FLOOR: f64 = 0.30;
pub const SECTION_PRIORITY_CEILING: f64 = 0.90;
/// Priority given by the generic archetype to every section type.
pub const NEUTRAL_SECTION_PRIORITY: f64 = 0.60;

/// Closed set of persona archetypes. Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaArchetype {
    Researcher,
    Student,
    Analyst,
    Entrepreneur,
    Journalist,
    TravelPlanner,
    HrProfessional,
    FoodContractor,
    Generic,
}

impl PersonaArchetype {
    pub fn label(&self) -> &'static str {
        match self {
            PersonaArchetype::Researcher => "researcher",
            PersonaArchetype::Student => "student",
            PersonaArchetype::Analyst => "analyst",
            PersonaArchetype::Entrepreneur => "entrepreneur",
            PersonaArchetype::Journalist => "journalist",
            PersonaArchetype::TravelPlanner => "travel planner",
            PersonaArchetype::HrProfessional => "HR professional",
            PersonaArchetype::FoodContractor => "food contractor",
            PersonaArchetype::Generic => "generic",
        }
    }
}

/// Static dictionary entry for one archetype.
struct ArchetypeDefinition {
    archetype: PersonaArchetype,
    /// Words in a persona description that point at this archetype.
    triggers: &'static [&'static str],
    /// Vocabulary this persona cares about inside documents.
    keywords: &'static [&'static str],
    priorities: &'static [(SectionType, f64)],
    default_priority: f64,
}

/// Archetype dictionaries in tie-break order. `Generic` is the fallback and has no triggers.
const ARCHETYPE_DEFINITIONS: &[ArchetypeDefinition] = &[
    ArchetypeDefinition {
        archetype: PersonaArchetype::Researcher,
        triggers: &["researcher", "research", "phd", "scientist", "postdoc", "academic", "professor"],
        keywords: &["methodology", "experiment", "data", "analysis", "hypothesis", "study", "research", "dataset", "benchmark", "evaluation"],
        priorities: &[
            (SectionType::Methodology, 0.90),
            (SectionType::Results, 0.80),
            (SectionType::Analysis, 0.70),
            (SectionType::Introduction, 0.60),
            (SectionType::Summary, 0.55),
            (SectionType::Conclusion, 0.50),
        ],
        default_priority: SECTION_PRIORITY_FLOOR,
    },
    ArchetypeDefinition {
        archetype: PersonaArchetype::Student,
        triggers: &["student", "undergraduate", "graduate", "learner", "pupil", "exam"],
        keywords: &["concept", "definition", "example", "theory", "principle", "formula", "equation", "mechanism"],
        priorities: &[
            (SectionType::Introduction, 0.90),
            (SectionType::Summary, 0.80),
            (SectionType::Methodology, 0.60),
            (SectionType::Conclusion, 0.50),
            (SectionType::Analysis, 0.45),
        ],
        default_priority: SECTION_PRIORITY_FLOOR,
    },
    ArchetypeDefinition {
        archetype: PersonaArchetype::Analyst,
        triggers: &["analyst", "investment", "investor", "financial", "finance", "banker"],
        keywords: &["trend", "performance", "metric", "benchmark", "comparison", "forecast", "insight", "revenue", "growth", "market"],
        priorities: &[
            (SectionType::Financial, 0.90),
            (SectionType::Results, 0.80),
            (SectionType::Analysis, 0.70),
            (SectionType::Summary, 0.60),
        ],
        default_priority: SECTION_PRIORITY_FLOOR,
    },
    ArchetypeDefinition {
        archetype: PersonaArchetype::Entrepreneur,
        triggers: &["entrepreneur", "business", "startup", "founder", "owner", "executive"],
        keywords: &["market", "opportunity", "strategy", "business", "revenue", "growth", "innovation", "customer", "competitive"],
        priorities: &[
            (SectionType::Summary, 0.90),
            (SectionType::Analysis, 0.80),
            (SectionType::Results, 0.70),
            (SectionType::Financial, 0.65),
            (SectionType::Introduction, 0.50),
        ],
        default_priority: SECTION_PRIORITY_FLOOR,
    },
    ArchetypeDefinition {
        archetype: PersonaArchetype::Journalist,
        triggers: &["journalist", "reporter", "writer", "editor", "correspondent", "blogger"],
        keywords: &["fact", "source", "evidence", "quote", "statement", "report", "investigation", "according"],
        priorities: &[
            (SectionType::Summary, 0.90),
            (SectionType::Introduction, 0.80),
            (SectionType::Results, 0.70),
            (SectionType::Analysis, 0.60),
            (SectionType::Culture, 0.50),
        ],
        default_priority: SECTION_PRIORITY_FLOOR,
    },
    ArchetypeDefinition {
        archetype: PersonaArchetype::TravelPlanner,
        triggers: &["travel", "traveler", "traveller", "tourist", "trip", "vacation", "holiday", "planner", "tour", "itinerary"],
        keywords: &["destination", "place", "location", "visit", "culture", "experience", "attraction", "hotel", "restaurant", "beach", "tour", "itinerary", "activity", "nightlife", "group", "budget", "transport"],
        priorities: &[
            (SectionType::Itinerary, 0.90),
            (SectionType::Activities, 0.85),
            (SectionType::Accommodation, 0.80),
            (SectionType::Dining, 0.80),
            (SectionType::Tips, 0.75),
            (SectionType::Transportation, 0.70),
            (SectionType::Culture, 0.70),
            (SectionType::Summary, 0.60),
            (SectionType::General, 0.50),
            (SectionType::Introduction, 0.45),
        ],
        default_priority: SECTION_PRIORITY_FLOOR,
    },
    ArchetypeDefinition {
        archetype: PersonaArchetype::HrProfessional,
        triggers: &["hr", "human resources", "recruiter", "onboarding", "compliance", "payroll", "talent"],
        keywords: &["form", "fillable", "signature", "field", "onboarding", "compliance", "document", "employee", "workflow", "approval"],
        priorities: &[
            (SectionType::Procedure, 0.90),
            (SectionType::Summary, 0.60),
            (SectionType::Introduction, 0.50),
            (SectionType::General, 0.45),
        ],
        default_priority: SECTION_PRIORITY_FLOOR,
    },
    ArchetypeDefinition {
        archetype: PersonaArchetype::FoodContractor,
        triggers: &["food", "contractor", "chef", "caterer", "catering", "cook", "menu", "kitchen"],
        keywords: &["ingredient", "recipe", "vegetarian", "vegan", "gluten", "dinner", "buffet", "menu", "serving", "dish"],
        priorities: &[
            (SectionType::Recipe, 0.90),
            (SectionType::Dining, 0.80),
            (SectionType::Procedure, 0.60),
            (SectionType::General, 0.45),
        ],
        default_priority: SECTION_PRIORITY_FLOOR,
    },
    ArchetypeDefinition {
        archetype: PersonaArchetype::Generic,
        triggers: &[],
        keywords: &[],
        priorities: &[],
        default_priority: NEUTRAL_SECTION_PRIORITY,
    },
];

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

/// Resolved persona: archetype, vocabulary, and section-type priorities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub archetype: PersonaArchetype,
    /// Lowercase vocabulary matched against section text.
    pub keywords: Vec<String>,
    pub section_priorities: BTreeMap<SectionType, f64>,
    /// Used for section types missing from `section_priorities`.
    pub default_priority: f64,
}

impl PersonaProfile {
    /// Priority weight for a section type, always inside the floor/ceiling band.
    ///
    /// Unclassified (`General`) sections take the neutral weight unless the
    /// profile lists them; other unlisted types take the profile default.
    pub fn priority_for(&self, section_type: SectionType) -> f64 {
        let fallback = match section_type {
            SectionType::General => NEUTRAL_SECTION_PRIORITY,
            _ => self.default_priority,
        };
        self.section_priorities
            .get(&section_type)
            .copied()
            .unwrap_or(fallback)
            .clamp(SECTION_PRIORITY_FLOOR, SECTION_PRIORITY_CEILING)
    }

    fn from_definition(def: &ArchetypeDefinition) -> Self {
        Self {
            archetype: def.archetype,
            keywords: def.keywords.iter().map(|k| k.to_lowercase()).collect(),
            section_priorities: def.priorities.iter().copied().collect(),
            default_priority: def.default_priority,
        }
    }
}

/// Classification result: the chosen profile and how many trigger words matched.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaMatch<'a> {
    pub profile: &'a PersonaProfile,
    pub match_count: usize,
}

/// Immutable archetype lookup table, built once and shared.
#[derive(Debug, Clone)]
pub struct PersonaTable {
    profiles: HashMap<PersonaArchetype, PersonaProfile>,
    generic: PersonaProfile,
}

impl PersonaTable {
    pub fn builtin() -> Self {
        let profiles = ARCHETYPE_DEFINITIONS
            .iter()
            .map(|def| (def.archetype, PersonaProfile::from_definition(def)))
            .collect();
        let generic = PersonaProfile {
            archetype: PersonaArchetype::Generic,
            keywords: Vec::new(),
            section_priorities: BTreeMap::new(),
            default_priority: NEUTRAL_SECTION_PRIORITY,
        };
        Self { profiles, generic }
    }

    pub fn profile(&self, archetype: PersonaArchetype) -> &PersonaProfile {
        self.profiles.get(&archetype).unwrap_or(&self.generic)
    }

    /// Classifies a persona description.
    ///
    /// Algorithm:
    /// 1. Normalize (lowercase, punctuation stripped)
    /// 2. Count trigger-word matches per archetype
    /// 3. Highest count wins; ties go to the earlier archetype in declaration order
    /// 4. Zero matches anywhere → `Generic`
    pub fn classify(&self, description: &str) -> PersonaMatch<'_> {
        let normalized = normalize_for_matching(description);

        let mut best = (PersonaArchetype::Generic, 0usize);
        for def in ARCHETYPE_DEFINITIONS {
            let count = def
                .triggers
                .iter()
                .filter(|trigger| count_term(&normalized, trigger) > 0)
                .count();
            if count > best.1 {
                best = (def.archetype, count);
            }
        }

        PersonaMatch {
            profile: self.profile(best.0),
            match_count: best.1,
        }
    }
}

impl Default for PersonaTable {
    fn default() -> Self {
        Self::builtin()
    }
}
