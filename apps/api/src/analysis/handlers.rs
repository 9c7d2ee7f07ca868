use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::job_keywords::{extract_job_keywords, JobKeywords};
use crate::analysis::persona::PersonaProfile;
use crate::analysis::pipeline::run_analysis;
use crate::errors::AppError;
use crate::extraction::{ExtractionError, PageExtractor};
use crate::models::document::{Document, Page};
use crate::models::report::AnalysisReport;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request models
// ────────────────────────────────────────────────────────────────────────────

/// Persona as a bare string or `{"role": "..."}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PersonaInput {
    Text(String),
    Role { role: String },
}

impl PersonaInput {
    pub fn into_text(self) -> String {
        match self {
            PersonaInput::Text(text) => text,
            PersonaInput::Role { role } => role,
        }
    }
}

/// Job-to-be-done as a bare string or `{"task": "..."}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TaskInput {
    Text(String),
    Task { task: String },
}

impl TaskInput {
    pub fn into_text(self) -> String {
        match self {
            TaskInput::Text(text) => unwrap_task_text(text),
            TaskInput::Task { task } => task,
        }
    }
}

#[derive(Deserialize)]
struct TaskObject {
    task: String,
}

/// Unwraps a string that is itself a JSON object with a `task` field.
pub fn unwrap_task_text(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        if let Ok(object) = serde_json::from_str::<TaskObject>(trimmed) {
            return object.task;
        }
    }
    raw
}

#[derive(Debug, Deserialize)]
pub struct PageInput {
    /// Defaults to the 1-based position in `pages`.
    #[serde(default)]
    pub page_number: Option<u32>,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentInput {
    #[serde(alias = "filename")]
    pub id: String,
    #[serde(default)]
    pub pages: Vec<PageInput>,
}

impl DocumentInput {
    pub fn into_document(self) -> Document {
        let pages = self
            .pages
            .into_iter()
            .enumerate()
            .map(|(idx, page)| Page {
                number: page.page_number.unwrap_or(idx as u32 + 1),
                text: page.text,
            })
            .collect();
        Document::new(self.id, pages)
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub documents: Vec<DocumentInput>,
    #[serde(default)]
    pub persona: Option<PersonaInput>,
    #[serde(default)]
    pub job_to_be_done: Option<TaskInput>,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub include_explanations: bool,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyPersonaRequest {
    #[serde(default)]
    pub persona: Option<PersonaInput>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyPersonaResponse {
    pub persona: String,
    pub match_count: usize,
    #[serde(flatten)]
    pub profile: PersonaProfile,
}

#[derive(Debug, Deserialize)]
pub struct JobKeywordsRequest {
    pub job_to_be_done: TaskInput,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    validate_document_count(req.documents.len(), &state)?;
    validate_top_n(req.top_n)?;

    let documents: Vec<Document> = req
        .documents
        .into_iter()
        .map(DocumentInput::into_document)
        .collect();
    let persona = req.persona.map(PersonaInput::into_text).unwrap_or_default();
    let job = req.job_to_be_done.map(TaskInput::into_text).unwrap_or_default();

    let report = analyze(&state, documents, persona, job, req.top_n, req.include_explanations).await?;
    Ok(Json(report))
}

/// POST /api/v1/analyze/pdf
///
/// Multipart form: text fields `persona`, `job_to_be_done`, `top_n`,
/// `include_explanations`; every part with a filename is a PDF.
pub async fn handle_analyze_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut persona = String::new();
    let mut job = String::new();
    let mut top_n = None;
    let mut include_explanations = false;
    let mut documents: Vec<Document> = Vec::new();
    let mut pdf_uploads = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            validate_document_count(documents.len() + 1, &state)?;
            let bytes = field.bytes().await.map_err(multipart_error)?;
            let (document, failure) = extract_document(state.extractor.as_ref(), &file_name, bytes).await;
            if !matches!(failure, Some(ExtractionError::NotPdf(_))) {
                pdf_uploads += 1;
            }
            documents.push(document);
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "persona" => persona = value,
            "job_to_be_done" => job = unwrap_task_text(value),
            "top_n" => top_n = Some(parse_top_n_field(&value)?),
            "include_explanations" => include_explanations = parse_bool_field(&value),
            other => warn!(field = other, "Ignoring unknown multipart field"),
        }
    }

    if documents.is_empty() {
        return Err(AppError::Validation("At least one PDF file is required".to_string()));
    }
    if pdf_uploads == 0 {
        return Err(AppError::Extraction("None of the uploaded files is a PDF".to_string()));
    }
    validate_top_n(top_n)?;

    let report = analyze(&state, documents, persona, job, top_n, include_explanations).await?;
    Ok(Json(report))
}

/// POST /api/v1/persona/classify
pub async fn handle_classify_persona(
    State(state): State<AppState>,
    Json(req): Json<ClassifyPersonaRequest>,
) -> Json<ClassifyPersonaResponse> {
    let persona = req.persona.map(PersonaInput::into_text).unwrap_or_default();
    let matched = state.personas.classify(&persona);
    Json(ClassifyPersonaResponse {
        match_count: matched.match_count,
        profile: matched.profile.clone(),
        persona,
    })
}

/// POST /api/v1/job/keywords
pub async fn handle_job_keywords(Json(req): Json<JobKeywordsRequest>) -> Json<JobKeywords> {
    Json(extract_job_keywords(&req.job_to_be_done.into_text()))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Runs the CPU-bound pipeline on the blocking pool and assembles the report.
async fn analyze(
    state: &AppState,
    documents: Vec<Document>,
    persona: String,
    job: String,
    top_n: Option<usize>,
    include_explanations: bool,
) -> Result<AnalysisReport, AppError> {
    let options = state.config.analysis_options(top_n);
    let personas = Arc::clone(&state.personas);
    let scorer = Arc::clone(&state.scorer);

    info!(documents = documents.len(), top_n = options.top_n, "Starting analysis");

    tokio::task::spawn_blocking(move || {
        let outcome = run_analysis(documents, &persona, &job, &personas, scorer.as_ref(), &options);
        AnalysisReport::assemble(&outcome, &persona, &job, include_explanations, Utc::now())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in analysis: {e}")))
}

/// Any extraction failure degrades the file to an empty document so the rest
/// of the batch still runs. The failure is handed back for the caller to inspect.
async fn extract_document(
    extractor: &dyn PageExtractor,
    file_name: &str,
    bytes: Bytes,
) -> (Document, Option<ExtractionError>) {
    match extractor.extract(file_name, bytes).await {
        Ok(document) => (document, None),
        Err(e) => {
            warn!(document = file_name, error = %e, "Extraction failed; document contributes no sections");
            (Document::new(file_name, Vec::new()), Some(e))
        }
    }
}

fn validate_document_count(count: usize, state: &AppState) -> Result<(), AppError> {
    if count > state.config.max_documents {
        return Err(AppError::Validation(format!(
            "Too many documents: at most {} are accepted per request",
            state.config.max_documents
        )));
    }
    Ok(())
}

fn validate_top_n(top_n: Option<usize>) -> Result<(), AppError> {
    if top_n == Some(0) {
        return Err(AppError::Validation("top_n must be at least 1".to_string()));
    }
    Ok(())
}

fn parse_top_n_field(value: &str) -> Result<usize, AppError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| AppError::Validation(format!("top_n must be a positive integer, got '{value}'")))
}

fn parse_bool_field(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}
