pub mod health;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route("/api/v1/analyze/pdf", post(handlers::handle_analyze_pdf))
        .route("/api/v1/persona/classify", post(handlers::handle_classify_persona))
        .route("/api/v1/job/keywords", post(handlers::handle_job_keywords))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    const BOUNDARY: &str = "sectionrank-test-boundary";

    fn app() -> Router {
        build_router(AppState::new(Config::default()))
    }

    fn app_with(config: Config) -> Router {
        build_router(AppState::new(config))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_multipart(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze/pdf")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn travel_request() -> Value {
        json!({
            "documents": [
                {
                    "id": "nice.pdf",
                    "pages": [
                        {"text": "Coastal Adventures\n\nThe beaches of Nice are perfect for a group of college friends. Spend a day swimming and kayaking."},
                        {"text": "Where to Stay\n\nAffordable hotels near the old town suit a group on a budget."}
                    ]
                },
                {
                    "id": "scan.pdf",
                    "pages": [{"text": ""}]
                }
            ],
            "persona": {"role": "Travel Planner"},
            "job_to_be_done": {"task": "Plan a trip of 4 days for a group of 10 college friends"}
        })
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "sectionrank");
    }

    #[tokio::test]
    async fn test_analyze_returns_ranked_report() {
        let (status, json) = send(app(), post_json("/api/v1/analyze", travel_request())).await;
        assert_eq!(status, StatusCode::OK, "body: {json}");

        assert_eq!(json["metadata"]["input_documents"], json!(["nice.pdf", "scan.pdf"]));
        assert_eq!(json["metadata"]["persona"], "Travel Planner");
        assert_eq!(json["metadata"]["persona_archetype"], "travel_planner");

        let sections = json["extracted_sections"].as_array().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0]["importance_rank"], 1);
        assert!(sections.iter().all(|s| s["document"] == "nice.pdf"));
        let pages: Vec<u64> = sections.iter().map(|s| s["page_number"].as_u64().unwrap()).collect();
        assert!(pages.contains(&1) && pages.contains(&2));

        let subsections = json["subsection_analysis"].as_array().unwrap();
        assert_eq!(subsections.len(), 2);
        assert!(subsections[0].get("relevance_explanation").is_none());
    }

    #[tokio::test]
    async fn test_analyze_with_explanations_and_top_n() {
        let mut request = travel_request();
        request["top_n"] = json!(1);
        request["include_explanations"] = json!(true);
        let (status, json) = send(app(), post_json("/api/v1/analyze", request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["extracted_sections"].as_array().unwrap().len(), 1);
        assert!(json["subsection_analysis"][0]["relevance_explanation"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_rejects_zero_top_n() {
        let mut request = travel_request();
        request["top_n"] = json!(0);
        let (status, json) = send(app(), post_json("/api/v1/analyze", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_rejects_too_many_documents() {
        let config = Config {
            max_documents: 1,
            ..Config::default()
        };
        let (status, _) = send(app_with(config), post_json("/api/v1/analyze", travel_request())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_empty_documents_is_valid() {
        let request = json!({"documents": [], "persona": "", "job_to_be_done": ""});
        let (status, json) = send(app(), post_json("/api/v1/analyze", request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["metadata"]["persona_archetype"], "generic");
        assert_eq!(json["extracted_sections"], json!([]));
        assert_eq!(json["subsection_analysis"], json!([]));
    }

    #[tokio::test]
    async fn test_classify_persona() {
        let request = json!({"persona": "PhD Researcher in Computational Biology"});
        let (status, json) = send(app(), post_json("/api/v1/persona/classify", request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["archetype"], "researcher");
        assert_eq!(json["match_count"], 2);
        assert_eq!(json["section_priorities"]["methodology"], 0.9);
    }

    #[tokio::test]
    async fn test_job_keywords() {
        let request = json!({"job_to_be_done": "Create and manage fillable forms for onboarding and compliance."});
        let (status, json) = send(app(), post_json("/api/v1/job/keywords", request)).await;
        assert_eq!(status, StatusCode::OK);
        let keywords: Vec<&str> = json["keywords"]
            .as_array()
            .unwrap()
            .iter()
            .map(|k| k["keyword"].as_str().unwrap())
            .collect();
        assert!(keywords.contains(&"fillable forms"));
        assert!(keywords.contains(&"onboarding"));
        assert!(!keywords.contains(&"and"));
    }

    #[tokio::test]
    async fn test_pdf_route_requires_a_file() {
        let request = post_multipart(&[("persona", None, "Travel Planner"), ("job_to_be_done", None, "Plan a trip")]);
        let (status, json) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_pdf_route_rejects_batch_without_any_pdf() {
        let request = post_multipart(&[
            ("persona", None, "Travel Planner"),
            ("files", Some("notes.txt"), "just some text"),
        ]);
        let (status, json) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "EXTRACTION_ERROR");
    }

    #[tokio::test]
    async fn test_pdf_route_keeps_going_past_a_non_pdf_file() {
        let request = post_multipart(&[
            ("persona", None, "Travel Planner"),
            ("files", Some("broken.pdf"), "%PDF-1.4 junk"),
            ("files", Some("notes.txt"), "just some text"),
        ]);
        let (status, json) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK, "body: {json}");
        assert_eq!(json["metadata"]["input_documents"], json!(["broken.pdf", "notes.txt"]));
        assert_eq!(json["extracted_sections"], json!([]));
        assert_eq!(json["subsection_analysis"], json!([]));
    }

    #[tokio::test]
    async fn test_pdf_route_degrades_unreadable_pdf_to_empty_result() {
        let request = post_multipart(&[
            ("persona", None, "Travel Planner"),
            ("job_to_be_done", None, "{\"task\": \"Plan a trip\"}"),
            ("files", Some("broken.pdf"), "%PDF-1.4 not really a pdf"),
        ]);
        let (status, json) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK, "body: {json}");
        assert_eq!(json["metadata"]["input_documents"], json!(["broken.pdf"]));
        assert_eq!(json["metadata"]["job_to_be_done"], "Plan a trip");
        assert_eq!(json["extracted_sections"], json!([]));
    }

    #[tokio::test]
    async fn test_pdf_route_rejects_bad_top_n() {
        let request = post_multipart(&[("top_n", None, "zero"), ("files", Some("a.pdf"), "%PDF-1.4")]);
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
