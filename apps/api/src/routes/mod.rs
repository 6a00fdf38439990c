pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Lexical building blocks
        .route("/api/v1/language", post(matching::handle_detect_language))
        .route("/api/v1/skills", post(matching::handle_extract_skills))
        .route("/api/v1/score", post(matching::handle_score))
        // Documents
        .route(
            "/api/v1/documents/extract",
            post(extraction::handle_extract_document),
        )
        // Batch matching
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/match/upload", post(matching::handle_match_upload))
        // Analysis service
        .route("/api/v1/analysis/verify", post(matching::handle_verify_key))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::{document_from_text, DocumentExtractor};
    use crate::llm_client::{LlmClient, LlmSettings};
    use crate::matching::analysis::{AnalysisService, MatchAnalysis};
    use crate::matching::document::TextDocument;
    use crate::matching::error::MatchError;
    use crate::matching::vocabulary::ControlledVocabulary;

    const JOB: &str = "Looking for a python developer with aws and docker experience";

    /// Treats uploaded bytes as UTF-8 text; anything else has no text layer.
    struct PlainTextExtractor;

    #[async_trait]
    impl DocumentExtractor for PlainTextExtractor {
        async fn extract(&self, bytes: Bytes) -> Result<TextDocument, MatchError> {
            let text = String::from_utf8(bytes.to_vec()).unwrap_or_default();
            document_from_text(text)
        }
    }

    /// Fails for CVs mentioning "cobol", scores 80 otherwise.
    struct FixedAnalysis;

    #[async_trait]
    impl AnalysisService for FixedAnalysis {
        async fn analyze(&self, _: &str, cv_text: &str) -> Result<MatchAnalysis, MatchError> {
            if cv_text.contains("cobol") {
                return Err(MatchError::AnalysisServiceUnavailable("boom".to_string()));
            }
            Ok(MatchAnalysis {
                match_percentage: 80.0,
                overall_analysis: "good fit".to_string(),
                ..MatchAnalysis::default()
            })
        }
    }

    fn state(analysis: Option<Arc<dyn AnalysisService>>) -> AppState {
        AppState {
            config: Config::default(),
            vocabulary: Arc::new(ControlledVocabulary::builtin()),
            llm: None,
            analysis,
            extractor: Arc::new(PlainTextExtractor),
        }
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    const BOUNDARY: &str = "matcher-test-boundary";

    fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/pdf\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_vocabulary_and_analysis() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["vocabulary"]["terms"], 69);
        assert_eq!(body["analysis_enabled"], false);
    }

    #[tokio::test]
    async fn test_language_endpoint() {
        let (status, body) = post_json(
            build_router(state(None)),
            "/api/v1/language",
            json!({"text": "le la les"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["language"], "French");
    }

    #[tokio::test]
    async fn test_skills_endpoint() {
        let (status, body) = post_json(
            build_router(state(None)),
            "/api/v1/skills",
            json!({"text": JOB}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"], json!(["python", "aws", "docker"]));
        assert_eq!(body["vocabulary"], "default-tech");
    }

    #[tokio::test]
    async fn test_score_endpoint() {
        let (status, body) = post_json(
            build_router(state(None)),
            "/api/v1/score",
            json!({"job_description": JOB, "cv_text": "python docker"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let score = body["match_percentage"].as_f64().unwrap();
        assert!(score > 0.0 && score < 100.0);
    }

    #[tokio::test]
    async fn test_match_ranks_lexically() {
        let (status, body) = post_json(
            build_router(state(None)),
            "/api/v1/match",
            json!({
                "job_description": JOB,
                "candidates": ["Pastry chef", "python aws docker developer", ""]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scorer_backend"], "lexical");
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["candidate_index"], 1);
        assert_eq!(body["candidates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_match_rejects_blank_job_description() {
        let (status, body) = post_json(
            build_router(state(None)),
            "/api/v1/match",
            json!({"job_description": "   ", "candidates": ["python"]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Job description is empty");
    }

    #[tokio::test]
    async fn test_match_rejects_empty_candidate_list() {
        let (status, body) = post_json(
            build_router(state(None)),
            "/api/v1/match",
            json!({"job_description": JOB, "candidates": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No candidate CVs provided");
    }

    #[tokio::test]
    async fn test_match_with_analysis_requires_configured_service() {
        let (status, body) = post_json(
            build_router(state(None)),
            "/api/v1/match",
            json!({"job_description": JOB, "candidates": ["python"], "use_analysis": true}),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_match_with_analysis_isolates_failures() {
        let app = build_router(state(Some(Arc::new(FixedAnalysis))));
        let (status, body) = post_json(
            app,
            "/api/v1/match",
            json!({
                "job_description": JOB,
                "candidates": ["cobol mainframe", "python docker"],
                "use_analysis": true
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scorer_backend"], "llm");

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["candidate_index"], 1);
        assert_eq!(results[0]["analysis"]["overallAnalysis"], "good fit");
        assert_eq!(results[1]["match_percentage"], 0.0);
        assert_eq!(
            results[1]["failure"]["kind"],
            "analysis_service_unavailable"
        );
    }

    #[tokio::test]
    async fn test_verify_without_key_is_unavailable() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analysis/verify")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_verify_times_out_with_gateway_timeout() {
        let slow = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "{}"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, slow).await.unwrap();
        });

        let mut settings = LlmSettings::new("sk-test");
        settings.api_url = format!("http://{addr}/v1/chat/completions");
        settings.timeout = Duration::from_millis(100);
        let mut app_state = state(None);
        app_state.llm = Some(LlmClient::new(settings).unwrap());

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analysis/verify")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(build_router(app_state), request).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "GATEWAY_TIMEOUT");
    }

    #[tokio::test]
    async fn test_upload_marks_unextractable_cv() {
        let request = multipart_request(
            "/api/v1/match/upload",
            &[
                ("job_description", None, JOB),
                ("cv", Some("good.pdf"), "python aws docker developer"),
                ("cv", Some("scanned.pdf"), "   "),
            ],
        );
        let (status, body) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::OK);

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["candidate_index"], 0);
        assert_eq!(results[1]["candidate_index"], 1);
        assert_eq!(results[1]["match_percentage"], 0.0);
        assert_eq!(results[1]["failure"]["kind"], "extraction_failed");
        assert_eq!(results[1]["analysis"]["matchPercentage"], 0.0);
        assert!(results[1].get("breakdown").is_none());
        assert_eq!(body["candidates"][1]["file_name"], "scanned.pdf");
    }

    #[tokio::test]
    async fn test_upload_with_analysis_never_scores_unextractable_cv() {
        let request = multipart_request(
            "/api/v1/match/upload",
            &[
                ("job_description", None, JOB),
                ("cv", Some("scanned.pdf"), "   "),
                ("cv", Some("good.pdf"), "python aws docker developer"),
                ("use_analysis", None, "true"),
            ],
        );
        let (status, body) = send(build_router(state(Some(Arc::new(FixedAnalysis)))), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scorer_backend"], "llm");

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["candidate_index"], 1);
        assert_eq!(results[0]["match_percentage"], 80.0);

        let failed = &results[1];
        assert_eq!(failed["candidate_index"], 0);
        assert_eq!(failed["match_percentage"], 0.0);
        assert_eq!(failed["failure"]["kind"], "extraction_failed");
        assert_eq!(failed["analysis"]["matchPercentage"], 0.0);
        assert_ne!(failed["analysis"]["overallAnalysis"], "good fit");
        assert!(failed["analysis"]["overallAnalysis"]
            .as_str()
            .unwrap()
            .contains("extract"));
    }

    #[tokio::test]
    async fn test_upload_with_job_file() {
        let request = multipart_request(
            "/api/v1/match/upload",
            &[
                ("job_file", Some("job.pdf"), JOB),
                ("cv", Some("a.pdf"), "python developer"),
            ],
        );
        let (status, body) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_without_job_is_rejected() {
        let request = multipart_request(
            "/api/v1/match/upload",
            &[("cv", Some("a.pdf"), "python developer")],
        );
        let (status, _) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_document_endpoint() {
        let request = multipart_request(
            "/api/v1/documents/extract",
            &[("file", Some("cv.pdf"), "Développeur pour les projets dans la banque")],
        );
        let (status, body) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["language"], "French");
    }

    #[tokio::test]
    async fn test_extract_document_without_text_is_unprocessable() {
        let request = multipart_request(
            "/api/v1/documents/extract",
            &[("file", Some("scan.pdf"), " ")],
        );
        let (status, body) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    }
}
