use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and which scorers are available.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cv-matcher",
        "vocabulary": {
            "name": state.vocabulary.name(),
            "version": state.vocabulary.version(),
            "terms": state.vocabulary.len(),
        },
        "analysis_enabled": state.analysis.is_some(),
    }))
}
