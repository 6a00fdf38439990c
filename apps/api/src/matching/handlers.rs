//! Axum route handlers for the Matching API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::KeyVerification;
use crate::matching::aggregator::aggregate;
use crate::matching::document::TextDocument;
use crate::matching::error::MatchError;
use crate::matching::language::{detect, Language};
use crate::matching::ranker::{rank, rank_with_analysis, Candidate, MatchResult, ScorerBackend};
use crate::matching::skills::{extract, SkillSet};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub language: Language,
    pub vocabulary: String,
    pub skills: SkillSet,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub job_description: String,
    pub cv_text: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub match_percentage: f64,
    pub job_language: Language,
    pub cv_language: Language,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub job_description: String,
    pub candidates: Vec<String>,
    #[serde(default)]
    pub use_analysis: bool,
}

/// Per-candidate input details echoed back so clients can map indices to inputs.
#[derive(Debug, Serialize)]
pub struct CandidateSummary {
    pub candidate_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub run_id: Uuid,
    pub scorer_backend: ScorerBackend,
    pub vocabulary: String,
    pub job_language: Language,
    pub candidates: Vec<CandidateSummary>,
    pub results: Vec<MatchResult>,
    pub completed_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/language
pub async fn handle_detect_language(Json(request): Json<TextRequest>) -> Json<LanguageResponse> {
    Json(LanguageResponse {
        language: detect(&request.text),
    })
}

/// POST /api/v1/skills
///
/// Returns the vocabulary terms found in the text.
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Json<SkillsResponse> {
    Json(SkillsResponse {
        language: detect(&request.text),
        vocabulary: state.vocabulary.name().to_string(),
        skills: extract(&request.text, &state.vocabulary),
    })
}

/// POST /api/v1/score
///
/// Lexical match percentage of a single CV against a job description.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Json<ScoreResponse> {
    let job = TextDocument::new(request.job_description);
    let cv = TextDocument::new(request.cv_text);

    Json(ScoreResponse {
        match_percentage: aggregate(&job, &cv, &state.vocabulary),
        job_language: job.language(),
        cv_language: cv.language(),
    })
}

/// POST /api/v1/match
///
/// Ranks plain-text CVs against a job description.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let job = TextDocument::new(request.job_description);
    let candidates: Vec<Candidate> = request
        .candidates
        .into_iter()
        .map(|text| Ok(TextDocument::new(text)))
        .collect();
    let file_names = vec![None; candidates.len()];

    let response = run_match(&state, job, candidates, file_names, request.use_analysis).await?;
    Ok(Json(response))
}

/// POST /api/v1/match/upload
///
/// Multipart variant of `/match`. Fields:
/// - `job_description` (text) or `job_file` (PDF)
/// - `cv` (PDF, repeatable)
/// - `use_analysis` (optional, "true" to enable language-model analysis)
///
/// A CV whose text cannot be extracted is neither scored nor analysed: it gets
/// a zero score, a placeholder analysis and an `extraction_failed` failure.
pub async fn handle_match_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let mut job: Option<TextDocument> = None;
    let mut uploads: Vec<(Option<String>, Bytes)> = Vec::new();
    let mut use_analysis = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => {
                let text = field.text().await.map_err(invalid_field)?;
                job = Some(TextDocument::new(text));
            }
            "job_file" => {
                let data = field.bytes().await.map_err(invalid_field)?;
                job = Some(state.extractor.extract(data).await?);
            }
            "cv" => {
                let file_name = field.file_name().map(str::to_owned);
                let data = field.bytes().await.map_err(invalid_field)?;
                uploads.push((file_name, data));
            }
            "use_analysis" => {
                let raw = field.text().await.map_err(invalid_field)?;
                use_analysis = matches!(raw.trim(), "true" | "1" | "on");
            }
            other => warn!("Ignoring unknown multipart field '{other}'"),
        }
    }

    let job = job.ok_or(MatchError::EmptyJobDescription)?;

    let mut candidates = Vec::with_capacity(uploads.len());
    let mut file_names = Vec::with_capacity(uploads.len());
    for (index, (file_name, data)) in uploads.into_iter().enumerate() {
        let candidate = state.extractor.extract(data).await;
        if let Err(e) = &candidate {
            warn!(candidate_index = index, ?file_name, "CV extraction failed: {e}");
        }
        candidates.push(candidate);
        file_names.push(file_name);
    }

    let response = run_match(&state, job, candidates, file_names, use_analysis).await?;
    Ok(Json(response))
}

/// POST /api/v1/analysis/verify
///
/// Checks that the configured API key is accepted by the analysis service.
pub async fn handle_verify_key(
    State(state): State<AppState>,
) -> Result<Json<KeyVerification>, AppError> {
    let llm = state.llm.as_ref().ok_or_else(analysis_disabled)?;
    let verification = llm.verify().await?;
    info!(model = ?verification.model, "API key verified");
    Ok(Json(verification))
}

// ────────────────────────────────────────────────────────────────────────────
// Shared
// ────────────────────────────────────────────────────────────────────────────

async fn run_match(
    state: &AppState,
    job: TextDocument,
    candidates: Vec<Candidate>,
    file_names: Vec<Option<String>>,
    use_analysis: bool,
) -> Result<MatchResponse, AppError> {
    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        candidates = candidates.len(),
        use_analysis,
        job_language = %job.language(),
        "Starting matching run"
    );

    let (scorer_backend, results) = if use_analysis {
        let service = state.analysis.clone().ok_or_else(analysis_disabled)?;
        (
            ScorerBackend::Llm,
            rank_with_analysis(&job, &candidates, service).await?,
        )
    } else {
        (
            ScorerBackend::Lexical,
            rank(&job, &candidates, &state.vocabulary)?,
        )
    };

    let failed = results.iter().filter(|r| r.failure.is_some()).count();
    info!(%run_id, failed, "Matching run completed");

    let candidates = candidates
        .iter()
        .zip(file_names)
        .enumerate()
        .map(|(candidate_index, (candidate, file_name))| CandidateSummary {
            candidate_index,
            file_name,
            language: candidate
                .as_ref()
                .map(TextDocument::language)
                .unwrap_or_default(),
        })
        .collect();

    Ok(MatchResponse {
        run_id,
        scorer_backend,
        vocabulary: state.vocabulary.name().to_string(),
        job_language: job.language(),
        candidates,
        results,
        completed_at: Utc::now(),
    })
}

fn invalid_field(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart field: {e}"))
}

fn analysis_disabled() -> AppError {
    AppError::ServiceUnavailable("Analysis service is not configured".to_string())
}
