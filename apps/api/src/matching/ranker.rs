//! Batch ranking — scores every candidate against one job description and
//! returns the results sorted by match percentage, best first.
//!
//! Only an empty job description or an empty candidate list aborts a run.
//! Any other failure is confined to its candidate, which receives a zero score,
//! a placeholder analysis carrying the error message and a structured failure.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::matching::aggregator::{aggregate_breakdown, ScoreBreakdown};
use crate::matching::analysis::{clamp_percentage, AnalysisService, MatchAnalysis};
use crate::matching::document::TextDocument;
use crate::matching::error::{CandidateFailure, MatchError};
use crate::matching::vocabulary::ControlledVocabulary;

/// Which scorer produced a run's percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerBackend {
    Lexical,
    Llm,
}

/// Score of one candidate. `candidate_index` is the candidate's position in
/// the input, whatever its position in the sorted output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub candidate_index: usize,
    pub match_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MatchAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CandidateFailure>,
}

impl MatchResult {
    /// Zero-score substitute for a candidate whose attempt failed.
    pub fn failed(candidate_index: usize, error: &MatchError) -> Self {
        let failure = error.to_candidate_failure();
        Self {
            candidate_index,
            match_percentage: 0.0,
            analysis: Some(MatchAnalysis::failed(failure.message.clone())),
            breakdown: None,
            failure: Some(failure),
        }
    }
}

/// A candidate CV as handed to the ranker: its text, or the error that kept
/// its text from being read. Errored candidates are never scored.
pub type Candidate = Result<TextDocument, MatchError>;

/// Rejects the two conditions that abort a whole run.
pub fn check_batch(job: &TextDocument, candidates: &[Candidate]) -> Result<(), MatchError> {
    if job.is_blank() {
        return Err(MatchError::EmptyJobDescription);
    }
    if candidates.is_empty() {
        return Err(MatchError::NoCandidates);
    }
    Ok(())
}

/// Ranks candidates with the deterministic lexical aggregator.
pub fn rank(
    job: &TextDocument,
    candidates: &[Candidate],
    vocabulary: &ControlledVocabulary,
) -> Result<Vec<MatchResult>, MatchError> {
    check_batch(job, candidates)?;

    let results = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let scored = candidate
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|cv| aggregate_breakdown(job, cv, vocabulary));
            match scored {
                Ok(breakdown) => MatchResult {
                    candidate_index: index,
                    match_percentage: clamp_percentage(breakdown.score),
                    analysis: None,
                    breakdown: Some(breakdown),
                    failure: None,
                },
                Err(e) => {
                    warn!(candidate_index = index, "Scoring CV failed: {e}");
                    MatchResult::failed(index, &e)
                }
            }
        })
        .collect();

    Ok(sort_descending(results))
}

/// Ranks candidates through the analysis service, one concurrent request per
/// candidate. Completes once every request has succeeded or been substituted.
///
/// Dropping the returned future aborts every request still in flight.
pub async fn rank_with_analysis(
    job: &TextDocument,
    candidates: &[Candidate],
    service: Arc<dyn AnalysisService>,
) -> Result<Vec<MatchResult>, MatchError> {
    check_batch(job, candidates)?;

    let mut slots: Vec<Option<MatchResult>> = vec![None; candidates.len()];
    let job_text: Arc<str> = Arc::from(job.text());
    let mut tasks = JoinSet::new();
    for (index, candidate) in candidates.iter().enumerate() {
        match candidate {
            Ok(cv) => {
                let service = Arc::clone(&service);
                let job_text = Arc::clone(&job_text);
                let cv_text = cv.text().to_owned();
                tasks.spawn(async move { (index, service.analyze(&job_text, &cv_text).await) });
            }
            Err(e) => slots[index] = Some(MatchResult::failed(index, e)),
        }
    }

    info!(
        candidates = candidates.len(),
        requests = tasks.len(),
        "Requesting analysis for each CV"
    );

    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                // The index is lost with the task; its slot is filled below.
                warn!("Analysis task did not complete: {e}");
                continue;
            }
        };

        slots[index] = Some(match outcome {
            Ok(analysis) => MatchResult {
                candidate_index: index,
                match_percentage: clamp_percentage(analysis.match_percentage),
                analysis: Some(analysis),
                breakdown: None,
                failure: None,
            },
            Err(e) => {
                warn!(candidate_index = index, "Analysis of CV failed: {e}");
                MatchResult::failed(index, &e)
            }
        });
    }

    let results = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                MatchResult::failed(
                    index,
                    &MatchError::AnalysisServiceUnavailable(
                        "analysis task did not complete".to_string(),
                    ),
                )
            })
        })
        .collect();

    Ok(sort_descending(results))
}

/// Sorts by match percentage, highest first. Equal scores keep no particular
/// order.
fn sort_descending(mut results: Vec<MatchResult>) -> Vec<MatchResult> {
    results.sort_by(|a, b| b.match_percentage.total_cmp(&a.match_percentage));
    results
}
