use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the matching engine and its collaborators.
///
/// `EmptyJobDescription` and `NoCandidates` abort a whole ranking run. Every
/// other variant is scoped to one document or candidate and is turned into a
/// zero-score result by the ranker.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    #[error("Job description is empty")]
    EmptyJobDescription,

    #[error("No candidate CVs provided")]
    NoCandidates,

    #[error("Failed to extract text from document: {0}")]
    ExtractionFailed(String),

    #[error("Failed to parse analysis response: {0}")]
    ResponseParseFailed(String),

    #[error("Analysis service rejected the API key")]
    AnalysisServiceUnauthorized,

    #[error("Analysis service rate limit exceeded after {retries} attempts")]
    AnalysisServiceRateLimited { retries: u32 },

    #[error("Analysis service unavailable: {0}")]
    AnalysisServiceUnavailable(String),

    #[error("Scoring failed: {0}")]
    ScoringFailed(String),
}

/// Machine-readable kind of a per-candidate failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ExtractionFailed,
    ResponseParseFailed,
    AnalysisServiceUnauthorized,
    AnalysisServiceRateLimited,
    AnalysisServiceUnavailable,
    ScoringFailed,
}

/// Why a candidate ended up with a substituted zero score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl MatchError {
    /// The per-candidate failure kind, or `None` for batch-level errors.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            MatchError::EmptyJobDescription | MatchError::NoCandidates => None,
            MatchError::ExtractionFailed(_) => Some(FailureKind::ExtractionFailed),
            MatchError::ResponseParseFailed(_) => Some(FailureKind::ResponseParseFailed),
            MatchError::AnalysisServiceUnauthorized => {
                Some(FailureKind::AnalysisServiceUnauthorized)
            }
            MatchError::AnalysisServiceRateLimited { .. } => {
                Some(FailureKind::AnalysisServiceRateLimited)
            }
            MatchError::AnalysisServiceUnavailable(_) => {
                Some(FailureKind::AnalysisServiceUnavailable)
            }
            MatchError::ScoringFailed(_) => Some(FailureKind::ScoringFailed),
        }
    }

    /// Converts a per-candidate error into its structured form. Batch-level
    /// errors never reach a single candidate; they map to `ScoringFailed`.
    pub fn to_candidate_failure(&self) -> CandidateFailure {
        CandidateFailure {
            kind: self.failure_kind().unwrap_or(FailureKind::ScoringFailed),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_errors_have_no_failure_kind() {
        assert_eq!(MatchError::EmptyJobDescription.failure_kind(), None);
        assert_eq!(MatchError::NoCandidates.failure_kind(), None);
    }

    #[test]
    fn test_candidate_failure_carries_kind_and_message() {
        let failure = MatchError::AnalysisServiceRateLimited { retries: 3 }.to_candidate_failure();
        assert_eq!(failure.kind, FailureKind::AnalysisServiceRateLimited);
        assert!(failure.message.contains("3 attempts"));
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::ResponseParseFailed).unwrap();
        assert_eq!(json, r#""response_parse_failed""#);
    }
}
