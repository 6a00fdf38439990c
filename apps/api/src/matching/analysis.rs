//! Analysis service: optional language-model enrichment of a match.
//!
//! `AppState` carries an `Option<Arc<dyn AnalysisService>>`; when it is `None`
//! only the lexical scorer is available.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llm_client::{LlmClient, LlmError};
use crate::matching::error::MatchError;
use crate::matching::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSkillsMatch {
    #[serde(default)]
    pub matching: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceMatch {
    #[serde(default)]
    pub relevant_experience: Vec<String>,
    #[serde(default)]
    pub score: f64,
}

/// Structured assessment returned by the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAnalysis {
    pub match_percentage: f64,
    #[serde(default)]
    pub technical_skills_match: TechnicalSkillsMatch,
    #[serde(default)]
    pub experience_match: ExperienceMatch,
    #[serde(default)]
    pub overall_analysis: String,
}

impl MatchAnalysis {
    /// Zeroed placeholder substituted for a failed candidate; the message ends
    /// up in `overall_analysis`.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            overall_analysis: message.into(),
            ..Self::default()
        }
    }

    /// Forces every score into [0, 100]; NaN becomes 0.
    pub fn sanitized(mut self) -> Self {
        self.match_percentage = clamp_percentage(self.match_percentage);
        self.technical_skills_match.score = clamp_percentage(self.technical_skills_match.score);
        self.experience_match.score = clamp_percentage(self.experience_match.score);
        self
    }
}

pub fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// The analysis service trait. Implement this to swap enrichment backends
/// without touching the ranker or the handlers.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(
        &self,
        job_description: &str,
        cv_text: &str,
    ) -> Result<MatchAnalysis, MatchError>;
}

/// Language-model analysis through the shared `LlmClient`.
pub struct LlmAnalysisService(pub LlmClient);

#[async_trait]
impl AnalysisService for LlmAnalysisService {
    async fn analyze(
        &self,
        job_description: &str,
        cv_text: &str,
    ) -> Result<MatchAnalysis, MatchError> {
        let prompt = build_analysis_prompt(job_description, cv_text);
        let analysis: MatchAnalysis = self.0.call_json(&prompt, ANALYSIS_SYSTEM).await?;
        Ok(analysis.sanitized())
    }
}

impl From<LlmError> for MatchError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Unauthorized { .. } => MatchError::AnalysisServiceUnauthorized,
            LlmError::RateLimited { retries } => MatchError::AnalysisServiceRateLimited { retries },
            LlmError::ResponseParse(msg) => MatchError::ResponseParseFailed(msg),
            LlmError::EmptyContent => {
                MatchError::ResponseParseFailed("response contained no content".to_string())
            }
            LlmError::Timeout => {
                MatchError::AnalysisServiceUnavailable("request timed out".to_string())
            }
            LlmError::Unavailable(msg) => MatchError::AnalysisServiceUnavailable(msg),
            other @ (LlmError::Http(_) | LlmError::Api { .. }) => {
                MatchError::AnalysisServiceUnavailable(other.to_string())
            }
        }
    }
}
