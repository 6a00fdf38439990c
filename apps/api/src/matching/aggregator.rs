//! Match aggregation: blends skill overlap and lexical overlap into a single
//! percentage.
//!
//! Algorithm:
//! 1. Extract job skills; if none, the score is 0 (nothing to measure against).
//! 2. skill_score = |job ∩ candidate skills| / |job skills| × 100
//! 3. text_score  = lexical similarity of the two texts (job denominator)
//! 4. score       = skill_score × 0.7 + text_score × 0.3, clamped to [0, 100]

use serde::Serialize;
use tracing::warn;

use crate::matching::document::TextDocument;
use crate::matching::error::MatchError;
use crate::matching::similarity::similarity;
use crate::matching::skills::extract;
use crate::matching::vocabulary::ControlledVocabulary;

pub const SKILL_WEIGHT: f64 = 0.7;
pub const TEXT_WEIGHT: f64 = 0.3;

/// A lexical score together with the parts it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub skill_score: f64,
    pub text_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Computes the full breakdown. Fails only if the arithmetic produces a
/// non-finite value.
pub fn aggregate_breakdown(
    job: &TextDocument,
    candidate: &TextDocument,
    vocabulary: &ControlledVocabulary,
) -> Result<ScoreBreakdown, MatchError> {
    let job_skills = extract(job.text(), vocabulary);
    if job_skills.is_empty() {
        return Ok(ScoreBreakdown::default());
    }

    let candidate_skills = extract(candidate.text(), vocabulary);
    let matched_skills = job_skills.shared_with(&candidate_skills);
    let missing_skills = job_skills.missing_from(&candidate_skills);

    let skill_score = matched_skills.len() as f64 / job_skills.len() as f64 * 100.0;
    let text_score = similarity(job.text(), candidate.text());
    let raw = skill_score * SKILL_WEIGHT + text_score * TEXT_WEIGHT;

    if !raw.is_finite() {
        return Err(MatchError::ScoringFailed(format!(
            "non-finite score (skill={skill_score}, text={text_score})"
        )));
    }

    Ok(ScoreBreakdown {
        score: raw.clamp(0.0, 100.0),
        skill_score,
        text_score,
        matched_skills,
        missing_skills,
    })
}

/// Match percentage of `candidate` against `job`, always in [0, 100].
/// Any internal failure is logged and scored as 0.
pub fn aggregate(
    job: &TextDocument,
    candidate: &TextDocument,
    vocabulary: &ControlledVocabulary,
) -> f64 {
    match aggregate_breakdown(job, candidate, vocabulary) {
        Ok(breakdown) => breakdown.score,
        Err(e) => {
            warn!("Lexical scoring failed, scoring as 0: {e}");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = "Looking for a python developer with aws and docker experience";
    const GOOD_CV: &str = "Experienced python developer, used docker daily";
    const UNRELATED_CV: &str = "Pastry chef specialised in croissants";

    fn vocab() -> ControlledVocabulary {
        ControlledVocabulary::builtin()
    }

    #[test]
    fn test_reference_example_skill_score_two_of_three() {
        let job = TextDocument::new(JOB);
        let cv = TextDocument::new(GOOD_CV);

        let breakdown = aggregate_breakdown(&job, &cv, &vocab()).unwrap();
        assert!((breakdown.skill_score - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(breakdown.matched_skills, vec!["python", "docker"]);
        assert_eq!(breakdown.missing_skills, vec!["aws"]);
        assert!(breakdown.text_score > 0.0);
        assert!(breakdown.score > 0.0 && breakdown.score < 100.0);

        let expected = breakdown.skill_score * 0.7 + breakdown.text_score * 0.3;
        assert!((breakdown.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_matching_candidate_beats_unrelated_candidate() {
        let job = TextDocument::new(JOB);
        let good = aggregate(&job, &TextDocument::new(GOOD_CV), &vocab());
        let bad = aggregate(&job, &TextDocument::new(UNRELATED_CV), &vocab());
        assert!(good > bad, "good={good}, bad={bad}");
        assert_eq!(bad, 0.0);
    }

    #[test]
    fn test_job_without_known_skills_scores_zero() {
        let job = TextDocument::new("We need someone friendly and punctual");
        let cv = TextDocument::new("We need someone friendly and punctual");
        assert_eq!(aggregate(&job, &cv, &vocab()), 0.0);
    }

    #[test]
    fn test_empty_candidate_scores_zero() {
        let job = TextDocument::new(JOB);
        assert_eq!(aggregate(&job, &TextDocument::new(""), &vocab()), 0.0);
    }

    #[test]
    fn test_identical_texts_score_100() {
        let job = TextDocument::new(JOB);
        let score = aggregate(&job, &job.clone(), &vocab());
        assert!((score - 100.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_score_always_within_bounds() {
        let job = TextDocument::new("rust go python sql aws docker kubernetes");
        let cvs = [
            "",
            "rust",
            "rust go python sql aws docker kubernetes terraform react",
            "RUST GO PYTHON",
            "le la les",
        ];
        for cv in cvs {
            let score = aggregate(&job, &TextDocument::new(cv), &vocab());
            assert!((0.0..=100.0).contains(&score), "{cv:?} scored {score}");
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((SKILL_WEIGHT + TEXT_WEIGHT - 1.0).abs() < f64::EPSILON);
    }
}
