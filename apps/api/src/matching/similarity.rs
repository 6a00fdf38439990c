//! Lexical similarity: how much of the job description's vocabulary the
//! candidate text echoes back.

use crate::matching::tokenize::token_set;

/// `|tokens(job) ∩ tokens(candidate)| / |tokens(job)| * 100`, over sets of
/// unique lowercase whitespace tokens.
///
/// Asymmetric: the denominator is always the job text's token set. Returns 0
/// when the job text has no tokens.
pub fn similarity(job_text: &str, candidate_text: &str) -> f64 {
    let job_tokens = token_set(job_text);
    if job_tokens.is_empty() {
        return 0.0;
    }
    let candidate_tokens = token_set(candidate_text);
    let common = job_tokens.intersection(&candidate_tokens).count();

    (common as f64 / job_tokens.len() as f64 * 100.0).clamp(0.0, 100.0)
}
