//! Skill extraction — which vocabulary terms appear as whole tokens in a text.
//!
//! Membership is tested per whitespace token, so a multi-word term such as
//! "machine learning" is never found in running text. This mirrors the
//! behaviour the scores were calibrated against and is left as is.

use std::collections::HashSet;

use serde::Serialize;

use crate::matching::tokenize::token_set;
use crate::matching::vocabulary::ControlledVocabulary;

/// Vocabulary terms found in a document, in vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillSet(Vec<String>);

impl SkillSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.iter().any(|t| t == term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Terms of `self` also present in `other`.
    pub fn shared_with(&self, other: &SkillSet) -> Vec<String> {
        self.0
            .iter()
            .filter(|t| other.contains(t))
            .cloned()
            .collect()
    }

    /// Terms of `self` absent from `other`.
    pub fn missing_from(&self, other: &SkillSet) -> Vec<String> {
        self.0
            .iter()
            .filter(|t| !other.contains(t))
            .cloned()
            .collect()
    }
}

/// Returns the subset of `vocabulary` present as exact tokens in `text`.
pub fn extract(text: &str, vocabulary: &ControlledVocabulary) -> SkillSet {
    let tokens: HashSet<String> = token_set(text);
    SkillSet(
        vocabulary
            .terms()
            .iter()
            .filter(|term| tokens.contains(term.as_str()))
            .cloned()
            .collect(),
    )
}
