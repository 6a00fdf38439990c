//! Language detection: a binary English/French guess from stop-word counts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matching::tokenize::tokenize;

const FRENCH_STOP_WORDS: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "et", "est", "dans", "pour",
];

const ENGLISH_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "is", "in", "for", "to", "of", "with",
];

/// Coarse language tag of a document. Informational only; scoring ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    French,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => f.write_str("English"),
            Language::French => f.write_str("French"),
        }
    }
}

/// Classifies `text` as French only when French stop words strictly outnumber
/// English ones. Ties (including empty text) resolve to English.
pub fn detect(text: &str) -> Language {
    let (french, english) = tokenize(text)
        .iter()
        .fold((0usize, 0usize), |(fr, en), token| {
            (
                fr + usize::from(FRENCH_STOP_WORDS.contains(&token.as_str())),
                en + usize::from(ENGLISH_STOP_WORDS.contains(&token.as_str())),
            )
        });

    if french > english {
        Language::French
    } else {
        Language::English
    }
}
