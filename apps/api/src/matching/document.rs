use serde::Serialize;

use crate::matching::language::{detect, Language};

/// Plain text of a job description or CV, tagged with its detected language.
///
/// The language is always derived from the text; there is no way to set it
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextDocument {
    text: String,
    language: Language,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let language = detect(&text);
        Self { text, language }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// True when the text is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<String> for TextDocument {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for TextDocument {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
