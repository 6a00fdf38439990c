//! Controlled vocabulary — the named, versioned list of skill terms the
//! extractor recognises.
//!
//! The built-in asset covers programming languages, web frameworks, databases,
//! cloud/devops tooling, frontend tooling, test frameworks, methodologies, soft
//! skills and a few generic terms. A replacement can be loaded from a JSON file
//! (`VOCABULARY_PATH`) without touching any scoring code:
//!
//! ```json
//! { "name": "data-roles", "version": "2", "terms": ["python", "spark", "sql"] }
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const BUILTIN_NAME: &str = "default-tech";
pub const BUILTIN_VERSION: &str = "1";

const BUILTIN_TERMS: &[&str] = &[
    // Programming languages
    "javascript", "python", "java", "c++", "c#", "ruby", "php", "swift", "kotlin", "go", "rust",
    // Web
    "react", "angular", "vue", "next.js", "node.js", "express", "django", "flask", "spring",
    "laravel",
    // Databases
    "sql", "mysql", "postgresql", "mongodb", "redis", "cassandra", "elasticsearch",
    // Cloud & DevOps
    "aws", "azure", "gcp", "docker", "kubernetes", "jenkins", "git", "ci/cd", "terraform",
    // Frontend
    "html", "css", "sass", "less", "typescript", "redux", "graphql", "webpack", "babel",
    // Testing
    "jest", "mocha", "cypress", "selenium", "junit", "pytest",
    // Methodologies
    "agile", "scrum", "kanban", "waterfall",
    // Soft skills
    "leadership", "communication", "teamwork", "problem-solving", "time management",
    // Other
    "rest", "api", "microservices", "machine learning", "ai", "data science", "big data",
    "analytics",
];

/// An ordered, de-duplicated list of lowercase skill terms.
///
/// Term order is preserved for display only; every term carries equal weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlledVocabulary {
    name: String,
    version: String,
    terms: Vec<String>,
}

#[derive(Deserialize)]
struct VocabularyFile {
    name: String,
    #[serde(default = "default_version")]
    version: String,
    terms: Vec<String>,
}

fn default_version() -> String {
    "1".to_string()
}

impl ControlledVocabulary {
    /// Builds a vocabulary, lowercasing and trimming terms and dropping blanks
    /// and duplicates. Fails if no term survives.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        terms: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self> {
        let name = name.into();
        let mut normalized: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !normalized.contains(&term) {
                normalized.push(term);
            }
        }

        if normalized.is_empty() {
            bail!("vocabulary '{name}' contains no terms");
        }

        Ok(Self {
            name,
            version: version.into(),
            terms: normalized,
        })
    }

    /// The vocabulary shipped with the service.
    pub fn builtin() -> Self {
        Self {
            name: BUILTIN_NAME.to_string(),
            version: BUILTIN_VERSION.to_string(),
            terms: BUILTIN_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: VocabularyFile =
            serde_json::from_str(json).context("vocabulary file is not valid JSON")?;
        Self::new(file.name, file.version, file.terms)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read vocabulary file {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to load vocabulary from {}", path.display()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

impl Default for ControlledVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}
