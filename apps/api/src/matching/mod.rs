// Matching engine: language detection, skill extraction, lexical scoring,
// aggregation and batch ranking, plus the optional language-model analysis path.
// All LLM calls go through llm_client; no direct API calls here.

pub mod aggregator;
pub mod analysis;
pub mod document;
pub mod error;
pub mod handlers;
pub mod language;
pub mod prompts;
pub mod ranker;
pub mod similarity;
pub mod skills;
pub mod tokenize;
pub mod vocabulary;
