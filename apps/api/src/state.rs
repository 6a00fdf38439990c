use std::sync::Arc;

use crate::config::Config;
use crate::extraction::DocumentExtractor;
use crate::llm_client::LlmClient;
use crate::matching::analysis::AnalysisService;
use crate::matching::vocabulary::ControlledVocabulary;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Vocabulary used by the lexical scorer. Loaded once at startup.
    pub vocabulary: Arc<ControlledVocabulary>,
    /// Raw client, kept for key verification. `None` when no API key is configured.
    pub llm: Option<LlmClient>,
    /// Pluggable analysis backend. `None` disables the enrichment path.
    pub analysis: Option<Arc<dyn AnalysisService>>,
    /// Pluggable document extractor. Default: PdfTextExtractor.
    pub extractor: Arc<dyn DocumentExtractor>,
}
