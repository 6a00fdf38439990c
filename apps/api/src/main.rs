mod config;
mod errors;
mod extraction;
mod llm_client;
mod matching;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::PdfTextExtractor;
use crate::llm_client::LlmClient;
use crate::matching::analysis::{AnalysisService, LlmAnalysisService};
use crate::matching::vocabulary::ControlledVocabulary;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Matcher v{}", env!("CARGO_PKG_VERSION"));

    // Load the controlled vocabulary (built-in unless VOCABULARY_PATH is set)
    let vocabulary = match &config.vocabulary_path {
        Some(path) => ControlledVocabulary::load(path)?,
        None => ControlledVocabulary::builtin(),
    };
    info!(
        "Vocabulary '{}' v{} loaded ({} terms)",
        vocabulary.name(),
        vocabulary.version(),
        vocabulary.len()
    );

    // Initialize LLM client (optional; analysis is disabled without a key)
    let llm = match config.llm_settings() {
        Some(settings) => {
            let client = LlmClient::new(settings)?;
            info!("LLM client initialized (model: {})", client.model());
            Some(client)
        }
        None => {
            warn!("OPENAI_API_KEY not set, language-model analysis disabled");
            None
        }
    };
    let analysis = llm
        .clone()
        .map(|client| Arc::new(LlmAnalysisService(client)) as Arc<dyn AnalysisService>);

    // Build app state
    let state = AppState {
        config: config.clone(),
        vocabulary: Arc::new(vocabulary),
        llm,
        analysis,
        extractor: Arc::new(PdfTextExtractor),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
