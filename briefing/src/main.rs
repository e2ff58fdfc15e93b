use std::sync::Arc;
use tracing::info;

mod agents;
mod api;
mod config;
mod error;
mod metrics;
mod middleware;
mod models;

use agents::action::ActionAgent;
use agents::llm::OllamaClient;
use agents::reader::ReaderAgent;
use agents::retriever::RetrieverAgent;
use agents::summarizer::SummarizerAgent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level))
        )
        .json()
        .init();

    info!("Starting Research Briefing tool server");
    info!("Token: {}", config.masked_token());
    info!(
        "Google API: {}",
        if config.google_configured() { "configured" } else { "NOT CONFIGURED" }
    );
    info!("Ollama: {} (model: {})", config.ollama_base_url, config.ollama_model);
    info!("Output dir: {}", config.output_dir.display());

    let generator = Arc::new(OllamaClient::from_config(&config)?);
    let state = api::AppState {
        search: Arc::new(RetrieverAgent::from_config(&config)?),
        reader: ReaderAgent::new()?,
        summarizer: SummarizerAgent::new(generator),
        action: ActionAgent::new(config.output_dir.clone()),
        metrics: metrics::Metrics::new()?,
    };
    info!("Agents initialized, saving briefs to {}", state.action.output_dir().display());

    let routes = api::app(state, Arc::from(config.token.as_str()));

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes)
        .run(addr)
        .await;

    Ok(())
}
