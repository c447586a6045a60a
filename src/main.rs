use std::sync::Arc;

use tldr_api::{AppState, api::routes::create_router, config::Config, llm::OpenAiClient};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Missing OPENAI_API_KEY stops startup here
    let config = Config::load()?;
    let server_addr = config.server_addr;
    if config.danger_accept_invalid_certs {
        warn!("DANGER_ACCEPT_INVALID_CERTS is set: TLS certificate verification is disabled");
    }

    let summarizer = Arc::new(OpenAiClient::from_config(&config)?);
    info!(
        model = %config.openai_model,
        max_content_length = config.max_content_length,
        max_extract_bytes = config.max_extract_bytes,
        "initialized summarizer"
    );

    let app_state = AppState::new(config, summarizer)?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!(%server_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
