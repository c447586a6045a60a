use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::config::Config;
use crate::error::{AppError, Result};

/// User-Agent sent with every outbound page request. Some origins block
/// requests without one.
pub const USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; tldr-api/", env!("CARGO_PKG_VERSION"), ")");

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client used for the preflight HEAD and the page GET.
pub fn page_client(config: &Config) -> Result<Client> {
    builder(config.danger_accept_invalid_certs)
        .user_agent(USER_AGENT)
        .timeout(config.fetch_timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Client used for chat-completion calls.
pub fn llm_client(config: &Config) -> Result<Client> {
    builder(config.danger_accept_invalid_certs)
        .timeout(config.llm_timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build LLM HTTP client: {}", e)))
}

fn builder(accept_invalid_certs: bool) -> ClientBuilder {
    ClientBuilder::new()
        .connect_timeout(CONNECT_TIMEOUT)
        .danger_accept_invalid_certs(accept_invalid_certs)
}
