pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod validate;

use std::sync::Arc;

use config::Config;
use error::Result;
use llm::Summarizer;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Client for the preflight and page fetches.
    pub http: reqwest::Client,
    pub summarizer: Arc<dyn Summarizer>,
}

impl AppState {
    pub fn new(config: Config, summarizer: Arc<dyn Summarizer>) -> Result<Self> {
        let http = client::page_client(&config)?;
        Ok(Self {
            config: Arc::new(config),
            http,
            summarizer,
        })
    }
}
