use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Preflight rejection threshold for a declared `Content-Length` (10 MiB).
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 10 * 1024 * 1024;

/// Truncation budget for extracted article text (8 KiB).
pub const DEFAULT_MAX_EXTRACT_BYTES: usize = 8 * 1024;

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub max_content_length: u64,
    pub max_extract_bytes: usize,
    pub preflight_strip_query: bool,
    /// Disables TLS certificate verification on every outbound call.
    pub danger_accept_invalid_certs: bool,
    pub fetch_timeout: Duration,
    pub llm_timeout: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("OPENAI_API_KEY environment variable is required".to_string())
            })?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;
        let port: u16 = parse_or(&lookup, "PORT", 8080)?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openai_api_key,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: lookup("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            max_content_length: parse_or(
                &lookup,
                "MAX_CONTENT_LENGTH_BYTES",
                DEFAULT_MAX_CONTENT_LENGTH,
            )?,
            max_extract_bytes: parse_or(&lookup, "MAX_EXTRACT_BYTES", DEFAULT_MAX_EXTRACT_BYTES)?,
            preflight_strip_query: parse_or(&lookup, "PREFLIGHT_STRIP_QUERY", true)?,
            danger_accept_invalid_certs: parse_or(&lookup, "DANGER_ACCEPT_INVALID_CERTS", false)?,
            fetch_timeout: Duration::from_secs(parse_or(&lookup, "FETCH_TIMEOUT_SECS", 10)?),
            llm_timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 60)?),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 90)?),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("max_content_length", &self.max_content_length)
            .field("max_extract_bytes", &self.max_extract_bytes)
            .field("preflight_strip_query", &self.preflight_strip_query)
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("llm_timeout", &self.llm_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e))),
        _ => Ok(default),
    }
}
