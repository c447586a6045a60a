//! URL validation: syntax, HTTPS-only policy and a preflight size check.

use reqwest::{Client, header::CONTENT_LENGTH};
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Largest declared `Content-Length` accepted by the preflight check.
    pub max_content_length: u64,
    /// Drop the query string from the preflight HEAD target.
    pub strip_query: bool,
}

impl From<&Config> for ValidationOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_content_length: config.max_content_length,
            strip_query: config.preflight_strip_query,
        }
    }
}

/// Parses `raw`, enforces HTTPS and runs the preflight HEAD request.
///
/// The returned URL is the one the caller should fetch; it keeps its query
/// string even when the preflight target had it stripped.
pub async fn validate_url(raw: &str, client: &Client, options: &ValidationOptions) -> Result<Url> {
    let url = parse_url(raw)?;
    preflight(&url, client, options).await?;
    Ok(url)
}

pub fn parse_url(raw: &str) -> Result<Url> {
    debug!(url = raw, "validating URL");
    let url = Url::parse(raw).map_err(|e| AppError::MalformedUrl(e.to_string()))?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::MalformedUrl("URL must include a host".to_string()));
    }
    if url.scheme() != "https" {
        return Err(AppError::SchemeRejected);
    }

    Ok(url)
}

/// Issues a HEAD request and rejects resources whose declared length exceeds
/// the configured maximum. A missing or unparseable header skips the check.
pub async fn preflight(url: &Url, client: &Client, options: &ValidationOptions) -> Result<()> {
    let mut target = url.clone();
    if options.strip_query {
        target.set_query(None);
    }

    debug!(url = %target, "sending preflight HEAD request");
    let response = client.head(target).send().await?;

    let declared = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    info!(
        status = %response.status(),
        content_length = ?declared,
        max = options.max_content_length,
        "preflight complete"
    );

    match declared {
        Some(actual) if actual > options.max_content_length => Err(AppError::ContentTooLarge {
            actual,
            max: options.max_content_length,
        }),
        _ => Ok(()),
    }
}
