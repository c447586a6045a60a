//! Page fetching and readability extraction.

use dom_smoothie::Readability;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::{AppError, Result};

/// Fetches `url` and returns its main article text, truncated to `max_bytes`.
pub async fn extract(client: &Client, url: &Url, max_bytes: usize) -> Result<String> {
    info!(url = %url, "fetching page");
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::FetchFailed(format!(
            "server responded with {}",
            status
        )));
    }

    // Relative links resolve against wherever redirects landed.
    let final_url = response.url().to_string();
    let html = response.text().await?;
    debug!(bytes = html.len(), "read response body");

    let text = extract_text(&html, Some(&final_url), max_bytes)?;
    info!(bytes = text.len(), "extracted article text");
    Ok(text)
}

/// Runs readability over `html` and returns the trimmed, truncated text.
pub fn extract_text(html: &str, url: Option<&str>, max_bytes: usize) -> Result<String> {
    let mut readability =
        Readability::new(html, url, None).map_err(|e| AppError::ExtractionFailed(e.to_string()))?;

    let article = readability.parse().map_err(|e| {
        AppError::ExtractionFailed(format!(
            "site may require JavaScript or have no extractable text: {}",
            e
        ))
    })?;

    let text = article.text_content.trim();
    if text.is_empty() {
        return Err(AppError::ExtractionFailed(
            "no content extracted from URL".to_string(),
        ));
    }

    Ok(truncate_to_bytes(text, max_bytes).to_string())
}

/// Cuts `text` to at most `max_bytes`, backing off to a char boundary.
pub fn truncate_to_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
