use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client;
use crate::config::Config;
use crate::error::{AppError, Result};

pub const SYSTEM_PROMPT: &str = "You are a master headline writer. Provide a one-sentence headline \
     and 3 bullet takeaway points, total < 280 chars.";

const TEMPERATURE: f32 = 0.5;

const MIN_BULLETS: usize = 3;

/// Minimum line count of a usable completion: one headline plus three bullets.
const MIN_COMPLETION_LINES: usize = 1 + MIN_BULLETS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub headline: String,
    pub bullets: Vec<String>,
}

/// Turns extracted article text into a headline and bullet points.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<Summary>;
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Chat-completion client for OpenAI-compatible providers.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        http: Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            client::llm_client(config)?,
            &config.openai_api_key,
            &config.openai_base_url,
            &config.openai_model,
        ))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn summarize(&self, text: &str) -> Result<Summary> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: text,
                },
            ],
            temperature: TEMPERATURE,
        };

        info!(model = %self.model, input_bytes = text.len(), "requesting chat completion");
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::SummarizationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(AppError::SummarizationFailed(format!(
                "provider returned {}: {}",
                status, message
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::SummarizationFailed(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(AppError::EmptyCompletion)?;
        debug!(completion = %content, "received completion");

        parse_completion(&content)
    }
}

/// Parses the `Headline: ...` line followed by `- ` bullet lines.
pub fn parse_completion(content: &str) -> Result<Summary> {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() < MIN_COMPLETION_LINES {
        return Err(AppError::MalformedCompletion(format!(
            "expected a headline and 3 bullets, got {} line(s)",
            lines.len()
        )));
    }

    let first = lines[0].trim();
    let headline = first
        .strip_prefix("Headline:")
        .unwrap_or(first)
        .trim()
        .to_string();

    if headline.is_empty() {
        return Err(AppError::MalformedCompletion(
            "completion has an empty headline".to_string(),
        ));
    }

    let bullets: Vec<String> = lines[1..]
        .iter()
        .filter_map(|line| line.trim().strip_prefix("- "))
        .map(str::to_string)
        .collect();

    if bullets.len() < MIN_BULLETS {
        return Err(AppError::MalformedCompletion(format!(
            "expected at least {} bullets, got {}",
            MIN_BULLETS,
            bullets.len()
        )));
    }

    Ok(Summary { headline, bullets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    async fn provider(template: ResponseTemplate) -> (MockServer, OpenAiClient) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        let client = OpenAiClient::new(
            Client::new(),
            "test-key",
            format!("{}/v1/", mock_server.uri()),
            "gpt-3.5-turbo",
        );
        (mock_server, client)
    }

    #[test]
    fn test_parse_completion() {
        let summary = parse_completion("Headline: X\n- A\n- B\n- C").unwrap();
        assert_eq!(summary.headline, "X");
        assert_eq!(summary.bullets, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_parse_completion_without_prefix() {
        let summary =
            parse_completion("Markets rally on rate cut\r\n- Stocks up\r\n  - Bonds down\r\n- Dollar flat")
                .unwrap();
        assert_eq!(summary.headline, "Markets rally on rate cut");
        assert_eq!(summary.bullets, vec!["Stocks up", "Bonds down", "Dollar flat"]);
    }

    #[test]
    fn test_parse_completion_skips_non_bullets() {
        let summary = parse_completion("Headline: X\n\n- A\nnote\n- B\n* C\n- D").unwrap();
        assert_eq!(summary.bullets, vec!["A", "B", "D"]);
    }

    #[test]
    fn test_parse_completion_too_few_lines() {
        for content in ["Test Headline", "Headline: X\n- A\n- B"] {
            let err = parse_completion(content).unwrap_err();
            assert!(matches!(err, AppError::MalformedCompletion(_)));
        }
    }

    #[test]
    fn test_parse_completion_rejects_partial_summary() {
        for content in [
            "Headline: X\nfoo\nbar\nbaz",
            "  \n \n \n ",
            "Headline: X\n- A\n\n",
            "Headline: X\n- A\n- B\nbaz",
            "Headline: \n- A\n- B\n- C",
        ] {
            let err = parse_completion(content).unwrap_err();
            assert!(
                matches!(err, AppError::MalformedCompletion(_)),
                "{content:?} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_summarize_sends_prompt() {
        let (server, client) = provider(
            ResponseTemplate::new(200).set_body_json(completion(
                "Headline: Test Headline\n- Point 1\n- Point 2\n- Point 3",
            )),
        )
        .await;

        let summary = client.summarize("Test article content").await.unwrap();
        assert_eq!(summary.headline, "Test Headline");
        assert_eq!(summary.bullets, vec!["Point 1", "Point 2", "Point 3"]);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(
            body["messages"][0]["content"]
                .as_str()
                .unwrap()
                .contains("master headline writer")
        );
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Test article content");
    }

    #[tokio::test]
    async fn test_summarize_provider_error() {
        let (_server, client) = provider(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached", "type": "requests" }
        })))
        .await;

        let err = client.summarize("text").await.unwrap_err();
        assert!(matches!(err, AppError::SummarizationFailed(_)));
        assert!(err.to_string().contains("Rate limit reached"));
    }

    #[tokio::test]
    async fn test_summarize_no_choices() {
        let (_server, client) =
            provider(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] }))).await;

        let err = client.summarize("text").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_summarize_empty_content() {
        let (_server, client) =
            provider(ResponseTemplate::new(200).set_body_json(completion(""))).await;

        let err = client.summarize("text").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_summarize_malformed_completion() {
        let (_server, client) =
            provider(ResponseTemplate::new(200).set_body_json(completion("Test Headline"))).await;

        let err = client.summarize("text").await.unwrap_err();
        assert!(matches!(err, AppError::MalformedCompletion(_)));
    }

    #[tokio::test]
    async fn test_summarize_unreachable_provider() {
        let client = OpenAiClient::new(Client::new(), "test-key", "http://127.0.0.1:1/v1", "m");
        let err = client.summarize("text").await.unwrap_err();
        assert!(matches!(err, AppError::SummarizationFailed(_)));
    }
}
