use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::llm::provider::LLMProvider;

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[async_trait]
impl LLMProvider for ClaudeProvider {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        tracing::debug!("Sending ~{} tokens to Claude", prompt.len() / 4);

        let request_body = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 512,
            system: Some(system.to_string()),
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout
                } else {
                    Error::Network(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(Error::RateLimited(retry_after));
        }
        // 529 is Anthropic's "overloaded".
        if status.is_server_error() || status.as_u16() == 529 {
            return Err(Error::ProviderUnavailable(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LLMApi(format!(
                "Claude API error ({}): {}",
                status, body
            )));
        }

        let result: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedOutput(format!("Failed to parse Claude response: {}", e)))?;

        if let Some(error) = result.error {
            return Err(Error::LLMApi(error.message));
        }

        Ok(result
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join(""))
    }

    fn name(&self) -> &str {
        "Claude"
    }
}
