use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::config::llm::LlmConfig;

const RATE_LIMIT_CODE: i64 = 429;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Model output is not valid JSON: {0}")]
    JsonParsingFailed(String),
    #[error("Failed to serialize request: {0}")]
    JsonSerializationFailed(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
    #[error("Rate limited after {attempts} attempts: {last}")]
    MaxRetriesExceeded { attempts: u32, last: String },
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Client for the upstream chat-completion API. Each call is an independent
/// request/response unit carrying its own attempt counter; nothing is shared
/// between concurrent invocations beyond the connection pool.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if !config.credential.is_configured() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    /// Completion constrained to a JSON object, retrying rate limits per the
    /// configured policy. Returns the first choice's message content.
    pub async fn chat_json(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat_with_retry(prompt, true, self.config.retry.max_attempts)
            .await
    }

    /// Single-attempt variant of [`Self::chat_json`].
    pub async fn chat_json_once(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat_with_retry(prompt, true, 1).await
    }

    /// Free-text completion, single attempt. The content is returned as-is.
    pub async fn chat_text(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat_with_retry(prompt, false, 1).await
    }

    // Explicit retry loop: start at attempt 1, move to attempt n+1 only on a
    // rate limit with attempts remaining, terminate on success or exhaustion.
    async fn chat_with_retry(
        &self,
        prompt: &str,
        json_object: bool,
        max_attempts: u32,
    ) -> Result<String, LlmError> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.chat_once(prompt, json_object).await {
                Err(LlmError::RateLimitExceeded(last)) => {
                    if attempt >= max_attempts {
                        if max_attempts > 1 {
                            return Err(LlmError::MaxRetriesExceeded {
                                attempts: attempt,
                                last,
                            });
                        }
                        return Err(LlmError::RateLimitExceeded(last));
                    }

                    warn!(attempt, "rate limited by upstream, backing off");
                    tokio::time::sleep(self.config.retry.backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn chat_once(&self, prompt: &str, json_object: bool) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            response_format: json_object.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let body = serde_json::to_string(&request)
            .map_err(|e| LlmError::JsonSerializationFailed(e.to_string()))?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.credential.token()))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                // Transport failures are retryable only when the upstream
                // already answered 429.
                if e.status() == Some(StatusCode::TOO_MANY_REQUESTS) {
                    LlmError::RateLimitExceeded(e.to_string())
                } else {
                    LlmError::NetworkError(e)
                }
            })?;

        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let message = error_message(&text)
                .unwrap_or_else(|| "rate limit exceeded".to_string());
            return Err(LlmError::RateLimitExceeded(message));
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|_| LlmError::InvalidResponse("body is not valid JSON".to_string()))?;
        if !value.is_object() {
            return Err(LlmError::InvalidResponse(
                "body is not a JSON object".to_string(),
            ));
        }

        if let Some(error) = value.get("error") {
            if error.get("code").and_then(Value::as_i64) == Some(RATE_LIMIT_CODE) {
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("rate limit exceeded")
                    .to_string();
                return Err(LlmError::RateLimitExceeded(message));
            }

            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("upstream request failed")
                .to_string();
            return Err(LlmError::ApiError(message));
        }

        let content = value
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_string()))?;

        Ok(content.to_string())
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
