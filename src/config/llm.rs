use std::env;
use std::time::Duration;

// Key compiled into packaged builds; the placeholder value means "not configured".
const PACKAGED_API_KEY: &str = "YOUR_OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_MS: u64 = 1000;

/// Upstream API credential, resolved once and passed into the client
/// explicitly. Precedence: process environment, then the packaged key,
/// then the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn resolve() -> Self {
        let key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| PACKAGED_API_KEY.to_string());
        Self(key)
    }

    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is_configured(&self) -> bool {
        !self.0.is_empty() && self.0 != PACKAGED_API_KEY
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Retry behavior for rate-limited chat requests: a hard cap on total
/// attempts and a fixed pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub credential: ApiCredential,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let max_attempts = env::var("LLM_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let backoff_ms = env::var("LLM_RETRY_BACKOFF_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BACKOFF_MS);

        Self {
            base_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy {
                max_attempts,
                backoff: Duration::from_millis(backoff_ms),
            },
            credential: ApiCredential::resolve(),
        }
    }
}
