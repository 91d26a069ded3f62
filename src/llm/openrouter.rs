//! OpenRouter API client implementation with automatic retry for transient errors.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{classify_http_status, LlmError, LlmErrorKind, RetryConfig};
use super::{ChatMessage, ChatOptions, ChatResponse, LlmClient};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Per-request timeout; retries happen above this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenRouter API client with automatic retry for transient errors.
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    retry_config: RetryConfig,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client with default retry configuration.
    pub fn new(api_key: String) -> Self {
        Self::with_retry_config(api_key, RetryConfig::default())
    }

    /// Create a new OpenRouter client with custom retry configuration.
    pub fn with_retry_config(api_key: String, retry_config: RetryConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            retry_config,
        }
    }

    /// Parse Retry-After header if present (seconds form only).
    fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
        headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok().map(Duration::from_secs))
    }

    /// Create an LlmError from HTTP response status and body.
    fn create_error(
        status: reqwest::StatusCode,
        body: &str,
        retry_after: Option<Duration>,
    ) -> LlmError {
        let status_code = status.as_u16();
        match classify_http_status(status_code) {
            LlmErrorKind::RateLimited => LlmError::rate_limited(body.to_string(), retry_after),
            LlmErrorKind::ClientError => LlmError::client_error(status_code, body.to_string()),
            _ => LlmError::server_error(status_code, body.to_string()),
        }
    }

    /// Execute a single request without retry.
    async fn execute_request(&self, request: &OpenRouterRequest) -> Result<ChatResponse, LlmError> {
        let response = match self
            .client
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "Daybook")
            .json(request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(LlmError::network_error(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(LlmError::network_error(format!("Connection failed: {}", e)));
                } else {
                    return Err(LlmError::network_error(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let retry_after = Self::parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Self::create_error(status, &body, retry_after));
        }

        let parsed: OpenRouterResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::parse_error(format!("Failed to parse response: {}, body: {}", e, body))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::parse_error("No choices in response".to_string()))?;

        Ok(ChatResponse {
            content: choice.message.content,
            finish_reason: choice.finish_reason,
            model: parsed.model.or_else(|| Some(request.model.clone())),
        })
    }

    /// Execute a request with automatic retry for transient errors.
    async fn execute_with_retry(
        &self,
        request: &OpenRouterRequest,
    ) -> Result<ChatResponse, LlmError> {
        let start = Instant::now();
        let mut attempt = 0;
        let mut last_error: Option<LlmError> = None;

        loop {
            if start.elapsed() > self.retry_config.max_retry_duration {
                return Err(last_error.unwrap_or_else(|| {
                    LlmError::network_error("Max retry duration exceeded".to_string())
                }));
            }

            match self.execute_request(request).await {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!(
                            "Request succeeded after {} retries (total time: {:?})",
                            attempt,
                            start.elapsed()
                        );
                    }
                    return Ok(response);
                }
                Err(error) => {
                    let should_retry = self.retry_config.should_retry(&error)
                        && attempt < self.retry_config.max_retries;

                    if !should_retry {
                        tracing::error!(
                            "Request failed after {} attempts: {}",
                            attempt + 1,
                            error
                        );
                        return Err(error);
                    }

                    let delay = error.suggested_delay(attempt);
                    let remaining = self
                        .retry_config
                        .max_retry_duration
                        .saturating_sub(start.elapsed());
                    let actual_delay = delay.min(remaining);

                    if actual_delay.is_zero() {
                        tracing::warn!(
                            "Retry attempt {} failed, no time remaining: {}",
                            attempt + 1,
                            error
                        );
                        return Err(error);
                    }

                    tracing::warn!(
                        "Retry attempt {} failed with {}, retrying in {:?}: {}",
                        attempt + 1,
                        error.kind,
                        actual_delay,
                        error.message
                    );

                    tokio::time::sleep(actual_delay).await;
                    attempt += 1;
                    last_error = Some(error);
                }
            }
        }
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatResponse, LlmError> {
        self.chat_completion_with_options(model, messages, ChatOptions::default())
            .await
    }

    async fn chat_completion_with_options(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> Result<ChatResponse, LlmError> {
        let request = OpenRouterRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        tracing::debug!("Sending request to OpenRouter: model={}", model);

        self.execute_with_retry(&request).await
    }
}

/// OpenRouter API request format.
#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
}

/// OpenRouter API response format.
#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    choices: Vec<OpenRouterChoice>,
    #[serde(default)]
    model: Option<String>,
}

/// A choice in the OpenRouter response.
#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterMessage,
    finish_reason: Option<String>,
}

/// Message in OpenRouter response.
#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    content: Option<String>,
}
