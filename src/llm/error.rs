//! Typed errors and retry policy for the LLM client.
//!
//! Every remote failure is classified into a distinct kind so callers can
//! decide what to retry and what to surface to the user.

use std::time::Duration;

use thiserror::Error;

/// Classification of an LLM request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Connection failure, DNS failure, or request timeout.
    Network,
    /// HTTP 429 from the provider.
    RateLimited,
    /// HTTP 5xx from the provider.
    ServerError,
    /// HTTP 4xx other than 429 (bad request, auth failure, ...).
    ClientError,
    /// Response body did not match the expected shape.
    ParseError,
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network error"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::ServerError => write!(f, "server error"),
            Self::ClientError => write!(f, "client error"),
            Self::ParseError => write!(f, "parse error"),
        }
    }
}

/// An error from a chat completion request.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    /// Provider-suggested delay from a Retry-After header, if any.
    pub retry_after: Option<Duration>,
    /// HTTP status code, when the failure came with one.
    pub status: Option<u16>,
}

impl LlmError {
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Network,
            message: message.into(),
            retry_after: None,
            status: None,
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            message: message.into(),
            retry_after,
            status: Some(429),
        }
    }

    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ServerError,
            message: message.into(),
            retry_after: None,
            status: Some(status),
        }
    }

    pub fn client_error(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ClientError,
            message: message.into(),
            retry_after: None,
            status: Some(status),
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ParseError,
            message: message.into(),
            retry_after: None,
            status: None,
        }
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            LlmErrorKind::Network | LlmErrorKind::RateLimited | LlmErrorKind::ServerError
        )
    }

    /// Delay to wait before the given retry attempt (0-based).
    ///
    /// Honors Retry-After when the provider sent one, otherwise exponential
    /// backoff starting at one second, capped at 30s.
    pub fn suggested_delay(&self, attempt: u32) -> Duration {
        if let Some(after) = self.retry_after {
            return after;
        }
        let backoff = Duration::from_secs(1 << attempt.min(5));
        backoff.min(Duration::from_secs(30))
    }
}

/// Classify an HTTP status code into an error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        500..=599 => LlmErrorKind::ServerError,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}

/// Retry policy for transient LLM errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum retry attempts after the initial request.
    pub max_retries: u32,
    /// Total wall-clock budget across all attempts.
    pub max_retry_duration: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_retry_duration: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Whether this error should be retried at all under this policy.
    pub fn should_retry(&self, error: &LlmError) -> bool {
        error.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        assert_eq!(classify_http_status(429), LlmErrorKind::RateLimited);
        assert_eq!(classify_http_status(500), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(503), LlmErrorKind::ServerError);
        assert_eq!(classify_http_status(401), LlmErrorKind::ClientError);
        assert_eq!(classify_http_status(404), LlmErrorKind::ClientError);
    }

    #[test]
    fn transient_errors_retry() {
        let config = RetryConfig::default();
        assert!(config.should_retry(&LlmError::network_error("timeout")));
        assert!(config.should_retry(&LlmError::rate_limited("slow down", None)));
        assert!(config.should_retry(&LlmError::server_error(502, "bad gateway")));
        assert!(!config.should_retry(&LlmError::client_error(401, "bad key")));
        assert!(!config.should_retry(&LlmError::parse_error("garbage")));
    }

    #[test]
    fn retry_after_wins_over_backoff() {
        let err = LlmError::rate_limited("429", Some(Duration::from_secs(7)));
        assert_eq!(err.suggested_delay(0), Duration::from_secs(7));

        let err = LlmError::server_error(500, "oops");
        assert_eq!(err.suggested_delay(0), Duration::from_secs(1));
        assert_eq!(err.suggested_delay(2), Duration::from_secs(4));
        // Capped.
        assert_eq!(err.suggested_delay(10), Duration::from_secs(30));
    }
}
