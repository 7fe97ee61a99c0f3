//! Unified Error Type System
//!
//! Centralized error types for the classification pipeline.
//!
//! ## Error Categories
//!
//! - **RateLimit**: Provider answered 429 (wait and retry)
//! - **Auth**: Credentials rejected by the provider
//! - **Network**: Connectivity issues, timeouts
//! - **Transient**: Any other non-2xx answer
//! - **ParseError**: Reply envelope or model JSON could not be read
//!
//! Per-ticket failures are always recovered into an ERROR row by the
//! orchestrator; only `MissingCredentials` aborts a run.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used by the retry loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry
    RateLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Non-2xx answer that is neither a rate limit nor an auth failure
    Transient,
    /// Parsing the provider envelope or the model reply failed
    ParseError,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category, context, and retry hint
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// Suggested wait time before retry (set for rate limits)
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
            retry_after: None,
        }
    }

    /// Rate-limit signal carrying the suggested wait
    pub fn rate_limited(provider: impl Into<String>, wait: Duration) -> Self {
        Self::with_provider(
            ErrorCategory::RateLimit,
            format!("Rate limited, wait {:.1}s", wait.as_secs_f64()),
            provider,
        )
        .retry_after(wait)
    }

    /// Add suggested retry delay
    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn is_rate_limit(&self) -> bool {
        self.category == ErrorCategory::RateLimit
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps transport-level outcomes onto error categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a non-success HTTP status (429 is handled by the caller,
    /// which knows the provider's default wait)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Transient, message, provider),
        }
    }

    /// Classify a reqwest transport error
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        if err.is_decode() {
            LlmError::with_provider(ErrorCategory::ParseError, err.to_string(), provider)
        } else {
            LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum PorotoError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // -------------------------------------------------------------------------
    // LLM Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Model answered, but not with a usable six-field JSON object
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Classification failed after {attempts} attempts: {last_error}")]
    ExhaustedRetries { attempts: u32, last_error: String },

    // -------------------------------------------------------------------------
    // Tracker Errors
    // -------------------------------------------------------------------------
    #[error("Tracker request for {key} failed: {message}")]
    Tracker { key: String, message: String },

    #[error("Tracker kept rate limiting {key} after {attempts} attempts")]
    TrackerRateLimited { key: String, attempts: u32 },

    // -------------------------------------------------------------------------
    // Setup Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

impl From<LlmError> for PorotoError {
    fn from(err: LlmError) -> Self {
        PorotoError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, PorotoError>;

impl PorotoError {
    /// Rate-limit hint when this error is a provider 429
    pub fn rate_limit_wait(&self) -> Option<Duration> {
        match self {
            Self::Llm(e) if e.is_rate_limit() => Some(e.retry_after.unwrap_or_default()),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::ParseError.to_string(), "PARSE_ERROR");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_rate_limited_carries_wait() {
        let err = LlmError::rate_limited("groq", Duration::from_secs(3));
        assert!(err.is_rate_limit());
        assert_eq!(err.retry_after, Some(Duration::from_secs(3)));

        let wrapped = PorotoError::from(err);
        assert_eq!(wrapped.rate_limit_wait(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_non_rate_limit_has_no_wait() {
        let err = PorotoError::MalformedOutput("Missing ANTIGUEDAD".to_string());
        assert_eq!(err.rate_limit_wait(), None);

        let http = PorotoError::from(ErrorClassifier::classify_http_status(500, "boom", "openai"));
        assert_eq!(http.rate_limit_wait(), None);
    }

    #[test]
    fn test_classify_http_status() {
        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "test");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server_error = ErrorClassifier::classify_http_status(503, "Server error", "test");
        assert_eq!(server_error.category, ErrorCategory::Transient);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::Transient, "HTTP 500", "gemini");
        assert_eq!(err.to_string(), "[gemini:TRANSIENT] HTTP 500");

        let err_no_provider = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }
}
