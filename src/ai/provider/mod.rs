//! LLM Provider Abstraction
//!
//! One call interface (`LlmGateway`) over a closed set of providers.
//! Each `ProviderKind` knows how to build its request, how to read its
//! response envelope and how far apart calls must be spaced.
//!
//! ## Modules
//!
//! - `gateway`: HTTP gateway with throttle and 429 translation
//! - `openai`: OpenAI-compatible chat completions (OpenAI, Groq)
//! - `gemini`: Gemini generateContent
//! - `throttle`: minimum-interval throttle

mod gateway;
mod gemini;
mod openai;
mod throttle;

pub use gateway::HttpGateway;
pub use throttle::Throttle;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::provider as provider_constants;
use crate::types::{LlmError, PorotoError, Result};

// =============================================================================
// Provider Kinds
// =============================================================================

/// Supported chat-completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Groq,
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Detection order when no provider is configured
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Groq, ProviderKind::Gemini, ProviderKind::OpenAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Groq => "llama-3.1-8b-instant",
            Self::Gemini => "gemini-2.0-flash",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Floor on the spacing between consecutive calls
    pub fn min_interval(&self) -> Duration {
        match self {
            Self::Gemini => Duration::from_millis(provider_constants::GEMINI_MIN_INTERVAL_MS),
            Self::Groq | Self::OpenAi => {
                Duration::from_millis(provider_constants::OPENAI_COMPAT_MIN_INTERVAL_MS)
            }
        }
    }

    /// Wait hint for a 429 without a usable `retry-after` header
    pub fn default_rate_limit_wait(&self) -> Duration {
        match self {
            Self::Gemini => Duration::from_millis(provider_constants::GEMINI_RATE_LIMIT_WAIT_MS),
            Self::Groq | Self::OpenAi => {
                Duration::from_millis(provider_constants::OPENAI_COMPAT_RATE_LIMIT_WAIT_MS)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_request(
        &self,
        client: &reqwest::Client,
        api_base: &str,
        model: &str,
        api_key: &SecretString,
        system_prompt: &str,
        user_message: &str,
        params: &GenerationParams,
    ) -> reqwest::RequestBuilder {
        match self {
            Self::Groq | Self::OpenAi => openai::build_request(
                client,
                api_base,
                model,
                api_key,
                system_prompt,
                user_message,
                params,
            ),
            Self::Gemini => gemini::build_request(
                client,
                api_base,
                model,
                api_key,
                system_prompt,
                user_message,
                params,
            ),
        }
    }

    fn parse_response(&self, body: &str) -> std::result::Result<String, String> {
        match self {
            Self::Groq | Self::OpenAi => openai::extract_text(body),
            Self::Gemini => gemini::extract_text(body),
        }
    }

    /// First provider whose API key is available through `lookup`
    pub fn detect<F>(lookup: F) -> Option<(ProviderKind, String)>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::ALL.iter().find_map(|kind| {
            lookup(kind.api_key_env())
                .filter(|key| !key.trim().is_empty())
                .map(|key| (*kind, key))
        })
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = PorotoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            _ => Err(PorotoError::Config(format!(
                "Unknown provider: {}. Supported: groq, gemini, openai",
                s
            ))),
        }
    }
}

/// Model presets for Groq
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpeed {
    /// Small model, roughly 2s per ticket
    #[default]
    Fast,
    /// Large model, roughly 4s per ticket
    Accurate,
}

impl ModelSpeed {
    pub fn groq_model(&self) -> &'static str {
        match self {
            Self::Fast => "llama-3.1-8b-instant",
            Self::Accurate => "llama-3.3-70b-versatile",
        }
    }
}

impl std::str::FromStr for ModelSpeed {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "accurate" => Ok(Self::Accurate),
            _ => Err(format!("Invalid speed '{}'. Valid values: fast, accurate", s)),
        }
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// Sampling parameters shared by all dialects
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: provider_constants::TEMPERATURE,
            max_tokens: provider_constants::MAX_TOKENS,
        }
    }
}

/// Resolved configuration for one gateway
///
/// The API key is a `SecretString` and is redacted in debug output.
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: SecretString,
    /// Falls back to the provider's default model
    pub model: Option<String>,
    /// Falls back to the provider's public endpoint
    pub api_base: Option<String>,
    pub timeout: Duration,
    pub params: GenerationParams,
    /// Overrides the provider's minimum call interval
    pub min_interval: Option<Duration>,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: SecretString::from(api_key.into()),
            model: None,
            api_base: None,
            timeout: Duration::from_secs(provider_constants::TIMEOUT_SECS),
            params: GenerationParams::default(),
            min_interval: None,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(self.kind.default_model())
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval.unwrap_or_else(|| self.kind.min_interval())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("params", &self.params)
            .field("min_interval", &self.min_interval)
            .finish()
    }
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// Outcome of one completion call: the raw text, or a categorized error.
/// A 429 comes back as `ErrorCategory::RateLimit` with `retry_after` set.
pub type CallResult = std::result::Result<String, LlmError>;

/// Chat-completion call interface
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send one system+user exchange and return the model's text payload
    async fn call(&self, system_prompt: &str, user_message: &str) -> CallResult;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// `"<provider> / <model>"`
    fn display_name(&self) -> String {
        format!("{} / {}", self.name(), self.model())
    }
}

/// Shared gateway handle
pub type SharedGateway = Arc<dyn LlmGateway>;

/// Create a shared gateway from configuration
pub fn create_gateway(config: ProviderConfig) -> Result<SharedGateway> {
    Ok(Arc::new(HttpGateway::new(config)?))
}
