//! Configuration Types
//!
//! All configuration structures with sensible defaults. Credentials are
//! never serialized and are redacted in debug output.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai::provider::{GenerationParams, ModelSpeed, ProviderConfig, ProviderKind};
use crate::classify::RetryPolicy;
use crate::constants::{classifier, provider, tracker};
use crate::tracker::{TrackerRetryPolicy, TrackerSettings};
use crate::types::{PorotoError, Result};

/// Well-known tracker credential variables
pub mod env_vars {
    pub const TRACKER_BASE_URL: &str = "JIRA_BASE_URL";
    pub const TRACKER_EMAIL: &str = "JIRA_EMAIL";
    pub const TRACKER_API_TOKEN: &str = "JIRA_API_TOKEN";
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Issue tracker settings
    pub tracker: TrackerConfig,

    /// Input table settings
    pub input: InputConfig,

    /// Output table settings
    pub output: OutputConfig,

    /// Retry timings
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            tracker: TrackerConfig::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `PorotoError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(PorotoError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(PorotoError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(PorotoError::Config(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.tracker.timeout_secs == 0 {
            return Err(PorotoError::Config(
                "Tracker timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.retry.classifier_attempts == 0 || self.retry.tracker_attempts == 0 {
            return Err(PorotoError::Config(
                "Retry attempts must be greater than 0".to_string(),
            ));
        }

        if self.input.prefix.trim().is_empty() {
            return Err(PorotoError::Config(
                "Input prefix must not be empty".to_string(),
            ));
        }

        self.output.delimiter_byte()?;

        Ok(())
    }

    /// Resolve the LLM provider, model and key.
    ///
    /// An explicit provider takes its key from its own variable
    /// (`GROQ_API_KEY`, ...) or from `llm.api_key`. Without a provider the
    /// first key found among groq, gemini, openai decides.
    pub fn provider_config<F>(&self, lookup: F) -> Result<ProviderConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let (kind, api_key) = match self.llm.provider {
            Some(kind) => {
                let key = non_empty(lookup(kind.api_key_env()))
                    .or_else(|| non_empty(self.llm.api_key.clone()))
                    .ok_or_else(|| {
                        PorotoError::MissingCredentials(format!(
                            "No API key for {}. Set {} or llm.api_key",
                            kind,
                            kind.api_key_env()
                        ))
                    })?;
                (kind, key)
            }
            None => {
                if non_empty(self.llm.api_key.clone()).is_some() {
                    return Err(PorotoError::Config(
                        "llm.api_key requires llm.provider to be set".to_string(),
                    ));
                }
                ProviderKind::detect(&lookup).ok_or_else(|| {
                    PorotoError::MissingCredentials(
                        "No LLM API key found. Set one of GROQ_API_KEY \
                         (free at https://console.groq.com/keys), GEMINI_API_KEY, OPENAI_API_KEY"
                            .to_string(),
                    )
                })?
            }
        };

        let model = self.llm.model.clone().or_else(|| match (kind, self.llm.speed) {
            (ProviderKind::Groq, Some(speed)) => Some(speed.groq_model().to_string()),
            _ => None,
        });

        let mut config = ProviderConfig::new(kind, api_key);
        config.model = model;
        config.api_base = self.llm.api_base.clone();
        config.timeout = Duration::from_secs(self.llm.timeout_secs);
        config.params = GenerationParams {
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
        };
        config.min_interval = self.llm.min_interval_ms.map(Duration::from_millis);
        Ok(config)
    }

    /// Tracker settings when enrichment is enabled and all three
    /// credentials are known. `JIRA_*` variables win over the file values.
    pub fn tracker_settings<F>(&self, lookup: F) -> Option<TrackerSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.tracker.enabled {
            return None;
        }

        let pick = |name: &str, fallback: &Option<String>| {
            lookup(name)
                .or_else(|| fallback.clone())
                .filter(|v| !v.trim().is_empty())
        };

        let base_url = pick(env_vars::TRACKER_BASE_URL, &self.tracker.base_url)?;
        let email = pick(env_vars::TRACKER_EMAIL, &self.tracker.email)?;
        let api_token = pick(env_vars::TRACKER_API_TOKEN, &self.tracker.api_token)?;

        Some(TrackerSettings {
            base_url,
            email,
            api_token: api_token.into(),
            timeout: Duration::from_secs(self.tracker.timeout_secs),
        })
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider (auto-detected from API keys when unset)
    pub provider: Option<ProviderKind>,

    /// Model name (provider default when unset)
    pub model: Option<String>,

    /// Groq model preset, used when no model is set
    pub speed: Option<ModelSpeed>,

    /// API key for the configured provider; never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Override for the provider's API base URL
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion budget (OpenAI-compatible providers)
    pub max_tokens: u32,

    /// Override for the provider's minimum call spacing
    pub min_interval_ms: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            speed: None,
            api_key: None,
            api_base: None,
            timeout_secs: provider::TIMEOUT_SECS,
            temperature: provider::TEMPERATURE,
            max_tokens: provider::MAX_TOKENS,
            min_interval_ms: None,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("speed", &self.speed)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("min_interval_ms", &self.min_interval_ms)
            .finish()
    }
}

// =============================================================================
// Tracker Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Turn enrichment off entirely
    pub enabled: bool,

    /// Tracker base URL (e.g. https://company.atlassian.net)
    pub base_url: Option<String>,

    /// Account email for basic auth
    pub email: Option<String>,

    /// API token; never written back out
    #[serde(skip_serializing)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Fetch the first ticket before the batch and fall back to input
    /// titles when it fails
    pub preflight: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            email: None,
            api_token: None,
            timeout_secs: tracker::TIMEOUT_SECS,
            preflight: true,
        }
    }
}

impl std::fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("preflight", &self.preflight)
            .finish()
    }
}

// =============================================================================
// Input / Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Ticket key prefix (`SMPR` matches `SMPR-1234`)
    pub prefix: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            prefix: "SMPR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Field delimiter: one ASCII character, or `tab`
    pub delimiter: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_str() {
            "tab" | "\\t" | "\t" => Ok(b'\t'),
            d if d.len() == 1 && d.is_ascii() => Ok(d.as_bytes()[0]),
            d => Err(PorotoError::Config(format!(
                "Output delimiter must be a single ASCII character or 'tab', got '{}'",
                d
            ))),
        }
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Classification attempts per ticket
    pub classifier_attempts: u32,
    pub rate_limit_step_secs: u64,
    pub rate_limit_cap_secs: u64,
    pub failure_backoff_secs: u64,

    /// Tracker attempts per issue
    pub tracker_attempts: u32,
    pub tracker_rate_limit_step_secs: u64,
    pub tracker_transient_step_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            classifier_attempts: classifier::MAX_ATTEMPTS,
            rate_limit_step_secs: classifier::RATE_LIMIT_STEP_SECS,
            rate_limit_cap_secs: classifier::RATE_LIMIT_CAP_SECS,
            failure_backoff_secs: classifier::FAILURE_BACKOFF_SECS,
            tracker_attempts: tracker::MAX_ATTEMPTS,
            tracker_rate_limit_step_secs: tracker::RATE_LIMIT_STEP_SECS,
            tracker_transient_step_secs: tracker::TRANSIENT_STEP_SECS,
        }
    }
}

impl RetryConfig {
    pub fn classifier_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.classifier_attempts,
            rate_limit_step: Duration::from_secs(self.rate_limit_step_secs),
            rate_limit_cap: Duration::from_secs(self.rate_limit_cap_secs),
            failure_backoff: Duration::from_secs(self.failure_backoff_secs),
        }
    }

    pub fn tracker_policy(&self) -> TrackerRetryPolicy {
        TrackerRetryPolicy {
            max_attempts: self.tracker_attempts,
            rate_limit_step: Duration::from_secs(self.tracker_rate_limit_step_secs),
            transient_step: Duration::from_secs(self.tracker_transient_step_secs),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.input.prefix, "SMPR");
        assert_eq!(config.output.delimiter_byte().unwrap(), b';');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_policies_match_constants() {
        assert_eq!(RetryConfig::default().classifier_policy(), RetryPolicy::default());
        assert_eq!(RetryConfig::default().tracker_policy().max_attempts, 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.llm.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.delimiter = ";;".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retry.classifier_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tab_delimiter() {
        let output = OutputConfig {
            delimiter: "tab".to_string(),
        };
        assert_eq!(output.delimiter_byte().unwrap(), b'\t');
    }

    #[test]
    fn test_provider_autodetect() {
        let config = Config::default();
        let resolved = config
            .provider_config(env(&[("OPENAI_API_KEY", "sk-o"), ("GEMINI_API_KEY", "g")]))
            .unwrap();
        assert_eq!(resolved.kind, ProviderKind::Gemini);
        assert_eq!(resolved.model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_missing_credentials() {
        let err = Config::default().provider_config(env(&[])).unwrap_err();
        assert!(matches!(err, PorotoError::MissingCredentials(_)));

        let mut config = Config::default();
        config.llm.provider = Some(ProviderKind::OpenAi);
        let err = config
            .provider_config(env(&[("GROQ_API_KEY", "gsk")]))
            .unwrap_err();
        assert!(matches!(err, PorotoError::MissingCredentials(_)));
    }

    #[test]
    fn test_explicit_provider_with_speed() {
        let mut config = Config::default();
        config.llm.provider = Some(ProviderKind::Groq);
        config.llm.speed = Some(ModelSpeed::Accurate);
        config.llm.api_key = Some("from-file".to_string());
        config.llm.min_interval_ms = Some(0);

        let resolved = config.provider_config(env(&[])).unwrap();
        assert_eq!(resolved.model_name(), "llama-3.3-70b-versatile");
        assert_eq!(resolved.min_interval(), Duration::ZERO);
    }

    #[test]
    fn test_tracker_settings_need_all_credentials() {
        let config = Config::default();
        assert!(
            config
                .tracker_settings(env(&[("JIRA_BASE_URL", "https://x"), ("JIRA_EMAIL", "a@b")]))
                .is_none()
        );

        let settings = config
            .tracker_settings(env(&[
                ("JIRA_BASE_URL", "https://x.atlassian.net"),
                ("JIRA_EMAIL", "a@b.com"),
                ("JIRA_API_TOKEN", "tok"),
            ]))
            .unwrap();
        assert_eq!(settings.email, "a@b.com");
        assert!(!format!("{:?}", settings).contains("tok\""));
    }

    #[test]
    fn test_tracker_disabled() {
        let mut config = Config::default();
        config.tracker.enabled = false;
        config.tracker.base_url = Some("https://x".to_string());
        config.tracker.email = Some("a@b".to_string());
        config.tracker.api_token = Some("t".to_string());
        assert!(config.tracker_settings(env(&[])).is_none());
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-live-123".to_string());
        config.tracker.api_token = Some("jira-456".to_string());

        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-live-123"));
        assert!(!debug.contains("jira-456"));
    }

    #[test]
    fn test_credentials_not_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-live-123".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(!text.contains("sk-live-123"));
    }
}
