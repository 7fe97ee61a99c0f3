//! HTTP gateway over the provider dialects
//!
//! Owns the throttle and the HTTP client of one provider. A 429 is turned
//! into a typed rate-limit error carrying the wait hint; everything else
//! that is not a 2xx is categorized and handed back to the caller.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use secrecy::SecretString;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CallResult, GenerationParams, LlmGateway, ProviderConfig, ProviderKind, Throttle};
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, PorotoError, Result};

/// Gateway speaking one provider's HTTP dialect
pub struct HttpGateway {
    kind: ProviderKind,
    api_key: SecretString,
    api_base: String,
    model: String,
    params: GenerationParams,
    throttle: Throttle,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("kind", &self.kind)
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("throttle", &self.throttle)
            .finish()
    }
}

impl HttpGateway {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = Self::validate_endpoint(
            config
                .api_base
                .as_deref()
                .unwrap_or(config.kind.default_api_base()),
        )?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PorotoError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            kind: config.kind,
            model: config.model_name().to_string(),
            throttle: Throttle::new(config.min_interval()),
            api_key: config.api_key,
            api_base,
            params: config.params,
            client,
        })
    }

    /// Only http/https endpoints, trailing slash removed
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            PorotoError::Config(format!("Invalid API base URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PorotoError::Config(format!(
                "API base must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Wait hint for a 429: `retry-after` seconds when they fit a
    /// `Duration`, else the provider default
    fn rate_limit_wait(&self, response: &reqwest::Response) -> Duration {
        response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or_else(|| self.kind.default_rate_limit_wait())
    }
}

#[async_trait]
impl LlmGateway for HttpGateway {
    async fn call(&self, system_prompt: &str, user_message: &str) -> CallResult {
        self.throttle.acquire().await;

        debug!(provider = self.name(), model = %self.model, "Sending completion request");

        let response = self
            .kind
            .build_request(
                &self.client,
                &self.api_base,
                &self.model,
                &self.api_key,
                system_prompt,
                user_message,
                &self.params,
            )
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, self.name()))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = self.rate_limit_wait(&response);
            warn!(
                provider = self.name(),
                wait_secs = wait.as_secs_f64(),
                "Provider rate limited the request"
            );
            return Err(LlmError::rate_limited(self.name(), wait));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("HTTP {}: {}", status.as_u16(), body),
                self.name(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, self.name()))?;

        self.kind
            .parse_response(&body)
            .map_err(|msg| LlmError::with_provider(ErrorCategory::ParseError, msg, self.name()))
    }

    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }
}
