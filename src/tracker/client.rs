//! Issue Tracker REST Client
//!
//! Fetches the handful of issue fields the classifier uses.
//!
//! ## Retry policy
//!
//! - 200: parse and return the issue
//! - 404: `Ok(None)`, never retried
//! - 429: wait `rate_limit_step × attempt`, retry
//! - anything else (network errors, other statuses, unreadable bodies):
//!   wait `transient_step × attempt`, retry
//!
//! The final attempt's failure is returned to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::document::extract_text;
use crate::constants::limits::MAX_DESCRIPTION_CHARS;
use crate::constants::tracker as tracker_constants;
use crate::types::{IssueDetails, PorotoError, Result, truncate_chars};

/// Source of issue metadata
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// `Ok(None)` when the issue does not exist
    async fn fetch(&self, key: &str) -> Result<Option<IssueDetails>>;
}

/// Tracker connection settings
#[derive(Clone)]
pub struct TrackerSettings {
    pub base_url: String,
    pub email: String,
    pub api_token: SecretString,
    pub timeout: Duration,
}

impl std::fmt::Debug for TrackerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerSettings")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Retry knobs for tracker requests
#[derive(Debug, Clone)]
pub struct TrackerRetryPolicy {
    pub max_attempts: u32,
    pub rate_limit_step: Duration,
    pub transient_step: Duration,
}

impl Default for TrackerRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: tracker_constants::MAX_ATTEMPTS,
            rate_limit_step: Duration::from_secs(tracker_constants::RATE_LIMIT_STEP_SECS),
            transient_step: Duration::from_secs(tracker_constants::TRANSIENT_STEP_SECS),
        }
    }
}

/// REST client for the issue tracker
pub struct TrackerClient {
    base_url: String,
    email: String,
    api_token: SecretString,
    retry: TrackerRetryPolicy,
    client: reqwest::Client,
}

impl std::fmt::Debug for TrackerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerClient")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .field("retry", &self.retry)
            .finish()
    }
}

enum Attempt {
    Found(IssueDetails),
    NotFound,
    RateLimited,
    Failed(String),
}

impl TrackerClient {
    pub fn new(settings: TrackerSettings, retry: TrackerRetryPolicy) -> Result<Self> {
        let base_url = Self::validate_base_url(&settings.base_url)?;

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| PorotoError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            email: settings.email,
            api_token: settings.api_token,
            retry,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Only http/https, trailing slash removed
    fn validate_base_url(base_url: &str) -> Result<String> {
        let url = url::Url::parse(base_url.trim()).map_err(|e| {
            PorotoError::Config(format!("Invalid tracker base URL '{}': {}", base_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PorotoError::Config(format!(
                "Tracker base URL must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    fn issue_url(&self, key: &str) -> String {
        format!("{}/rest/api/3/issue/{}", self.base_url, key)
    }

    async fn attempt(&self, key: &str) -> Attempt {
        let response = match self
            .client
            .get(self.issue_url(key))
            .header("Accept", "application/json")
            .basic_auth(&self.email, Some(self.api_token.expose_secret()))
            .query(&[("fields", tracker_constants::ISSUE_FIELDS)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Failed(format!("request failed: {}", e)),
        };

        match response.status() {
            StatusCode::OK => match response.json::<IssueResponse>().await {
                Ok(body) => Attempt::Found(body.into_details(key)),
                Err(e) => Attempt::Failed(format!("unreadable issue body: {}", e)),
            },
            StatusCode::NOT_FOUND => Attempt::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Attempt::RateLimited,
            status => {
                let body = response.text().await.unwrap_or_default();
                Attempt::Failed(format!("HTTP {}: {}", status, body))
            }
        }
    }
}

#[async_trait]
impl IssueSource for TrackerClient {
    async fn fetch(&self, key: &str) -> Result<Option<IssueDetails>> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(key = %key, attempt, "Fetching issue");
            let is_last = attempt >= max_attempts;

            let wait = match self.attempt(key).await {
                Attempt::Found(details) => return Ok(Some(details)),
                Attempt::NotFound => {
                    debug!(key = %key, "Issue not found");
                    return Ok(None);
                }
                Attempt::RateLimited if is_last => {
                    return Err(PorotoError::TrackerRateLimited {
                        key: key.to_string(),
                        attempts: max_attempts,
                    });
                }
                Attempt::RateLimited => {
                    let wait = self.retry.rate_limit_step * attempt;
                    warn!(key = %key, attempt, wait_ms = wait.as_millis() as u64, "Tracker rate limited");
                    wait
                }
                Attempt::Failed(message) if is_last => {
                    return Err(PorotoError::Tracker {
                        key: key.to_string(),
                        message,
                    });
                }
                Attempt::Failed(message) => {
                    let wait = self.retry.transient_step * attempt;
                    warn!(
                        key = %key,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %message,
                        "Tracker request failed, retrying"
                    );
                    wait
                }
            };

            sleep(wait).await;
        }
    }
}

// Response types

#[derive(Debug, Deserialize)]
struct IssueResponse {
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Debug, Default, Deserialize)]
struct IssueFields {
    summary: Option<String>,
    description: Option<Value>,
    labels: Option<Vec<String>>,
    components: Option<Vec<NamedField>>,
    status: Option<NamedField>,
    issuetype: Option<NamedField>,
}

#[derive(Debug, Deserialize)]
struct NamedField {
    #[serde(default)]
    name: Option<String>,
}

impl NamedField {
    fn into_name(self) -> String {
        self.name.unwrap_or_default()
    }
}

impl IssueResponse {
    fn into_details(self, key: &str) -> IssueDetails {
        let fields = self.fields;
        let description = extract_text(fields.description.as_ref());

        IssueDetails {
            key: key.to_string(),
            title: fields.summary.unwrap_or_default(),
            description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
            labels: fields.labels.unwrap_or_default(),
            components: fields
                .components
                .unwrap_or_default()
                .into_iter()
                .map(NamedField::into_name)
                .collect(),
            status: fields.status.map(NamedField::into_name).unwrap_or_default(),
            issue_type: fields.issuetype.map(NamedField::into_name).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TrackerClient {
        TrackerClient::new(
            TrackerSettings {
                base_url: format!("{}/", server.uri()),
                email: "bot@example.com".to_string(),
                api_token: SecretString::from("token".to_string()),
                timeout: Duration::from_secs(5),
            },
            TrackerRetryPolicy {
                max_attempts: 3,
                rate_limit_step: Duration::ZERO,
                transient_step: Duration::ZERO,
            },
        )
        .expect("client should build")
    }

    fn issue_body() -> Value {
        json!({
            "key": "SMPR-1",
            "fields": {
                "summary": "Reingenieria conciliacion Monza MLB",
                "description": {
                    "type": "doc",
                    "content": [{"type": "paragraph", "content": [
                        {"type": "text", "text": "Flujo"},
                        {"type": "text", "text": "MLB"}
                    ]}]
                },
                "labels": ["tmo", "q3"],
                "components": [{"name": "Conciliacion"}, {"id": "7"}],
                "status": {"name": "Open"},
                "issuetype": {"name": "Epic"}
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_parses_issue() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/SMPR-1"))
            .and(query_param("fields", tracker_constants::ISSUE_FIELDS))
            .and(basic_auth("bot@example.com", "token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_body()))
            .expect(1)
            .mount(&server)
            .await;

        let details = client_for(&server)
            .fetch("SMPR-1")
            .await
            .expect("fetch should succeed")
            .expect("issue should exist");

        assert_eq!(details.title, "Reingenieria conciliacion Monza MLB");
        assert_eq!(details.description, "Flujo MLB");
        assert_eq!(details.labels, vec!["tmo", "q3"]);
        assert_eq!(details.components, vec!["Conciliacion", ""]);
        assert_eq!(details.status, "Open");
        assert_eq!(details.issue_type, "Epic");
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/SMPR-404"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).fetch("SMPR-404").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_fetch_retries_rate_limit_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/SMPR-1"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/SMPR-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_body()))
            .expect(1)
            .mount(&server)
            .await;

        let details = client_for(&server).fetch("SMPR-1").await.unwrap();
        assert!(details.is_some());
    }

    #[tokio::test]
    async fn test_fetch_propagates_final_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/SMPR-1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&server)
            .await;

        let err = client_for(&server).fetch("SMPR-1").await.unwrap_err();
        assert!(matches!(err, PorotoError::Tracker { .. }));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_fetch_rate_limited_on_every_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let err = client_for(&server).fetch("SMPR-1").await.unwrap_err();
        assert!(matches!(err, PorotoError::TrackerRateLimited { attempts: 3, .. }));
    }

    #[test]
    fn test_description_truncated() {
        let body: IssueResponse = serde_json::from_value(json!({
            "fields": {"summary": "t", "description": "x".repeat(MAX_DESCRIPTION_CHARS + 1)}
        }))
        .unwrap();
        let details = body.into_details("SMPR-1");
        assert_eq!(details.description.chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(details.labels.is_empty());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let result = TrackerClient::new(
            TrackerSettings {
                base_url: "ftp://tracker.example.com".to_string(),
                email: String::new(),
                api_token: SecretString::from(String::new()),
                timeout: Duration::from_secs(1),
            },
            TrackerRetryPolicy::default(),
        );
        assert!(matches!(result, Err(PorotoError::Config(_))));
    }
}
