//! Ticket classifier
//!
//! One gateway call per attempt, reply parsed and normalized. Rate-limit
//! signals wait `min(hint + step × attempt, cap)`, any other failure waits a
//! fixed backoff. When attempts run out the ticket becomes an ERROR row.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use super::normalizer::{RawClassification, normalize};
use crate::ai::prompt::{SYSTEM_PROMPT, build_user_message};
use crate::ai::provider::SharedGateway;
use crate::ai::validation::parse_classification_reply;
use crate::constants::classifier as classifier_constants;
use crate::types::{ClassificationResult, PorotoError, Result, Ticket};

/// Reason recorded when the provider never stopped rate limiting
pub const RATE_LIMIT_EXHAUSTED: &str = "rate limit agotado tras reintentos";

/// Retry timings for the classification loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Added to the rate-limit hint once per previous attempt
    pub rate_limit_step: Duration,
    pub rate_limit_cap: Duration,
    /// Wait after any failure that is not a rate limit
    pub failure_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: classifier_constants::MAX_ATTEMPTS,
            rate_limit_step: Duration::from_secs(classifier_constants::RATE_LIMIT_STEP_SECS),
            rate_limit_cap: Duration::from_secs(classifier_constants::RATE_LIMIT_CAP_SECS),
            failure_backoff: Duration::from_secs(classifier_constants::FAILURE_BACKOFF_SECS),
        }
    }
}

impl RetryPolicy {
    /// Delay after a rate-limit signal on zero-based `attempt`
    pub fn rate_limit_delay(&self, hint: Duration, attempt: u32) -> Duration {
        hint.saturating_add(self.rate_limit_step.saturating_mul(attempt))
            .min(self.rate_limit_cap)
    }

    #[cfg(test)]
    pub(crate) fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            rate_limit_step: Duration::ZERO,
            rate_limit_cap: Duration::ZERO,
            failure_backoff: Duration::ZERO,
        }
    }
}

/// Gateway + normalizer with the retry loop around them
#[derive(Clone)]
pub struct Classifier {
    gateway: SharedGateway,
    retry: RetryPolicy,
}

impl Classifier {
    pub fn new(gateway: SharedGateway, retry: RetryPolicy) -> Self {
        Self { gateway, retry }
    }

    /// `"<provider> / <model>"`
    pub fn provider_name(&self) -> String {
        self.gateway.display_name()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Classify a ticket; exhausted retries come back as an ERROR row
    pub async fn classify(&self, ticket: &Ticket) -> ClassificationResult {
        match self.try_classify(ticket).await {
            Ok(result) => result,
            Err(PorotoError::ExhaustedRetries { last_error, .. }) => {
                ClassificationResult::error(format!("Error: {}", last_error))
            }
            Err(e) => ClassificationResult::error(format!("Error: {}", e)),
        }
    }

    /// Classify a ticket, surfacing `ExhaustedRetries` when every attempt failed
    pub async fn try_classify(&self, ticket: &Ticket) -> Result<ClassificationResult> {
        let user_message = build_user_message(ticket);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            let is_last = attempt + 1 == max_attempts;

            let err = match self.attempt(&user_message).await {
                Ok(result) => {
                    debug!(key = %ticket.key(), attempt, antiguedad = result.antiguedad(), "Classified");
                    return Ok(result);
                }
                Err(err) => err,
            };

            match err.rate_limit_wait() {
                Some(hint) => {
                    let delay = self.retry.rate_limit_delay(hint, attempt);
                    warn!(
                        key = %ticket.key(),
                        attempt,
                        wait_ms = delay.as_millis() as u64,
                        "Rate limited by provider"
                    );
                    last_error = RATE_LIMIT_EXHAUSTED.to_string();
                    if !is_last {
                        sleep(delay).await;
                    }
                }
                None => {
                    warn!(key = %ticket.key(), attempt, error = %err, "Classification attempt failed");
                    last_error = err.to_string();
                    if !is_last {
                        sleep(self.retry.failure_backoff).await;
                    }
                }
            }
        }

        Err(PorotoError::ExhaustedRetries {
            attempts: max_attempts,
            last_error,
        })
    }

    async fn attempt(&self, user_message: &str) -> Result<ClassificationResult> {
        let reply = self.gateway.call(SYSTEM_PROMPT, user_message).await?;
        let object = parse_classification_reply(&reply)?;
        let raw = RawClassification::from_object(&object);
        Ok(normalize(raw))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ai::provider::{CallResult, LlmGateway};
    use crate::types::{ErrorCategory, LlmError, TicketRef};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Gateway replaying a script of outcomes, repeating the last one
    pub(crate) struct MockGateway {
        script: Mutex<VecDeque<CallResult>>,
        fallback: CallResult,
        pub(crate) calls: AtomicU32,
    }

    impl MockGateway {
        pub(crate) fn new(script: Vec<CallResult>) -> Self {
            let fallback = script
                .last()
                .cloned()
                .unwrap_or_else(|| Ok(r#"{"ANTIGUEDAD":"Nuevo"}"#.to_string()));
            Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicU32::new(0),
            }
        }

        pub(crate) fn replying(reply: &str) -> Self {
            Self::new(vec![Ok(reply.to_string())])
        }

        pub(crate) fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        async fn call(&self, _system_prompt: &str, _user_message: &str) -> CallResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    fn rate_limited(secs: u64) -> CallResult {
        Err(LlmError::rate_limited("mock", Duration::from_secs(secs)))
    }

    fn ticket() -> Ticket {
        Ticket::from_ref(&TicketRef::new("SMPR-7", "Reingenieria conciliacion Monza MLB"))
    }

    const NUEVO_REPLY: &str = r#"{"ANTIGUEDAD":"Nuevo","TIPO_DE_PRODUCTO":"mejora","SCOPE":"desarrollo","COMPLEJIDAD":"","SCOPE_REFINAMIENTO":"","JUSTIFICACION":"Mejora sobre flujo existente"}"#;

    #[test]
    fn test_rate_limit_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.rate_limit_delay(Duration::from_secs(3), 0), Duration::from_secs(3));
        assert_eq!(policy.rate_limit_delay(Duration::from_secs(3), 2), Duration::from_secs(7));
        assert_eq!(policy.rate_limit_delay(Duration::from_secs(18), 4), Duration::from_secs(20));
    }

    #[test]
    fn test_rate_limit_delay_saturates_huge_hint() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.rate_limit_delay(Duration::MAX, 4), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let gateway = Arc::new(MockGateway::replying(NUEVO_REPLY));
        let classifier = Classifier::new(gateway.clone(), RetryPolicy::immediate(5));

        let result = classifier.classify(&ticket()).await;

        assert_eq!(gateway.call_count(), 1);
        assert_eq!(result.antiguedad(), "Nuevo");
        assert_eq!(result.tipo_de_producto(), "Mejora o modificacion de conexion existente");
        assert_eq!(result.scope_refinamiento(), "Desarrollo");
        assert_eq!(result.complejidad(), "Poroto abarca solo un flujo");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limits_then_success() {
        let gateway = Arc::new(MockGateway::new(vec![
            rate_limited(3),
            rate_limited(3),
            Ok(NUEVO_REPLY.to_string()),
        ]));
        let classifier = Classifier::new(gateway.clone(), RetryPolicy::default());

        let start = tokio::time::Instant::now();
        let result = classifier.classify(&ticket()).await;

        assert_eq!(gateway.call_count(), 3);
        assert!(!result.is_error());
        // 3s on attempt 0, 3s + 2s on attempt 1
        assert_eq!(start.elapsed(), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_retried() {
        let gateway = Arc::new(MockGateway::new(vec![
            Ok("lo siento, no puedo".to_string()),
            Ok(r#"{"SCOPE":"Desarrollo"}"#.to_string()),
            Ok("```json\n{\"ANTIGUEDAD\":\"carry over\",\"SCOPE\":\"Soporte\"}\n```".to_string()),
        ]));
        let classifier = Classifier::new(gateway.clone(), RetryPolicy::immediate(5));

        let result = classifier.classify(&ticket()).await;

        assert_eq!(gateway.call_count(), 3);
        assert_eq!(result.antiguedad(), "Carry Over");
        assert_eq!(result.scope(), "");
    }

    #[tokio::test]
    async fn test_reply_without_antiguedad_exhausts_to_error_row() {
        let gateway = Arc::new(MockGateway::replying(r#"{"SCOPE":"Desarrollo","COMPLEJIDAD":"1"}"#));
        let classifier = Classifier::new(gateway.clone(), RetryPolicy::immediate(3));

        let result = classifier.classify(&ticket()).await;

        assert_eq!(gateway.call_count(), 3);
        assert!(result.is_error());
        assert!(result.justificacion().contains("Missing ANTIGUEDAD"));
    }

    #[tokio::test]
    async fn test_exhausted_failures_become_error_row() {
        let gateway = Arc::new(MockGateway::new(vec![Err(LlmError::with_provider(
            ErrorCategory::Transient,
            "HTTP 500: boom",
            "mock",
        ))]));
        let classifier = Classifier::new(gateway.clone(), RetryPolicy::immediate(5));

        let result = classifier.classify(&ticket()).await;

        assert_eq!(gateway.call_count(), 5);
        assert!(result.is_error());
        assert!(result.justificacion().starts_with("Error: "));
        assert!(result.justificacion().contains("HTTP 500"));
        assert_eq!(result.scope_refinamiento(), result.scope());
    }

    #[tokio::test]
    async fn test_exhausted_rate_limits() {
        let gateway = Arc::new(MockGateway::new(vec![rate_limited(1)]));
        let classifier = Classifier::new(gateway.clone(), RetryPolicy::immediate(3));

        let err = classifier.try_classify(&ticket()).await.unwrap_err();
        assert!(matches!(err, PorotoError::ExhaustedRetries { attempts: 3, .. }));
        assert_eq!(gateway.call_count(), 3);

        let result = classifier.classify(&ticket()).await;
        assert_eq!(result.justificacion(), "Error: rate limit agotado tras reintentos");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sleep_after_final_attempt() {
        let gateway = Arc::new(MockGateway::new(vec![Ok("{}".to_string())]));
        let policy = RetryPolicy {
            max_attempts: 2,
            failure_backoff: Duration::from_secs(2),
            ..RetryPolicy::default()
        };
        let classifier = Classifier::new(gateway.clone(), policy);

        let start = tokio::time::Instant::now();
        let result = classifier.classify(&ticket()).await;

        assert!(result.is_error());
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
