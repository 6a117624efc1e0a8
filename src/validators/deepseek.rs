//! DeepSeek validator: balance probe with a rate-limit retry loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::retry::RetryPolicy;
use crate::types::{
    ApiKey, DeepSeekDetails, KeyDetails, Provider, ValidationOptions, ValidationResult,
};

use super::KeyValidator;

const API_URL: &str = "https://api.deepseek.com/v1";
const MAX_ATTEMPTS: u32 = 4;
const RETRY_DELAY: Duration = Duration::from_secs(2);

pub struct DeepSeekValidator {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl DeepSeekValidator {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: API_URL.to_string(),
            retry: RetryPolicy::new(MAX_ATTEMPTS, RETRY_DELAY)
                .with_retry_condition(|error| matches!(error, KeyCheckError::RateLimited(_))),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the throttle retry policy (the retryability predicate is
    /// pinned to rate-limit errors).
    pub fn with_retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.retry = RetryPolicy::new(max_attempts, delay)
            .with_retry_condition(|error| matches!(error, KeyCheckError::RateLimited(_)));
        self
    }

    async fn check_balance(&self, key: &ApiKey) -> Result<DeepSeekDetails, KeyCheckError> {
        let response = self
            .http
            .get(format!("{}/user/balance", self.base_url))
            .bearer_auth(key.secret())
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(KeyCheckError::RateLimited("DeepSeek throttled".into()));
        }
        if !response.status().is_success() {
            return Err(KeyCheckError::api_error(
                response.status().as_u16(),
                "Invalid DeepSeek key",
            ));
        }

        let body: serde_json::Value = response.json().await?;
        let mut details = DeepSeekDetails::default();

        if let Some(infos) = body.get("balance_infos").and_then(|v| v.as_array()) {
            for info in infos {
                if let Some(balance) = info.get("total_balance").and_then(|v| v.as_str()) {
                    details.balance = Some(format!("${balance} USD"));
                    details.available = balance.parse::<f64>().map(|b| b > 0.0).unwrap_or(false);
                    break;
                }
            }
        }

        Ok(details)
    }
}

#[async_trait]
impl KeyValidator for DeepSeekValidator {
    fn provider(&self) -> Provider {
        Provider::DeepSeek
    }

    async fn validate_key(
        &self,
        mut key: ApiKey,
        _options: &ValidationOptions,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError> {
        let saw_throttle = AtomicBool::new(false);
        let outcome = self
            .retry
            .execute(cancel, || {
                let attempt = self.check_balance(&key);
                let saw_throttle = &saw_throttle;
                async move {
                    match attempt.await {
                        Err(error @ KeyCheckError::RateLimited(_)) => {
                            saw_throttle.store(true, Ordering::Relaxed);
                            Err(error)
                        }
                        other => other,
                    }
                }
            })
            .await;

        match outcome {
            Ok(mut details) => {
                details.rate_limited = saw_throttle.load(Ordering::Relaxed);
                key.details = KeyDetails::DeepSeek(details);
                Ok(ValidationResult::valid(key))
            }
            Err(KeyCheckError::RateLimited(_)) => {
                Ok(ValidationResult::invalid("DeepSeek rate limited after retries"))
            }
            Err(KeyCheckError::ApiError { .. }) => {
                Ok(ValidationResult::invalid("Invalid DeepSeek key"))
            }
            Err(error) => Err(error),
        }
    }
}
