//! OpenRouter validator: key metadata endpoint.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::types::{
    ApiKey, KeyDetails, OpenRouterDetails, Provider, ValidationOptions, ValidationResult,
};

use super::KeyValidator;

const API_URL: &str = "https://openrouter.ai/api/v1";

pub struct OpenRouterValidator {
    http: reqwest::Client,
    base_url: String,
}

impl OpenRouterValidator {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl KeyValidator for OpenRouterValidator {
    fn provider(&self) -> Provider {
        Provider::OpenRouter
    }

    async fn validate_key(
        &self,
        mut key: ApiKey,
        _options: &ValidationOptions,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError> {
        let response = self
            .http
            .get(format!("{}/auth/key", self.base_url))
            .bearer_auth(key.secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(ValidationResult::invalid("Invalid OpenRouter key"));
        }

        let body: serde_json::Value = response.json().await?;
        let mut details = OpenRouterDetails::default();

        if let Some(data) = body.get("data") {
            if let Some(usage) = data.get("usage").and_then(|v| v.as_f64()) {
                details.usage = usage;
            }
            if let Some(limit) = data.get("limit").and_then(|v| v.as_f64()) {
                details.credit_limit = limit;
            }
            if let Some(requests) = data
                .get("rate_limit")
                .and_then(|v| v.get("requests"))
                .and_then(|v| v.as_u64())
            {
                details.rpm = requests as u32;
            }
            if let Some(free_tier) = data.get("is_free_tier").and_then(|v| v.as_bool()) {
                details.bought_credits = !free_tier;
            }

            details.balance = details.credit_limit - details.usage;
            details.limit_reached = details.balance <= 0.0;
        }

        key.details = KeyDetails::OpenRouter(details);
        Ok(ValidationResult::valid(key))
    }
}
