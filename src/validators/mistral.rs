//! Mistral validator: model listing probe.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::types::{
    ApiKey, KeyDetails, MistralDetails, Provider, ValidationOptions, ValidationResult,
};

use super::KeyValidator;

const API_URL: &str = "https://api.mistral.ai/v1";

pub struct MistralValidator {
    http: reqwest::Client,
    base_url: String,
}

impl MistralValidator {
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
impl KeyValidator for MistralValidator {
    fn provider(&self) -> Provider {
        Provider::Mistral
    }

    async fn validate_key(
        &self,
        mut key: ApiKey,
        _options: &ValidationOptions,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(key.secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(ValidationResult::invalid("Invalid Mistral key"));
        }

        let body: serde_json::Value = response.json().await?;
        let mut details = MistralDetails::default();
        // Subscription inferred from a non-empty model list.
        if let Some(models) = body.get("data").and_then(|v| v.as_array()) {
            details.subbed = !models.is_empty();
        }

        key.details = KeyDetails::Mistral(details);
        Ok(ValidationResult::valid(key))
    }
}
