//! AI21 validator: account probe.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::types::{Ai21Details, ApiKey, KeyDetails, Provider, ValidationOptions, ValidationResult};

use super::KeyValidator;

const API_URL: &str = "https://api.ai21.com/studio/v1";

pub struct Ai21Validator {
    http: reqwest::Client,
    base_url: String,
}

impl Ai21Validator {
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
impl KeyValidator for Ai21Validator {
    fn provider(&self) -> Provider {
        Provider::Ai21
    }

    async fn validate_key(
        &self,
        mut key: ApiKey,
        _options: &ValidationOptions,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError> {
        let response = self
            .http
            .get(format!("{}/account", self.base_url))
            .bearer_auth(key.secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(ValidationResult::invalid("Invalid AI21 key"));
        }

        let body: serde_json::Value = response.json().await?;
        let mut details = Ai21Details::default();
        if let Some(trial_elapsed) = body.get("trial_elapsed").and_then(|v| v.as_bool()) {
            details.trial_elapsed = trial_elapsed;
        }

        key.details = KeyDetails::Ai21(details);
        Ok(ValidationResult::valid(key))
    }
}
