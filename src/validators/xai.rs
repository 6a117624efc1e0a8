//! xAI validator: API key management endpoint.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::types::{ApiKey, KeyDetails, Provider, ValidationOptions, ValidationResult, XaiDetails};

use super::KeyValidator;

const API_URL: &str = "https://api.x.ai/v1";

pub struct XaiValidator {
    http: reqwest::Client,
    base_url: String,
}

impl XaiValidator {
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
impl KeyValidator for XaiValidator {
    fn provider(&self) -> Provider {
        Provider::Xai
    }

    async fn validate_key(
        &self,
        mut key: ApiKey,
        _options: &ValidationOptions,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError> {
        let response = self
            .http
            .get(format!("{}/api-key", self.base_url))
            .bearer_auth(key.secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(ValidationResult::invalid("Invalid XAI key"));
        }

        let body: serde_json::Value = response.json().await?;
        let mut details = XaiDetails::default();

        let flag = |name: &str| body.get(name).and_then(|v| v.as_bool()).unwrap_or(false);
        details.blocked =
            flag("api_key_blocked") || flag("api_key_disabled") || flag("team_blocked");

        key.details = KeyDetails::Xai(details);
        Ok(ValidationResult::valid(key))
    }
}
