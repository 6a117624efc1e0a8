//! MakerSuite (Google AI Studio) validator: model listing with URL-keyed auth.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::types::{
    ApiKey, KeyDetails, MakerSuiteDetails, Provider, ValidationOptions, ValidationResult,
};

use super::KeyValidator;

const API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct MakerSuiteValidator {
    http: reqwest::Client,
    base_url: String,
}

impl MakerSuiteValidator {
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
impl KeyValidator for MakerSuiteValidator {
    fn provider(&self) -> Provider {
        Provider::MakerSuite
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
            .query(&[("key", key.secret())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(ValidationResult::invalid("Invalid MakerSuite key"));
        }

        // Quota attribution header only shows up on billed projects.
        let quota_user = response.headers().contains_key("x-goog-quota-user");

        let body: serde_json::Value = response.json().await?;
        let mut details = MakerSuiteDetails::default();

        if let Some(models) = body.get("models").and_then(|v| v.as_array()) {
            for model in models {
                if let Some(name) = model.get("name").and_then(|v| v.as_str()) {
                    details.models.push(name.to_string());
                }
            }
        }

        details.tier = Some(if quota_user { "Standard" } else { "Free" }.to_string());
        details.enabled_billing = details.models.len() > 3;

        key.details = KeyDetails::MakerSuite(details);
        Ok(ValidationResult::valid(key))
    }
}
