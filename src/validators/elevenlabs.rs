//! ElevenLabs validator: subscription probe.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::types::{
    ApiKey, ElevenLabsDetails, KeyDetails, Provider, ValidationOptions, ValidationResult,
};

use super::KeyValidator;

const API_URL: &str = "https://api.elevenlabs.io/v1";

pub struct ElevenLabsValidator {
    http: reqwest::Client,
    base_url: String,
}

impl ElevenLabsValidator {
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
impl KeyValidator for ElevenLabsValidator {
    fn provider(&self) -> Provider {
        Provider::ElevenLabs
    }

    async fn validate_key(
        &self,
        mut key: ApiKey,
        _options: &ValidationOptions,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError> {
        let response = self
            .http
            .get(format!("{}/user/subscription", self.base_url))
            .header("xi-api-key", key.secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(ValidationResult::invalid("Invalid ElevenLabs key"));
        }

        let body: serde_json::Value = response.json().await?;
        let mut details = ElevenLabsDetails::default();

        if let Some(tier) = body.get("tier").and_then(|v| v.as_str()) {
            details.tier = Some(tier.to_string());
        } else {
            details.tier = Some("Free".to_string());
        }
        if let Some(count) = body.get("character_count").and_then(|v| v.as_i64()) {
            details.characters_left = count;
        }
        if let Some(limit) = body.get("character_limit").and_then(|v| v.as_i64()) {
            details.unlimited = limit < 0 || limit > 10_000_000;
        }
        if let Some(voice_limit) = body
            .get("professional_voice_limit")
            .and_then(|v| v.as_u64())
        {
            details.pro_voice_limit = voice_limit as u32;
        }
        details.usage = Some(format!("{} characters remaining", details.characters_left));

        key.details = KeyDetails::ElevenLabs(details);
        Ok(ValidationResult::valid(key))
    }
}
