//! OpenAI validator: model enumeration, attribute probing, and organization
//! lookup.
//!
//! Validation runs in three steps. The model listing classifies what the key
//! can reach (fine-tunes, off-catalog ids, the rare flagship ids, the
//! flagship "non-slop" subset). A zero-token chat probe then distinguishes
//! terminated/billing-dead keys from quota-less and fully live ones, and
//! yields the rate-limit headers the tier is derived from. Organization
//! enumeration is best-effort and never fails the validation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::StatusCode;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::types::{
    ApiKey, KeyDetails, OpenAiDetails, Provider, ValidationOptions, ValidationResult,
};

use super::KeyValidator;

const API_URL: &str = "https://api.openai.com/v1";

/// Catalog of model ids every ordinary key sees. Anything outside this set
/// (that is not a fine-tune) marks the key as carrying extra models.
const STANDARD_MODEL_IDS: &[&str] = &[
    "omni-moderation-2024-09-26",
    "gpt-4o-mini-audio-preview-2024-12-17",
    "dall-e-3",
    "dall-e-2",
    "gpt-4o-audio-preview-2024-10-01",
    "o1",
    "gpt-4o-audio-preview",
    "gpt-4o-mini-realtime-preview-2024-12-17",
    "o1-2024-12-17",
    "gpt-4-0314",
    "gpt-4o-mini-realtime-preview",
    "o1-mini-2024-09-12",
    "o1-preview-2024-09-12",
    "o1-mini",
    "o1-preview",
    "gpt-4o-mini-audio-preview",
    "whisper-1",
    "gpt-4-turbo",
    "gpt-4o-realtime-preview-2024-10-01",
    "gpt-4",
    "babbage-002",
    "gpt-4-turbo-preview",
    "tts-1-hd-1106",
    "gpt-4-0125-preview",
    "gpt-4o-audio-preview-2024-12-17",
    "tts-1-hd",
    "gpt-4o-mini-2024-07-18",
    "gpt-4o-2024-08-06",
    "gpt-4o",
    "tts-1",
    "tts-1-1106",
    "gpt-4-turbo-2024-04-09",
    "davinci-002",
    "gpt-3.5-turbo-1106",
    "gpt-4o-mini",
    "gpt-4o-2024-05-13",
    "gpt-3.5-turbo-instruct",
    "chatgpt-4o-latest",
    "gpt-3.5-turbo-instruct-0914",
    "gpt-3.5-turbo-0125",
    "gpt-4o-realtime-preview-2024-12-17",
    "gpt-3.5-turbo",
    "gpt-3.5-turbo-16k-0613",
    "gpt-4o-realtime-preview",
    "gpt-3.5-turbo-16k",
    "text-embedding-3-small",
    "gpt-4o-2024-11-20",
    "gpt-4-1106-preview",
    "text-embedding-ada-002",
    "text-embedding-3-large",
    "o3-mini-2025-01-31",
    "gpt-4-0613",
    "o3-mini",
    "omni-moderation-latest",
    "gpt-4-base",
    "o1-pro",
    "o1-pro-2025-03-19",
    "gpt-4o-transcribe",
    "computer-use-preview",
    "computer-use-preview-2025-03-11",
    "gpt-4o-search-preview",
    "gpt-4o-search-preview-2025-03-11",
    "gpt-4o-mini-search-preview",
    "gpt-4o-mini-search-preview-2025-03-11",
    "gpt-4o-mini-transcribe",
    "gpt-4o-mini-tts",
    "o3",
    "o4-mini",
    "o3-2025-04-16",
    "o4-mini-2025-04-16",
    "gpt-4.1-mini",
    "gpt-4.1-mini-2025-04-14",
    "gpt-4.1-nano",
    "gpt-4.1-nano-2025-04-14",
    "gpt-4.1",
    "gpt-4.1-2025-04-14",
    "gpt-image-1",
    "codex-mini-latest",
    "gpt-4o-realtime-preview-2025-06-03",
    "gpt-4o-audio-preview-2025-06-03",
    "o3-pro",
    "o3-pro-2025-06-10",
    "o3-deep-research",
    "o3-deep-research-2025-06-26",
    "o4-mini-deep-research",
    "o4-mini-deep-research-2025-06-26",
    "gpt-5-mini",
    "gpt-5-mini-2025-08-07",
    "gpt-5-nano",
    "gpt-5-nano-2025-08-07",
    "gpt-5",
    "gpt-5-2025-08-07",
    "gpt-5-chat-latest",
    "gpt-audio-2025-08-28",
    "gpt-realtime-2025-08-28",
    "gpt-audio",
    "gpt-realtime",
];

/// Flagship ids whose presence means the key is not commodity-only.
const NON_SLOP_STANDARD: &[&str] = &[
    "gpt-5",
    "gpt-5-chat-latest",
    "o3",
    "gpt-4.1",
    "chatgpt-4o-latest",
    "gpt-4o",
];

/// Rare ids that only a handful of accounts ever see.
const RARE_MODEL_IDS: &[&str] = &["gpt-4-base", "gpt-5-alpha-max", "gpt-4.5-preview"];

lazy_static! {
    static ref STANDARD_SET: std::collections::HashSet<&'static str> =
        STANDARD_MODEL_IDS.iter().copied().collect();
}

fn tier_from_tpm(tpm: u64) -> &'static str {
    match tpm {
        40_000_000.. => "Tier 5",
        4_000_000.. => "Tier 4",
        2_000_000.. => "Tier 3",
        1_000_000.. => "Tier 2",
        500_000.. => "Tier 1",
        _ => "Free/Unknown",
    }
}

pub struct OpenAiValidator {
    http: reqwest::Client,
    base_url: String,
}

impl OpenAiValidator {
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

    /// Step 1: enumerate and classify reachable models. Returns false when
    /// the listing rejects the key outright.
    async fn fetch_models(
        &self,
        key: &ApiKey,
        details: &mut OpenAiDetails,
    ) -> Result<bool, KeyCheckError> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(key.secret())
            .send()
            .await?;

        if response.status() == StatusCode::FORBIDDEN {
            // Valid key without model-listing access.
            details.model = Some("gpt-5".to_string());
            details.access_to_model_listing = false;
            return Ok(true);
        }
        if !response.status().is_success() {
            return Ok(false);
        }

        let body: serde_json::Value = response.json().await?;
        let models = body
            .get("data")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut accessible: BTreeSet<String> = BTreeSet::new();

        for model in &models {
            let Some(model_id) = model.get("id").and_then(|v| v.as_str()) else {
                continue;
            };

            if model_id.contains("ft:") {
                details.has_special_models = true;
            } else if !STANDARD_SET.contains(model_id) && !model_id.contains(":ft-") {
                details.extra_models = true;
                details.extra_model_list.insert(model_id.to_string());
            }

            if RARE_MODEL_IDS.contains(&model_id) {
                details.the_one = true;
                details.slop = false;
            }
            if model_id == "gpt-4-32k" || model_id == "gpt-4-32k-0613" {
                details.real_32k = true;
                details.slop = false;
            }
            if NON_SLOP_STANDARD.contains(&model_id) {
                details.slop = false;
                details.model = Some(model_id.to_string());
                accessible.insert(model_id.to_string());
            }
        }

        details.missing_models = NON_SLOP_STANDARD
            .iter()
            .filter(|id| !accessible.contains(**id))
            .map(|id| id.to_string())
            .collect();

        Ok(true)
    }

    /// Step 2: zero-token chat probe classifying quota state and reading the
    /// rate-limit headers. Returns false when the account is terminated.
    async fn fetch_attributes(
        &self,
        key: &ApiKey,
        options: &ValidationOptions,
        details: &mut OpenAiDetails,
    ) -> Result<bool, KeyCheckError> {
        let model = details.model.clone().unwrap_or_else(|| "gpt-4o".to_string());
        let request_body = json!({
            "model": model,
            "messages": [{ "role": "user", "content": "" }],
            "max_completion_tokens": 0
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key.secret())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            // Valid but restricted.
            return Ok(true);
        }

        if status == StatusCode::BAD_REQUEST || status == StatusCode::TOO_MANY_REQUESTS {
            let rpm_header = response
                .headers()
                .get("x-ratelimit-limit-requests")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u32>().ok());
            let tpm_header = response
                .headers()
                .get("x-ratelimit-limit-tokens")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let body: serde_json::Value = response.json().await?;
            let error_type = body
                .get("error")
                .and_then(|e| e.get("type"))
                .and_then(|t| t.as_str())
                .unwrap_or_default();

            match error_type {
                "access_terminated" | "billing_not_active" => return Ok(false),
                "insufficient_quota" => {
                    details.has_quota = false;
                }
                "invalid_request_error" => {
                    details.has_quota = true;
                    if let Some(rpm) = rpm_header {
                        details.rpm = rpm;
                    }
                    if let Some(tpm) = tpm_header {
                        details.tier = Some(tier_from_tpm(tpm).to_string());
                    }
                    if options.verify_org {
                        details.id_verified = self.check_id_verified(key).await;
                    }
                    details.slop = false;
                }
                _ => {}
            }

            return Ok(true);
        }

        // A zero-token probe should never succeed outright; a 2xx here (or a
        // gateway-side 5xx) means the attributes could not be verified.
        Ok(!status.is_success()
            && status != StatusCode::INTERNAL_SERVER_ERROR
            && status != StatusCode::BAD_GATEWAY)
    }

    /// Identity verification probe: streaming access to `o3` is gated on a
    /// verified organization.
    async fn check_id_verified(&self, key: &ApiKey) -> bool {
        let request_body = json!({
            "model": "o3",
            "messages": [{ "role": "user", "content": "" }],
            "max_completion_tokens": 1,
            "stream": true
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key.secret())
            .json(&request_body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => match response.text().await {
                Ok(body) => !body.contains("organization must complete"),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    /// Step 3: best-effort organization enumeration.
    async fn fetch_organizations(&self, key: &ApiKey, details: &mut OpenAiDetails) {
        let response = match self
            .http
            .get(format!("{}/organizations", self.base_url))
            .bearer_auth(key.secret())
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            _ => return,
        };

        let Ok(body) = response.json::<serde_json::Value>().await else {
            return;
        };
        let Some(orgs) = body.get("data").and_then(|v| v.as_array()) else {
            return;
        };

        for org in orgs {
            let Some(org_id) = org.get("id").and_then(|v| v.as_str()) else {
                continue;
            };
            details.organizations.push(org_id.to_string());
            if org.get("is_default").and_then(|v| v.as_bool()) == Some(true) {
                details.default_org = Some(org_id.to_string());
            }
        }
    }
}

#[async_trait]
impl KeyValidator for OpenAiValidator {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn validate_key(
        &self,
        mut key: ApiKey,
        options: &ValidationOptions,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError> {
        let mut details = OpenAiDetails::default();

        if options.check_models && !self.fetch_models(&key, &mut details).await? {
            return Ok(ValidationResult::invalid(
                "Unable to retrieve models - invalid key",
            ));
        }

        if !self.fetch_attributes(&key, options, &mut details).await? {
            return Ok(ValidationResult::invalid("Unable to verify key attributes"));
        }

        self.fetch_organizations(&key, &mut details).await;

        key.details = KeyDetails::OpenAi(details);
        Ok(ValidationResult::valid(key))
    }
}
