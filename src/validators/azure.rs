//! Azure OpenAI validator: deployment discovery and content-filter probe.
//!
//! An Azure "key" is the pair `endpoint:apikey`, where the endpoint may be a
//! bare resource name or a full URL.

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::types::{
    ApiKey, AzureDetails, KeyDetails, Provider, ValidationOptions, ValidationResult,
};

use super::KeyValidator;

const API_VERSION: &str = "2023-05-15";

pub struct AzureValidator {
    http: reqwest::Client,
    /// Test seam: when set, overrides the endpoint derived from the key.
    endpoint_override: Option<String>,
}

impl AzureValidator {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint_override: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_override = Some(endpoint.into());
        self
    }

    async fn check_content_filter(&self, endpoint: &str, api_key: &str, deployment: &str) -> bool {
        let url = format!(
            "{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={API_VERSION}"
        );
        let request_body = json!({
            "messages": [{ "role": "user", "content": "Hello" }],
            "max_tokens": 1
        });

        let response = self
            .http
            .post(url)
            .header("api-key", api_key)
            .json(&request_body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => match response.text().await {
                Ok(body) => !body.contains("content_filter"),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }
}

/// Rank a deployment's model for "best deployment" selection.
fn model_priority(model_name: &str) -> u8 {
    let lowered = model_name.to_lowercase();
    if lowered.contains("gpt-4") && lowered.contains("turbo") {
        3
    } else if lowered.contains("gpt-4") {
        2
    } else if lowered.contains("gpt-3.5") {
        1
    } else {
        0
    }
}

#[async_trait]
impl KeyValidator for AzureValidator {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    async fn validate_key(
        &self,
        mut key: ApiKey,
        _options: &ValidationOptions,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError> {
        let raw = key.secret().to_string();
        let parts: Vec<&str> = raw.split(':').collect();
        let [resource, api_key] = parts.as_slice() else {
            return Ok(ValidationResult::invalid(
                "Invalid Azure key format. Expected endpoint:apikey",
            ));
        };
        let (resource, api_key) = (resource.to_string(), api_key.to_string());

        let mut details = AzureDetails::default();
        details.endpoint = Some(resource.clone());

        let endpoint = match &self.endpoint_override {
            Some(endpoint) => endpoint.clone(),
            None if resource.starts_with("http") => resource.clone(),
            None => format!("https://{resource}.openai.azure.com"),
        };

        let response = self
            .http
            .get(format!(
                "{endpoint}/openai/deployments?api-version={API_VERSION}"
            ))
            .header("api-key", &api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(ValidationResult::invalid("Invalid Azure OpenAI credentials"));
        }

        let body: serde_json::Value = response.json().await?;

        if let Some(deployments) = body.get("data").and_then(|v| v.as_array()) {
            let mut best_priority = 0u8;

            for deployment in deployments {
                let Some(deployment_name) = deployment.get("id").and_then(|v| v.as_str()) else {
                    continue;
                };
                details.deployments.push(deployment_name.to_string());

                let Some(model_name) = deployment.get("model").and_then(|v| v.as_str()) else {
                    continue;
                };

                let priority = model_priority(model_name);
                if priority > best_priority {
                    best_priority = priority;
                    details.model = Some(model_name.to_string());
                    details.best_deployment = Some(deployment_name.to_string());
                }

                if priority == 3 {
                    details
                        .gpt4_turbo_deployments
                        .push(deployment_name.to_string());
                }
            }
        }

        if let Some(best) = details.best_deployment.clone() {
            details.unfiltered = self.check_content_filter(&endpoint, &api_key, &best).await;
        }

        key.details = KeyDetails::Azure(details);
        Ok(ValidationResult::valid(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ranking() {
        assert_eq!(model_priority("gpt-4-turbo"), 3);
        assert_eq!(model_priority("GPT-4"), 2);
        assert_eq!(model_priority("gpt-3.5-turbo"), 1);
        assert_eq!(model_priority("dall-e-3"), 0);
    }
}
