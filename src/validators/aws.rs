//! AWS validator: STS identity, IAM privilege probe, and Bedrock access.
//!
//! An AWS "key" is the pair `AKIA…:secret`. Request signing is a simplified
//! stand-in — it emits the SigV4 header shape without computing a real
//! signature. Production use swaps [`sign_request`] for a proper signing
//! implementation (an AWS SDK or signing crate); everything else in this
//! adapter is agnostic to that choice.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::RequestBuilder;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;
use crate::types::{ApiKey, AwsDetails, KeyDetails, Provider, ValidationOptions, ValidationResult};

use super::KeyValidator;

const DEFAULT_REGION: &str = "us-east-1";

pub struct AwsValidator {
    http: reqwest::Client,
    sts_override: Option<String>,
    iam_override: Option<String>,
    bedrock_override: Option<String>,
}

impl AwsValidator {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            sts_override: None,
            iam_override: None,
            bedrock_override: None,
        }
    }

    /// Test seam: point every service endpoint at one mock server.
    pub fn with_endpoints(
        mut self,
        sts: impl Into<String>,
        iam: impl Into<String>,
        bedrock: impl Into<String>,
    ) -> Self {
        self.sts_override = Some(sts.into());
        self.iam_override = Some(iam.into());
        self.bedrock_override = Some(bedrock.into());
        self
    }

    fn sts_url(&self, region: &str) -> String {
        self.sts_override
            .clone()
            .unwrap_or_else(|| format!("https://sts.{region}.amazonaws.com/"))
    }

    fn iam_url(&self) -> String {
        self.iam_override
            .clone()
            .unwrap_or_else(|| "https://iam.amazonaws.com/".to_string())
    }

    fn bedrock_url(&self, region: &str) -> String {
        self.bedrock_override
            .clone()
            .unwrap_or_else(|| format!("https://bedrock.{region}.amazonaws.com/foundation-models"))
    }

    async fn caller_identity(
        &self,
        access_key: &str,
        secret_key: &str,
        region: &str,
    ) -> Result<Option<String>, KeyCheckError> {
        let request = self
            .http
            .post(self.sts_url(region))
            .form(&[("Action", "GetCallerIdentity"), ("Version", "2011-06-15")]);
        let response = sign_request(request, access_key, secret_key, region, "sts")
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let content = response.text().await?;
        let username = extract_arn(&content)
            .map(|arn| arn.rsplit('/').next().unwrap_or("Unknown").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        Ok(Some(username))
    }

    async fn has_admin_privileges(&self, access_key: &str, secret_key: &str, region: &str) -> bool {
        let request = self.http.post(self.iam_url()).form(&[
            ("Action", "ListUsers"),
            ("Version", "2010-05-08"),
            ("MaxItems", "1"),
        ]);
        match sign_request(request, access_key, secret_key, region, "iam")
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn bedrock_access(
        &self,
        access_key: &str,
        secret_key: &str,
        region: &str,
    ) -> (bool, std::collections::BTreeMap<String, bool>) {
        let request = self.http.get(self.bedrock_url(region));
        let response = match sign_request(request, access_key, secret_key, region, "bedrock")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            _ => return (false, Default::default()),
        };

        let mut models = std::collections::BTreeMap::new();
        if let Ok(body) = response.json::<serde_json::Value>().await {
            if let Some(summaries) = body.get("modelSummaries").and_then(|v| v.as_array()) {
                for model in summaries {
                    if let Some(model_id) = model.get("modelId").and_then(|v| v.as_str()) {
                        models.insert(model_id.to_string(), true);
                    }
                }
            }
        }
        (true, models)
    }
}

/// Attach SigV4-shaped auth headers.
///
/// Stub: the credential scope is real, the signature is not. Swap for a
/// signing library before pointing this at live AWS endpoints.
fn sign_request(
    request: RequestBuilder,
    access_key: &str,
    _secret_key: &str,
    region: &str,
    service: &str,
) -> RequestBuilder {
    let now = Utc::now();
    let date_stamp = now.format("%Y%m%d");
    let amz_date = now.format("%Y%m%dT%H%M%SZ");

    let credential_scope = format!("{date_stamp}/{region}/{service}/aws4_request");
    let authorization = format!("AWS4-HMAC-SHA256 Credential={access_key}/{credential_scope}");

    request
        .header("X-Amz-Date", amz_date.to_string())
        .header("Authorization", authorization)
}

fn extract_arn(response_xml: &str) -> Option<&str> {
    let start = response_xml.find("<Arn>")? + "<Arn>".len();
    let end = response_xml.find("</Arn>")?;
    (end > start).then(|| &response_xml[start..end])
}

#[async_trait]
impl KeyValidator for AwsValidator {
    fn provider(&self) -> Provider {
        Provider::Aws
    }

    async fn validate_key(
        &self,
        mut key: ApiKey,
        _options: &ValidationOptions,
        _cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError> {
        let raw = key.secret().to_string();
        let parts: Vec<&str> = raw.split(':').collect();
        let [access_key, secret_key] = parts.as_slice() else {
            return Ok(ValidationResult::invalid(
                "Invalid AWS key format. Expected AKIA...:secret",
            ));
        };
        let (access_key, secret_key) = (access_key.to_string(), secret_key.to_string());

        let region = DEFAULT_REGION;
        let mut details = AwsDetails::default();
        details.region = Some(region.to_string());

        let Some(username) = self
            .caller_identity(&access_key, &secret_key, region)
            .await?
        else {
            return Ok(ValidationResult::invalid("Invalid AWS credentials"));
        };
        details.username = Some(username);
        details.useless = false;

        details.admin_priv = self
            .has_admin_privileges(&access_key, &secret_key, region)
            .await;

        let (bedrock_enabled, models) = self.bedrock_access(&access_key, &secret_key, region).await;
        details.bedrock_enabled = bedrock_enabled;
        details.models = models;
        if !details.bedrock_enabled {
            details.useless_reasons.push("Bedrock not enabled".to_string());
        }

        key.details = KeyDetails::Aws(details);
        Ok(ValidationResult::valid(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arn_extraction() {
        let xml = "<GetCallerIdentityResult><Arn>arn:aws:iam::123:user/alice</Arn></GetCallerIdentityResult>";
        assert_eq!(extract_arn(xml), Some("arn:aws:iam::123:user/alice"));
        assert_eq!(extract_arn("<Arn></Arn>"), None);
        assert_eq!(extract_arn("no tags here"), None);
    }
}
