//! Request-surface contract types.
//!
//! Serde shapes for the HTTP layer that fronts the orchestrator. The crate
//! ships the types and the mapping from core results; the transport itself
//! lives outside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{KeyDetails, Provider, ValidationOptions, ValidationResult};

/// Single-key validation request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyRequest {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ValidationOptions>,
}

/// Batch validation request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchValidateRequest {
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ValidationOptions>,
}

/// Per-key validation outcome as served to clients. The raw secret never
/// appears here; only the discovered details do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<KeyDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub validated_at: DateTime<Utc>,
    pub validation_duration_ms: f64,
}

impl From<ValidationResult> for ValidationResponse {
    fn from(result: ValidationResult) -> Self {
        let provider = result.key_info.as_ref().map(|key| key.provider);
        Self {
            is_valid: result.is_valid,
            provider,
            key_info: result.key_info.map(|key| key.details),
            error_message: result.error_message,
            validated_at: result.validated_at,
            validation_duration_ms: result.duration.as_secs_f64() * 1_000.0,
        }
    }
}

/// Batch-level envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchValidationResponse {
    pub total_keys: usize,
    pub valid_keys: usize,
    pub invalid_keys: usize,
    pub results: Vec<ValidationResponse>,
    pub total_duration_ms: f64,
}

impl BatchValidationResponse {
    pub fn from_results(results: Vec<ValidationResult>, total_duration_ms: f64) -> Self {
        let results: Vec<ValidationResponse> =
            results.into_iter().map(ValidationResponse::from).collect();
        let valid_keys = results.iter().filter(|r| r.is_valid).count();
        Self {
            total_keys: results.len(),
            valid_keys,
            invalid_keys: results.len() - valid_keys,
            results,
            total_duration_ms,
        }
    }
}
