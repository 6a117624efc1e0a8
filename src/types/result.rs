//! Validation outcome.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::ApiKey;

/// Outcome of one validation attempt.
///
/// Invariant: a valid result carries `key_info` and no `error_message`; an
/// invalid result carries `error_message` and no `key_info`. Construct
/// through [`ValidationResult::valid`] / [`ValidationResult::invalid`] to
/// keep that invariant. Immutable after construction apart from the duration
/// bookkeeping done by the wrapper layer.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// The key with its discovered details. Present only when valid.
    pub key_info: Option<ApiKey>,
    /// Failure description. Present only when invalid.
    pub error_message: Option<String>,
    /// When this result was produced.
    pub validated_at: DateTime<Utc>,
    /// Wall-clock time the validation took.
    pub duration: Duration,
}

impl ValidationResult {
    /// A successful validation carrying the populated key.
    pub fn valid(key: ApiKey) -> Self {
        Self {
            is_valid: true,
            key_info: Some(key),
            error_message: None,
            validated_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    /// A failed validation with a user-facing message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            key_info: None,
            error_message: Some(message.into()),
            validated_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    /// Attach the elapsed wall-clock time. Called once by the wrapper layer.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Outcome equality ignoring the timestamp/duration bookkeeping fields.
    /// Used to assert cache idempotence.
    pub fn same_outcome(&self, other: &Self) -> bool {
        self.is_valid == other.is_valid
            && self.error_message == other.error_message
            && match (&self.key_info, &other.key_info) {
                (Some(a), Some(b)) => a.provider == b.provider && a.details == b.details,
                (None, None) => true,
                _ => false,
            }
    }
}
