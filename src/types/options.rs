//! Validation options.

use serde::{Deserialize, Serialize};

/// Per-request validation configuration.
///
/// Immutable once constructed; passed by value through the call chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Run the extra identity-verification sub-call where the provider
    /// supports one (currently OpenAI only).
    pub verify_org: bool,
    /// Enumerate accessible models where the provider supports it.
    pub check_models: bool,
    /// Consult and populate the validation cache.
    pub use_cache: bool,
    /// Overall wall-clock budget for one validation attempt.
    pub timeout_seconds: u64,
    /// Attempt ceiling for providers without a specific retry policy.
    pub retry_count: u32,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            verify_org: false,
            check_models: true,
            use_cache: true,
            timeout_seconds: 30,
            retry_count: 5,
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_verify_org(mut self, verify_org: bool) -> Self {
        self.verify_org = verify_org;
        self
    }

    pub const fn with_check_models(mut self, check_models: bool) -> Self {
        self.check_models = check_models;
        self
    }

    pub const fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub const fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub const fn with_retry_count(mut self, retries: u32) -> Self {
        self.retry_count = retries;
        self
    }
}
