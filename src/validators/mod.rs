//! Validator Adapters
//!
//! One adapter per provider, each implementing [`KeyValidator`]: perform the
//! provider's network validation call and populate the key's detail payload.
//! Adapters are standalone units composed with the shared cache/governor
//! wrapper ([`Governed`]) — no inheritance, no shared base state.
//!
//! Adapter authors: return failure results for rejected credentials; reserve
//! `Err` for transport-level trouble. Either way the wrapper converts every
//! error into a failure-shaped result before it reaches the orchestrator.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::cache::{ValidationCache, cache_key};
use crate::config::ProviderLimits;
use crate::error::KeyCheckError;
use crate::governor::ConcurrencyGovernor;
use crate::types::{ApiKey, Provider, ValidationOptions, ValidationResult};

mod ai21;
mod anthropic;
mod aws;
mod azure;
mod deepseek;
mod elevenlabs;
mod makersuite;
mod mistral;
mod openai;
mod openrouter;
mod vertexai;
mod xai;

pub use ai21::Ai21Validator;
pub use anthropic::AnthropicValidator;
pub use aws::AwsValidator;
pub use azure::AzureValidator;
pub use deepseek::DeepSeekValidator;
pub use elevenlabs::ElevenLabsValidator;
pub use makersuite::MakerSuiteValidator;
pub use mistral::MistralValidator;
pub use openai::OpenAiValidator;
pub use openrouter::OpenRouterValidator;
pub use vertexai::VertexAiValidator;
pub use xai::XaiValidator;

/// Capability contract implemented once per provider.
#[async_trait]
pub trait KeyValidator: Send + Sync {
    /// The provider this adapter validates keys for.
    fn provider(&self) -> Provider;

    /// Validate `key` against the provider's API, filling in its details.
    ///
    /// The adapter owns `key` exclusively for the duration of the call and
    /// hands it back inside a successful result.
    async fn validate_key(
        &self,
        key: ApiKey,
        options: &ValidationOptions,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, KeyCheckError>;
}

/// The uniform wrapper composed around every adapter: cache-aside lookup,
/// bounded admission, timeout, timing, and error-to-result conversion.
pub struct Governed {
    inner: Arc<dyn KeyValidator>,
    governor: ConcurrencyGovernor,
    cache: Arc<dyn ValidationCache>,
    cache_ttl: std::time::Duration,
    limits: ProviderLimits,
}

impl Governed {
    pub fn new(
        inner: Arc<dyn KeyValidator>,
        limits: ProviderLimits,
        cache: Arc<dyn ValidationCache>,
        cache_ttl: std::time::Duration,
    ) -> Self {
        Self {
            governor: ConcurrencyGovernor::new(limits.max_concurrent),
            inner,
            cache,
            cache_ttl,
            limits,
        }
    }

    pub fn provider(&self) -> Provider {
        self.inner.provider()
    }

    /// Governor visibility for stress tests and diagnostics.
    pub fn governor(&self) -> &ConcurrencyGovernor {
        &self.governor
    }

    /// Run one validation through the full wrapper pipeline.
    ///
    /// A cache hit returns immediately without touching the governor or the
    /// network. On a miss the call is admitted, executed under the
    /// per-request timeout, timed, and — when valid — written back to the
    /// cache with the configured TTL.
    pub async fn validate(
        &self,
        key: ApiKey,
        options: &ValidationOptions,
        cancel: &CancellationToken,
    ) -> ValidationResult {
        let provider = key.provider;
        let started = Instant::now();

        let cache_slot = options
            .use_cache
            .then(|| cache_key(provider, key.secret()));

        if let Some(slot) = &cache_slot {
            if let Some(hit) = self.cache.get(slot).await {
                tracing::debug!(%provider, "validation cache hit");
                return hit;
            }
        }

        let permit = match self.governor.admit(cancel).await {
            Ok(permit) => permit,
            Err(error) => {
                return ValidationResult::invalid(error.to_string())
                    .with_duration(started.elapsed());
            }
        };

        let timeout = if options.timeout_seconds > 0 {
            std::time::Duration::from_secs(options.timeout_seconds)
        } else {
            self.limits.timeout
        };
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(KeyCheckError::Cancelled),
            attempt = tokio::time::timeout(timeout, self.inner.validate_key(key, options, cancel)) => {
                match attempt {
                    Ok(inner) => inner,
                    Err(_) => Err(KeyCheckError::Timeout(timeout.as_secs())),
                }
            }
        };
        drop(permit);

        let result = match outcome {
            Ok(result) => result,
            Err(error) => {
                tracing::debug!(%provider, error = %error, "validation failed");
                ValidationResult::invalid(error.to_string())
            }
        };
        let result = result.with_duration(started.elapsed());

        if result.is_valid {
            if let Some(slot) = cache_slot {
                self.cache.set(slot, result.clone(), self.cache_ttl).await;
            }
        }

        result
    }
}

/// Build the full adapter set against one shared HTTP client, wiring the
/// throttle-retry settings into the adapters that loop on rate limits.
///
/// Must stay in lockstep with [`Provider::ALL`]; the orchestrator warns at
/// startup when the pairing is incomplete.
pub fn default_validators(
    http: reqwest::Client,
    settings: &crate::config::ValidationSettings,
) -> Vec<Arc<dyn KeyValidator>> {
    let anthropic = settings.limits_for(Provider::Anthropic);
    let deepseek = settings.limits_for(Provider::DeepSeek);

    vec![
        Arc::new(OpenAiValidator::new(http.clone())),
        Arc::new(
            AnthropicValidator::new(http.clone())
                .with_retry(anthropic.retry_count, anthropic.retry_delay),
        ),
        Arc::new(Ai21Validator::new(http.clone())),
        Arc::new(MakerSuiteValidator::new(http.clone())),
        Arc::new(AwsValidator::new(http.clone())),
        Arc::new(AzureValidator::new(http.clone())),
        Arc::new(VertexAiValidator::new(http.clone())),
        Arc::new(MistralValidator::new(http.clone())),
        Arc::new(OpenRouterValidator::new(http.clone())),
        Arc::new(ElevenLabsValidator::new(http.clone())),
        Arc::new(
            DeepSeekValidator::new(http.clone())
                .with_retry(deepseek.retry_count, deepseek.retry_delay),
        ),
        Arc::new(XaiValidator::new(http)),
    ]
}
