//! Validation Orchestrator
//!
//! Top-level coordinator: identifies the provider of each raw key, resolves
//! the registered adapter from a fixed table built at startup, and delegates
//! to the governed wrapper. Batch requests fan out fully independent
//! single-key validations and join them, preserving input order.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cache::{MemoryValidationCache, ValidationCache};
use crate::config::ValidationSettings;
use crate::error::KeyCheckError;
use crate::identify::identify;
use crate::types::{ApiKey, Provider, ValidationOptions, ValidationResult};
use crate::validators::{Governed, KeyValidator, default_validators};

/// Coordinates identification, adapter dispatch, and batch fan-out.
pub struct ValidationOrchestrator {
    validators: HashMap<Provider, Governed>,
}

impl ValidationOrchestrator {
    /// Build an orchestrator from explicit adapters.
    ///
    /// The adapter table is fixed after this call. A provider without an
    /// adapter is tolerated (lookups report it as unregistered), but logged:
    /// with the closed provider set it means the wiring is incomplete.
    pub fn new(
        settings: &ValidationSettings,
        cache: Arc<dyn ValidationCache>,
        validators: Vec<Arc<dyn KeyValidator>>,
    ) -> Self {
        let mut table = HashMap::new();
        for validator in validators {
            let provider = validator.provider();
            let governed = Governed::new(
                validator,
                settings.limits_for(provider),
                cache.clone(),
                settings.cache_ttl,
            );
            table.insert(provider, governed);
        }

        for provider in Provider::ALL {
            if !table.contains_key(&provider) {
                tracing::warn!(%provider, "no validator registered");
            }
        }

        Self { validators: table }
    }

    /// Build an orchestrator with the default adapter set, an in-memory
    /// cache, and a shared HTTP client.
    pub fn with_defaults(settings: ValidationSettings) -> Result<Self, KeyCheckError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("keywarden/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KeyCheckError::ConfigurationError(e.to_string()))?;
        let cache = Arc::new(MemoryValidationCache::new(settings.cache_capacity));
        Ok(Self::new(
            &settings,
            cache,
            default_validators(http, &settings),
        ))
    }

    /// Governed wrapper for `provider`, if registered. Test/diagnostic use.
    pub fn governed(&self, provider: Provider) -> Option<&Governed> {
        self.validators.get(&provider)
    }

    /// Validate one raw key string.
    pub async fn validate_single(
        &self,
        raw_key: &str,
        options: &ValidationOptions,
    ) -> ValidationResult {
        self.validate_single_with_cancel(raw_key, options, &CancellationToken::new())
            .await
    }

    /// Validate one raw key string under an external cancellation signal.
    pub async fn validate_single_with_cancel(
        &self,
        raw_key: &str,
        options: &ValidationOptions,
        cancel: &CancellationToken,
    ) -> ValidationResult {
        let Some(provider) = identify(raw_key) else {
            return ValidationResult::invalid(KeyCheckError::UnidentifiedKey.to_string());
        };

        let Some(governed) = self.validators.get(&provider) else {
            return ValidationResult::invalid(
                KeyCheckError::ProviderNotRegistered(provider).to_string(),
            );
        };

        let key = ApiKey::new(provider, raw_key);
        let result = governed.validate(key, options, cancel).await;
        tracing::debug!(
            %provider,
            is_valid = result.is_valid,
            duration_ms = result.duration.as_millis() as u64,
            "validation finished"
        );
        result
    }

    /// Validate a batch of raw key strings concurrently.
    ///
    /// Results come back in input order regardless of completion order; a
    /// failure of one key never affects another. Duplicate inputs are
    /// validated independently (dedup is a caller concern).
    pub async fn validate_batch(
        &self,
        keys: &[String],
        options: &ValidationOptions,
    ) -> Vec<ValidationResult> {
        self.validate_batch_with_cancel(keys, options, &CancellationToken::new())
            .await
    }

    /// Batch validation under an external cancellation signal.
    pub async fn validate_batch_with_cancel(
        &self,
        keys: &[String],
        options: &ValidationOptions,
        cancel: &CancellationToken,
    ) -> Vec<ValidationResult> {
        let tasks = keys
            .iter()
            .map(|key| self.validate_single_with_cancel(key, options, cancel));
        futures::future::join_all(tasks).await
    }
}
