//! Process-wide validation settings.
//!
//! Built once at startup and immutable afterwards; the orchestrator, the
//! governors, and the background queue are all constructed from this table.

use std::collections::HashMap;
use std::time::Duration;

use crate::types::Provider;

/// Per-provider admission, retry, and timeout limits.
#[derive(Debug, Clone)]
pub struct ProviderLimits {
    /// Concurrent in-flight validations the provider tolerates.
    pub max_concurrent: usize,
    /// Attempt ceiling for the rate-limit retry loop.
    pub retry_count: u32,
    /// Fixed pause between retry attempts.
    pub retry_delay: Duration,
    /// Wall-clock budget for one validation.
    pub timeout: Duration,
}

impl Default for ProviderLimits {
    fn default() -> Self {
        Self {
            max_concurrent: 1_000,
            retry_count: 5,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ProviderLimits {
    fn with_concurrency(max_concurrent: usize) -> Self {
        Self {
            max_concurrent,
            ..Self::default()
        }
    }
}

/// Top-level settings for the validation core.
#[derive(Debug, Clone)]
pub struct ValidationSettings {
    /// How long a successful result stays cached.
    pub cache_ttl: Duration,
    /// Entry bound for the in-memory cache.
    pub cache_capacity: usize,
    /// Capacity of the background work queue.
    pub queue_capacity: usize,
    /// Worker routines draining the background queue.
    pub worker_count: usize,
    limits: HashMap<Provider, ProviderLimits>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        // Admission capacities mirror what the providers tolerate in
        // practice: the large inference platforms take thousands of
        // concurrent probes, the aggressively rate-limited ones only tens.
        let mut limits = HashMap::new();
        limits.insert(Provider::OpenAi, ProviderLimits::with_concurrency(1_500));
        limits.insert(
            Provider::Anthropic,
            ProviderLimits {
                max_concurrent: 1_500,
                retry_count: 20,
                retry_delay: Duration::from_secs(1),
                ..ProviderLimits::default()
            },
        );
        limits.insert(Provider::Xai, ProviderLimits::with_concurrency(1_500));
        limits.insert(Provider::Ai21, ProviderLimits::with_concurrency(1_000));
        limits.insert(Provider::Mistral, ProviderLimits::with_concurrency(1_000));
        limits.insert(Provider::OpenRouter, ProviderLimits::with_concurrency(1_000));
        limits.insert(Provider::ElevenLabs, ProviderLimits::with_concurrency(1_000));
        limits.insert(Provider::Aws, ProviderLimits::with_concurrency(1_000));
        limits.insert(Provider::Azure, ProviderLimits::with_concurrency(500));
        limits.insert(Provider::VertexAi, ProviderLimits::with_concurrency(500));
        limits.insert(Provider::MakerSuite, ProviderLimits::with_concurrency(50));
        limits.insert(
            Provider::DeepSeek,
            ProviderLimits {
                max_concurrent: 50,
                retry_count: 4,
                retry_delay: Duration::from_secs(2),
                ..ProviderLimits::default()
            },
        );

        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 10_000,
            queue_capacity: 10_000,
            worker_count: parallelism * 2,
            limits,
        }
    }
}

impl ValidationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits for `provider`; falls back to the generic defaults for a
    /// provider with no explicit entry.
    pub fn limits_for(&self, provider: Provider) -> ProviderLimits {
        self.limits.get(&provider).cloned().unwrap_or_default()
    }

    /// Override the limits for one provider.
    pub fn set_limits(&mut self, provider: Provider, limits: ProviderLimits) {
        self.limits.insert(provider, limits);
    }

    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub const fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }
}
