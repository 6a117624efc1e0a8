//! Retry Mechanism Module
//!
//! Bounded, fixed-delay retries for provider calls that signal throttling.
//! Providers that throttle aggressively get their own attempt ceiling and
//! pause (Anthropic: 20 × 1s, DeepSeek: 4 × 2s); everything else goes
//! through uniform defaults. Deliberately not exponential: throttled
//! validation probes recover on a flat cadence, and a bounded ceiling keeps
//! worst-case latency predictable.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::error::KeyCheckError;

/// Retry policy: attempt ceiling, flat delay, and a retryability predicate.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
    /// Custom retry condition; defaults to [`KeyCheckError::is_retryable`].
    pub retry_condition: Option<fn(&KeyCheckError) -> bool>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
            retry_condition: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            retry_condition: None,
        }
    }

    pub fn with_retry_condition(mut self, condition: fn(&KeyCheckError) -> bool) -> Self {
        self.retry_condition = Some(condition);
        self
    }

    fn should_retry(&self, error: &KeyCheckError) -> bool {
        match self.retry_condition {
            Some(condition) => condition(error),
            None => error.is_retryable(),
        }
    }

    /// Run `operation` until it succeeds, fails terminally, exhausts the
    /// attempt ceiling, or the caller cancels.
    ///
    /// Cancellation during the inter-attempt pause surfaces as
    /// [`KeyCheckError::Cancelled`] without issuing another attempt.
    pub async fn execute<F, Fut, T>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<T, KeyCheckError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, KeyCheckError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            if cancel.is_cancelled() {
                return Err(KeyCheckError::Cancelled);
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !self.should_retry(&error) {
                        return Err(error);
                    }
                    tracing::debug!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "retryable failure, pausing before next attempt"
                    );
                    last_error = Some(error);

                    if attempt + 1 < self.max_attempts {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return Err(KeyCheckError::Cancelled),
                            _ = sleep(self.delay) => {}
                        }
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| KeyCheckError::InternalError("retry loop ran no attempts".into())))
    }
}
