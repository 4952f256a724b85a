//! # Retry With Exponential Backoff
//!
//! A generic wrapper around any asynchronous provider call. Text and image
//! requests reuse the same primitive with independent policies: media quota
//! windows are much longer, so image calls get fewer attempts and a longer
//! initial delay.

use crate::errors::AiError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Parameters for one retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Re-attempts after the first try. Zero means a single attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub factor: f64,
}

impl RetryPolicy {
    /// Default policy for text generation calls.
    pub const fn content() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            factor: 2.0,
        }
    }

    /// Default policy for image rendering calls.
    pub const fn image() -> Self {
        Self {
            max_retries: 1,
            initial_delay: Duration::from_secs(10),
            factor: 2.0,
        }
    }

    /// A single attempt, no sleeping. Used by tests and by callers that do
    /// their own failure handling.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            factor: 1.0,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::content()
    }
}

/// Runs `op` until it succeeds, the error is permanent, or the retry budget
/// is spent. The final error propagates unchanged.
pub async fn retry_with_backoff<T, F, Fut>(mut op: F, policy: RetryPolicy) -> Result<T, AiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AiError>>,
{
    let mut remaining = policy.max_retries;
    let mut delay = policy.initial_delay;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.kind.is_retryable() && remaining > 0 => {
                warn!(
                    kind = ?err.kind,
                    retries_left = remaining,
                    "retryable AI failure, waiting {delay:?}: {err}"
                );
                tokio::time::sleep(delay).await;
                remaining -= 1;
                delay = delay.mul_f64(policy.factor);
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AiErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let result = retry_with_backoff(
            move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AiError::new(AiErrorKind::RateLimited, "429"))
                    } else {
                        Ok("done")
                    }
                }
            },
            RetryPolicy::content(),
        )
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let result: Result<(), _> = retry_with_backoff(
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(AiError::new(AiErrorKind::InvalidKey, "403"))
                }
            },
            RetryPolicy::content(),
        )
        .await;
        assert_eq!(result.unwrap_err().kind, AiErrorKind::InvalidKey);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_propagates_the_last_error() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let policy = RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(100),
            factor: 2.0,
        };
        let result: Result<(), _> = retry_with_backoff(
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(AiError::new(AiErrorKind::Overloaded, "503"))
                }
            },
            policy,
        )
        .await;
        assert_eq!(result.unwrap_err().kind, AiErrorKind::Overloaded);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
