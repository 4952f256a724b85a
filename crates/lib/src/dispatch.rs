//! # Model Fallback Dispatch
//!
//! Wraps a text-generation call with the two-tier model policy: the
//! preferred model runs under its own retry budget, and a recoverable
//! failure is re-tried once against the more available fallback tier with
//! the incompatible options stripped. Two tiers only; this bounds the
//! worst-case latency of a stage to the sum of the two backoff budgets.

use crate::{
    errors::AiError,
    providers::ai::{AiProvider, GenerationOptions},
    retry::{retry_with_backoff, RetryPolicy},
};
use tracing::warn;

/// The model pair and retry budgets used for one pipeline stage.
#[derive(Debug, Clone)]
pub struct ModelRoute {
    pub preferred: String,
    pub fallback: String,
    pub policy: RetryPolicy,
    pub fallback_policy: RetryPolicy,
}

impl ModelRoute {
    /// A route with the default content retry budgets.
    pub fn new(preferred: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            preferred: preferred.into(),
            fallback: fallback.into(),
            policy: RetryPolicy::content(),
            fallback_policy: RetryPolicy::content(),
        }
    }

    pub fn with_policies(mut self, policy: RetryPolicy, fallback_policy: RetryPolicy) -> Self {
        self.policy = policy;
        self.fallback_policy = fallback_policy;
        self
    }
}

/// Generates text, falling back to the secondary model tier on a
/// recoverable failure of the preferred one.
pub async fn generate_with_fallback(
    provider: &dyn AiProvider,
    route: &ModelRoute,
    prompt: &str,
    options: &GenerationOptions,
) -> Result<String, AiError> {
    let primary = retry_with_backoff(
        || provider.generate(&route.preferred, prompt, options),
        route.policy,
    )
    .await;

    match primary {
        Ok(text) => Ok(text),
        Err(err) if err.kind.triggers_fallback() && route.fallback != route.preferred => {
            warn!(
                preferred = %route.preferred,
                fallback = %route.fallback,
                kind = ?err.kind,
                "preferred model failed recoverably, switching to fallback: {err}"
            );
            let stripped = options.for_fallback();
            retry_with_backoff(
                || provider.generate(&route.fallback, prompt, &stripped),
                route.fallback_policy,
            )
            .await
        }
        Err(err) => Err(err),
    }
}
