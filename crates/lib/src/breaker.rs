//! # Image Quota Breaker
//!
//! Image-generation quota windows last far longer than a user session, so
//! after the first observed quota exhaustion every further render attempt
//! is wasted time. The breaker records that observation and lets the image
//! path fail fast with a placeholder instead.
//!
//! This is an explicit, injectable state object. It applies to the image
//! path only; text generation keeps its own retry/fallback budget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A one-way, session-scoped breaker. Clones share the same flag; a fresh
/// instance (new session) starts closed.
#[derive(Debug, Clone, Default)]
pub struct QuotaBreaker {
    tripped: Arc<AtomicBool>,
}

impl QuotaBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a quota exhaustion. There is no automatic reset.
    pub fn trip(&self) {
        self.tripped.store(true, Ordering::SeqCst);
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }
}
