//! # Request Throttle
//!
//! A small token bucket shared by all pipeline stages, so staying under the
//! provider's rate limits is an explicit policy instead of sleeps sprinkled
//! through orchestration code. Acquire a token before every outbound model
//! call; the bucket refills one token per interval up to its capacity.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

/// A cloneable token bucket. Clones share the same bucket.
#[derive(Debug, Clone)]
pub struct Throttle {
    bucket: Arc<Mutex<Bucket>>,
    capacity: u32,
    refill_every: Duration,
}

impl Throttle {
    /// A bucket holding `capacity` tokens that regains one token every
    /// `refill_every`.
    pub fn new(capacity: u32, refill_every: Duration) -> Self {
        assert!(capacity > 0, "throttle capacity must be positive");
        Self {
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            })),
            capacity,
            refill_every,
        }
    }

    /// Sized for the Gemini free-tier request rate.
    pub fn default_content() -> Self {
        Self::new(8, Duration::from_secs(8))
    }

    /// Waits until a token is available and consumes it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().expect("throttle lock poisoned");
                let elapsed = bucket.last_refill.elapsed();
                if !self.refill_every.is_zero() {
                    let refills = (elapsed.as_nanos() / self.refill_every.as_nanos()) as u32;
                    if refills > 0 {
                        bucket.tokens = (bucket.tokens + refills).min(self.capacity);
                        bucket.last_refill += self.refill_every * refills;
                    }
                }
                if bucket.tokens > 0 {
                    bucket.tokens -= 1;
                    return;
                }
                self.refill_every
                    .saturating_sub(bucket.last_refill.elapsed())
            };
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_up_to_capacity_is_immediate() {
        let throttle = Throttle::new(3, Duration::from_secs(10));
        let start = Instant::now();
        for _ in 0..3 {
            throttle.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_a_refill_when_drained() {
        let throttle = Throttle::new(1, Duration::from_secs(5));
        throttle.acquire().await;
        let start = Instant::now();
        throttle.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn refill_does_not_exceed_capacity() {
        let throttle = Throttle::new(2, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(60)).await;
        let start = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        let before_third = Instant::now();
        throttle.acquire().await;
        assert!(before_third.elapsed() >= Duration::from_secs(1));
    }
}
