//! Bounded retry with pluggable backoff.
//!
//! The policy never sleeps on its own; delays go through a [`BaseSleeper`] so
//! tests can observe them without waiting.

use std::future::Future;
use std::time::Duration;

use super::BaseSleeper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    None,
    Fixed(Duration),
    /// `step * attempt` after the n-th failed attempt.
    Linear(Duration),
}

impl Backoff {
    /// Delay to wait after `attempt` (1-based) has failed.
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(d) => *d,
            Backoff::Linear(step) => step.saturating_mul(attempt),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::Linear(Duration::from_secs(1)),
        }
    }
}

/// A successful run, with how many attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Every attempt failed; `error` is from the last one.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub error: E,
    pub attempts: u32,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::None,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Call `op(attempt)` until it succeeds or attempts run out.
    pub async fn run<T, E, F, Fut>(
        &self,
        sleeper: &dyn BaseSleeper,
        mut op: F,
    ) -> Result<Attempted<T>, Exhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    })
                }
                Err(error) if attempt >= max_attempts => {
                    return Err(Exhausted {
                        error,
                        attempts: attempt,
                    })
                }
                Err(error) => {
                    let delay = self.backoff.delay(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Attempt failed, retrying"
                    );
                    if !delay.is_zero() {
                        sleeper.sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
