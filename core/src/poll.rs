//! Bounded polling for long-running backend operations such as classifier
//! training.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, WatsonError};

/// How often and how long to keep checking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Factor applied to the interval after every pending check. `1.0` keeps
    /// it fixed.
    pub backoff: f64,
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 30,
            backoff: 1.0,
            max_interval: Duration::from_secs(60),
        }
    }
}

impl PollPolicy {
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            backoff: 1.0,
            max_interval: interval,
        }
    }

    pub fn with_backoff(mut self, factor: f64, max_interval: Duration) -> Self {
        self.backoff = factor.max(1.0);
        self.max_interval = max_interval;
        self
    }

    /// Factors that are NaN or not above 1 keep the interval fixed. Growth
    /// that overflows `Duration` lands on the cap.
    fn next_interval(&self, current: Duration) -> Duration {
        if self.backoff.is_nan() || self.backoff <= 1.0 {
            return current;
        }
        let cap = self.max_interval.max(self.interval);
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff)
            .unwrap_or(cap)
            .min(cap)
    }
}

/// Outcome of one status check.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Done(T),
    Pending,
}

/// Call `check` until it reports `Done`, sleeping between attempts.
///
/// `check` receives the 1-based attempt number. An error from `check` ends
/// polling immediately. After `max_attempts` pending checks the result is
/// `WatsonError::PollExhausted`; no sleep follows the last attempt.
pub async fn poll_until<T, F, Fut>(policy: PollPolicy, mut check: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Attempt<T>>>,
{
    let mut interval = policy.interval;
    for attempt in 1..=policy.max_attempts {
        match check(attempt).await? {
            Attempt::Done(value) => return Ok(value),
            Attempt::Pending => {
                debug!(attempt, max_attempts = policy.max_attempts, "not ready yet");
            }
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(interval).await;
            interval = policy.next_interval(interval);
        }
    }
    Err(WatsonError::PollExhausted {
        attempts: policy.max_attempts,
    })
}
