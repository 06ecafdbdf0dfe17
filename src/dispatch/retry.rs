// Retry policy for a single send within a pass.
//
// A failed send is always eligible again on the next pass, because its stage
// timestamp stays unset. The policy only controls how hard we try before
// giving up for this pass. The default is a single attempt.

use anyhow::Result;
use std::time::Duration;
use tracing::warn;

use super::rate_limiter::Pacer;
use super::traits::Dispatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per send, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after that.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

impl RetryPolicy {
    /// One attempt; failures wait for the next pass.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before `attempt` (1-based). The first attempt never waits.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let doublings = (attempt - 2).min(16);
        self.backoff.saturating_mul(1u32 << doublings)
    }
}

/// Send one message under `policy`, pacing every attempt.
///
/// Returns the number of attempts used on success, or the last error once
/// the policy is exhausted.
pub async fn send_with_retry(
    dispatcher: &dyn Dispatcher,
    pacer: &Pacer,
    policy: &RetryPolicy,
    recipient: &str,
    subject: &str,
    body: &str,
    tag: &str,
) -> Result<u32> {
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        pacer.acquire().await;

        match dispatcher.send(recipient, subject, body, tag).await {
            Ok(()) => return Ok(attempt),
            Err(e) if attempt < attempts => {
                warn!(
                    recipient,
                    tag,
                    attempt,
                    provider = dispatcher.name(),
                    error = %e,
                    "Send failed, retrying"
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
