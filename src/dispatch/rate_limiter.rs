// Send pacing — keeps consecutive sends at least one interval apart.
//
// Providers penalize bursts from cold domains. Each caller reserves the next
// free send slot under the lock, then sleeps until that slot outside it, so
// slots are handed out in call order and never overlap. The first send goes
// out immediately; a retry waits for a slot like any other send.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::config::Config;

#[derive(Clone)]
pub struct Pacer {
    interval: Duration,
    slots: Arc<Mutex<Slots>>,
}

#[derive(Default)]
struct Slots {
    /// Earliest moment the next send may go out
    next: Option<Instant>,
    /// Sends let through so far
    granted: u64,
}

impl Pacer {
    /// Pacer that spaces sends `interval` apart.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    /// Pacer using the configured gap between sends.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.pacing)
    }

    /// Pacer that never waits (tests, single sends).
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How many sends have been let through.
    pub async fn granted(&self) -> u64 {
        self.slots.lock().await.granted
    }

    /// Wait for this caller's send slot.
    pub async fn acquire(&self) {
        let slot = {
            let mut slots = self.slots.lock().await;
            let now = Instant::now();
            let slot = slots.next.map_or(now, |next| next.max(now));
            slots.next = Some(slot + self.interval);
            slots.granted += 1;
            slot
        };

        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "Pacing next send");
            tokio::time::sleep_until(slot).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_slot_is_immediate_then_spaced() {
        let pacer = Pacer::new(Duration::from_secs(5));
        let start = Instant::now();

        pacer.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        pacer.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(5));
        pacer.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert_eq!(pacer.granted().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_time_counts_toward_the_gap() {
        let pacer = Pacer::new(Duration::from_secs(5));
        pacer.acquire().await;
        tokio::time::sleep(Duration::from_secs(8)).await;

        let before = Instant::now();
        pacer.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_get_distinct_slots() {
        let pacer = Pacer::new(Duration::from_secs(2));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let pacer = pacer.clone();
                tokio::spawn(async move {
                    pacer.acquire().await;
                    start.elapsed()
                })
            })
            .collect();
        let mut finished = Vec::new();
        for handle in handles {
            finished.push(handle.await.unwrap());
        }
        finished.sort();

        assert_eq!(finished[0], Duration::ZERO);
        assert!(finished[1] >= Duration::from_secs(2));
        assert!(finished[2] >= Duration::from_secs(4));
    }

    #[tokio::test]
    async fn unpaced_never_waits() {
        let pacer = Pacer::unpaced();
        let start = Instant::now();
        for _ in 0..5 {
            pacer.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
