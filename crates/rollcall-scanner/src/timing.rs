//! Randomized pauses between page interactions.

use rand::Rng;
use rollcall_core::Jitter;
use std::time::Duration;

/// Draw a delay uniformly from the jitter range.
pub fn jittered(jitter: Jitter) -> Duration {
    let (low, high) = if jitter.min_ms <= jitter.max_ms {
        (jitter.min_ms, jitter.max_ms)
    } else {
        (jitter.max_ms, jitter.min_ms)
    };
    Duration::from_millis(rand::thread_rng().gen_range(low..=high))
}

/// Sleep for a delay drawn from the jitter range.
pub async fn pause(jitter: Jitter) {
    let delay = jittered(jitter);
    if !delay.is_zero() {
        tracing::trace!("pausing for {:?}", delay);
    }
    tokio::time::sleep(delay).await;
}
