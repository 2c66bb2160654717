//! Randomized pauses between requests and before retries

use crate::config::DelayRange;
use rand::Rng;
use std::time::Duration;

/// Picks a pause uniformly within the range
///
/// A range with `max_ms <= min_ms` always yields `min_ms`.
pub fn jitter(range: DelayRange) -> Duration {
    if range.max_ms <= range.min_ms {
        return Duration::from_millis(range.min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(range.min_ms..=range.max_ms))
}

/// Sleeps for a randomized pause within the range
pub async fn pause(range: DelayRange) {
    let delay = jitter(range);
    if !delay.is_zero() {
        tracing::trace!("Pausing {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}
