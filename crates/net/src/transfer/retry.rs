//! Backoff calculation for request retries

use super::config::RetryConfig;
use std::time::Duration;

/// Calculate exponential backoff delay with jitter
///
/// `attempt` is 1 for the first retry.
#[must_use]
pub fn calculate_backoff_delay(retry_config: &RetryConfig, attempt: u32) -> Duration {
    // Millisecond precision is plenty for backoff
    #[allow(clippy::cast_precision_loss)]
    let base_delay = retry_config
        .initial_delay
        .as_millis()
        .min(u128::from(u64::MAX)) as f64;
    #[allow(clippy::cast_precision_loss)]
    let max_delay = retry_config.max_delay.as_millis().min(u128::from(u64::MAX)) as f64;

    let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let delay = (base_delay * retry_config.backoff_multiplier.powi(exponent)).min(max_delay);

    let jitter = delay * retry_config.jitter_factor * (rand::random::<f64>() - 0.5);

    // max(0.0) keeps the value non-negative before the cast
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let final_delay = (delay + jitter).max(0.0).round() as u64;

    Duration::from_millis(final_delay)
}
