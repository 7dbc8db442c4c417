//! Retry with exponential backoff for calls racing a freshly created session

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::debug;

/// Backoff configuration for retryable API calls.
///
/// Replaces the fixed post-login delay some clients use to avoid the
/// server-side race between login and the first authenticated call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retries, not counting the initial attempt
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 250,
            max_delay_ms: 2_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Fail-fast policy: the initial attempt only
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay_ms: 0,
            max_delay_ms: 0,
            backoff_multiplier: 1.0,
        }
    }
}

/// Run `operation`, retrying while `is_retryable` holds for the error and
/// attempts remain. Delays grow by the configured multiplier up to the cap.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: P,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut delay = Duration::from_millis(policy.initial_delay_ms);
    let max_delay = Duration::from_millis(policy.max_delay_ms);

    for attempt in 0..=policy.max_retries {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_retries && is_retryable(&err) => {
                debug!(attempt = attempt + 1, %err, ?delay, "retrying after backoff");
                sleep(delay).await;
                delay = delay
                    .mul_f64(policy.backoff_multiplier)
                    .min(max_delay);
            }
            Err(err) => return Err(err),
        }
    }
    unreachable!("loop returns on the last attempt")
}
