use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::http::ApiError;
use crate::config::NetworkConfig;

/// Bounded retry with linear backoff, used for the initial course loads.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry; retry `n` waits `n * base_delay`
    pub base_delay: Duration,
    /// Caps the linear growth
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Default::default()
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(
            config.load_max_attempts,
            Duration::from_millis(config.load_backoff_ms),
        )
    }

    /// Delay after the given failed attempt (1-based).
    ///
    /// Formula: min(base_delay * attempt, max_delay)
    fn calculate_delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt).min(self.max_delay)
    }

    /// Execute an async operation, retrying transient failures
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut f: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 1;

        loop {
            match f().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!("{}: Succeeded on attempt {}", operation_name, attempt);
                    }
                    return Ok(result);
                }
                Err(err) if !err.is_transient() => {
                    warn!(
                        "{}: Non-transient error, not retrying: {}",
                        operation_name, err
                    );
                    return Err(err);
                }
                Err(err) if attempt >= self.max_attempts => {
                    warn!(
                        "{}: All {} attempts failed, last error: {}",
                        operation_name, self.max_attempts, err
                    );
                    return Err(err);
                }
                Err(err) => {
                    let delay = match err.retry_after() {
                        Some(secs) => Duration::from_secs(secs).min(self.max_delay),
                        None => self.calculate_delay(attempt),
                    };
                    debug!(
                        "{}: Attempt {} of {} failed ({}), retrying in {:?}",
                        operation_name, attempt, self.max_attempts, err, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
