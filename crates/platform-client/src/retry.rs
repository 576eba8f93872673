//! Bounded exponential backoff for transient platform failures.
//!
//! **Algorithm:**
//! 1. Attempt the operation
//! 2. On success, return the result
//! 3. On a transient error with retries left: log WARN, back off, retry
//! 4. On any other error, or when retries are exhausted: return the error
//!
//! Rate-limit errors are never retried here; quota exhaustion is fatal for
//! the whole run.

use crate::error::PlatformError;
use catalog::RetrySettings;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Scale each delay by a random factor in [0.5, 1.0)
    pub jitter: bool,
}

impl RetryPolicy {
    /// Retry `max_retries` times without sleeping.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Delay before retry number `retry` (zero-based), without jitter.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let ms = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    fn sleep_for(&self, retry: u32) -> Duration {
        let base = self.delay_for(retry);
        if self.jitter && !base.is_zero() {
            base.mul_f64(0.5 + rand::random::<f64>() / 2.0)
        } else {
            base
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            backoff_multiplier: settings.backoff_multiplier,
            jitter: true,
        }
    }
}

/// Run `operation`, retrying transient failures according to `policy`.
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g. "add v2 to PL123")
/// * `policy` - Retry bounds and backoff
/// * `operation` - Closure producing a fresh future per attempt
pub async fn retry_transient<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, PlatformError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    let mut retries = 0u32;

    loop {
        match operation().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::debug!(
                        operation = operation_name,
                        retries,
                        "Platform call succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) if err.is_transient() && retries < policy.max_retries => {
                let delay = policy.sleep_for(retries);
                retries += 1;
                tracing::warn!(
                    operation = operation_name,
                    attempt = retries,
                    max_retries = policy.max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient platform error, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                if err.is_transient() {
                    tracing::error!(
                        operation = operation_name,
                        retries,
                        error = %err,
                        "Platform call failed: retries exhausted"
                    );
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_succeeds_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_transient("op", &RetryPolicy::immediate(3), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, PlatformError>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient() {
        let calls = AtomicU32::new(0);
        let result = retry_transient("op", &RetryPolicy::immediate(3), || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(PlatformError::Transient("reset".into()))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transient("op", &RetryPolicy::immediate(3), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PlatformError::Transient("timeout".into()))
        })
        .await;

        assert!(result.unwrap_err().is_transient());
        // one attempt plus three retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transient("op", &RetryPolicy::immediate(3), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PlatformError::RateLimited {
                reason: "quotaExceeded".into(),
            })
        })
        .await;

        assert!(result.unwrap_err().is_rate_limit());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transient("op", &RetryPolicy::immediate(3), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PlatformError::Api {
                status: 404,
                reason: None,
                message: "missing".into(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_grows_exponentially_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            jitter: false,
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for(4), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(60), Duration::from_millis(1000));
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = RetryPolicy::from(&RetrySettings::default());
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(500));
        assert!(policy.jitter);
    }
}
