//! Retry with exponential backoff.
//!
//! The worker owns its retry loop: a failed attempt sleeps and runs again
//! inside the same delivery, and only crashed workers rely on queue
//! redelivery. Delays never block the runtime; they are awaited.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::WorkerConfig;
use crate::error::WorkerError;

/// Backoff schedule for retried operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self { max_retries, base_delay, max_delay }
    }

    pub fn from_worker_config(config: &WorkerConfig) -> Self {
        Self::new(config.max_retries, config.retry_base_delay, config.retry_max_delay)
    }

    /// Delay before retry `attempt` (0-based): base * 2^attempt, capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Outcome of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T> {
    Success(T),
    /// Last error plus the total number of attempts made.
    Failed { error: WorkerError, attempts: u32 },
}

/// Run `op` until it succeeds, fails permanently, or exhausts retries.
///
/// Permanent errors (per [`WorkerError::is_permanent`]) short-circuit with
/// zero further attempts; they can never be fixed by trying again.
pub async fn retry_with_backoff<T, F, Fut>(config: &RetryConfig, mut op: F) -> RetryResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, WorkerError>>,
{
    let mut attempt = 0u32;
    loop {
        match op(attempt).await {
            Ok(value) => return RetryResult::Success(value),
            Err(error) if error.is_permanent() => {
                return RetryResult::Failed { error, attempts: attempt + 1 };
            }
            Err(error) if attempt >= config.max_retries => {
                return RetryResult::Failed { error, attempts: attempt + 1 };
            }
            Err(error) => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    delay_secs = delay.as_secs(),
                    "Attempt failed, retrying: {}",
                    error
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> RetryConfig {
        RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(8))
    }

    #[test]
    fn delay_schedule_doubles_and_caps() {
        let config = RetryConfig::new(5, Duration::from_secs(2), Duration::from_secs(60));
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(8));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn immediate_success_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_config(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, WorkerError>(42) }
        })
        .await;
        assert!(matches!(result, RetryResult::Success(42)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn eventual_success_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_config(), |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(WorkerError::processing("flaky"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;
        assert!(matches!(result, RetryResult::Success("done")));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_report_attempts() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_config(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(WorkerError::processing("always down")) }
        })
        .await;
        match result {
            RetryResult::Failed { attempts, .. } => assert_eq!(attempts, 4),
            RetryResult::Success(_) => panic!("expected failure"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn permanent_error_short_circuits() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_config(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(WorkerError::SourceMissing("videos/gone.mp4".into())) }
        })
        .await;
        match result {
            RetryResult::Failed { error, attempts } => {
                assert!(error.is_permanent());
                assert_eq!(attempts, 1);
            }
            RetryResult::Success(_) => panic!("expected failure"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
