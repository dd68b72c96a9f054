/// Bounded retry with linear backoff
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Base delay between attempts; attempt N waits N * base_delay
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(300),
        }
    }
}

impl RetryConfig {
    /// Upper bound on total time spent sleeping between attempts.
    ///
    /// With linear backoff the waits are base, 2*base, .. (n-1)*base.
    pub fn max_total_delay(&self) -> Duration {
        let attempts = u64::from(self.max_attempts.saturating_sub(1));
        let pauses = attempts * (attempts + 1) / 2;
        self.base_delay.saturating_mul(pauses as u32)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("max attempts ({attempts}) exhausted, last error: {last_error}")]
    Exhausted { attempts: u32, last_error: E },
}

impl<E> RetryError<E> {
    pub fn into_last_error(self) -> E {
        match self {
            RetryError::Exhausted { last_error, .. } => last_error,
        }
    }
}

/// Execute a fallible future with bounded retries.
///
/// The operation is re-created via `f` for every attempt. Once the attempt
/// budget is spent the last error is returned; callers decide whether that
/// means drop, dead-letter, or propagate.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut f: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);

    let mut attempt = 1;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= max_attempts {
                    warn!("retry budget exhausted after {} attempts: {}", attempt, e);
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }

                let delay = config.backoff(attempt);
                warn!(
                    "attempt {}/{} failed: {}, retrying in {:?}",
                    attempt, max_attempts, e, delay
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
    use std::sync::Arc;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(3), move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(3), move || {
            let count = counter_clone.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err("temporary error")
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempt_budget_is_exact() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = with_retry(&fast_config(3), move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            async { Err("store unavailable") }
        })
        .await;

        let err = result.unwrap_err();
        match err {
            RetryError::Exhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error, "store unavailable");
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_config_never_sleeps() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = with_retry(&fast_config(1), move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            async { Err("boom") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_linear_backoff_progression() {
        let config = RetryConfig {
            max_attempts: 4,
            base_delay: Duration::from_millis(300),
        };

        assert_eq!(config.backoff(1), Duration::from_millis(300));
        assert_eq!(config.backoff(2), Duration::from_millis(600));
        assert_eq!(config.backoff(3), Duration::from_millis(900));
    }

    #[test]
    fn test_max_total_delay_is_bounded() {
        let config = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(300),
        };

        // Pauses after attempt 1 and 2: 300ms + 600ms.
        assert_eq!(config.max_total_delay(), Duration::from_millis(900));
    }
}
