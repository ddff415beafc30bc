//! Exponential backoff for feed requests.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub attempts: u32,
    /// Delay before the second attempt; doubles afterwards.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_millis(250),
        }
    }
}

/// Retry an async operation with exponential backoff.
///
/// `should_retry` decides whether a failure is worth another attempt; the
/// last error is returned once attempts run out or a failure is permanent.
pub async fn retry_async<F, Fut, T, E, P>(
    mut op: F,
    policy: RetryPolicy,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < attempts && should_retry(&e) => {
                tracing::warn!(attempt, max_attempts = attempts, error = %e, "feed request failed, retrying");
                sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            initial_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let counter = AtomicU32::new(0);
        let res: Result<u32, String> = retry_async(
            |_| {
                let current = counter.fetch_add(1, Ordering::Relaxed);
                async move {
                    if current < 2 {
                        Err("boom".to_string())
                    } else {
                        Ok(7)
                    }
                }
            },
            fast(4),
            |_| true,
        )
        .await;

        assert_eq!(res.unwrap(), 7);
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn gives_up_after_attempts() {
        let counter = AtomicU32::new(0);
        let res: Result<u32, String> = retry_async(
            |attempt| {
                counter.fetch_add(1, Ordering::Relaxed);
                async move { Err(format!("attempt {}", attempt)) }
            },
            fast(3),
            |_| true,
        )
        .await;

        assert_eq!(res.unwrap_err(), "attempt 3");
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let res: Result<u32, String> = retry_async(
            |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                async { Err("not found".to_string()) }
            },
            fast(5),
            |_| false,
        )
        .await;

        assert!(res.is_err());
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let counter = AtomicU32::new(0);
        let res: Result<u32, String> = retry_async(
            |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                async { Ok(1) }
            },
            fast(0),
            |_| true,
        )
        .await;

        assert_eq!(res.unwrap(), 1);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }
}
