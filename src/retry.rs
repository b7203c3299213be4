use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed-count, fixed-delay retry for remote database calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "RetryPolicy::default_attempts")]
    pub attempts: u32,
    #[serde(default = "RetryPolicy::default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: Self::default_attempts(),
            delay_secs: Self::default_delay_secs(),
        }
    }
}

impl RetryPolicy {
    pub fn default_attempts() -> u32 {
        3
    }

    pub fn default_delay_secs() -> u64 {
        60
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Runs `op` until it succeeds or `policy.attempts` runs out, sleeping
/// `policy.delay()` between attempts. The last error is returned unchanged.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                tracing::warn!(
                    operation = label,
                    attempt,
                    attempts,
                    error = %err,
                    "database call failed, retrying in {}s",
                    policy.delay_secs
                );
                tokio::time::sleep(policy.delay()).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!(operation = label, attempts, error = %err, "giving up");
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay_secs: 0,
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(fast(3), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(format!("failure {n}"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_last_error_when_exhausted() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(fast(3), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(format!("failure {n}")) }
        })
        .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(fast(0), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("nope".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_attempts() {
        let started = tokio::time::Instant::now();
        let policy = RetryPolicy {
            attempts: 2,
            delay_secs: 60,
        };
        let _: Result<(), String> =
            with_retry(policy, "test", || async { Err("down".to_string()) }).await;
        assert!(started.elapsed() >= Duration::from_secs(60));
    }

    #[test]
    fn defaults_are_three_attempts_a_minute_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay(), Duration::from_secs(60));
    }
}
