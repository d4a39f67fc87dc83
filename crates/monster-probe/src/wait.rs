//! Wait mechanisms.
//!
//! Every query against the page is retried until it succeeds or the timeout
//! budget runs out. Nothing in the suite sleeps for a fixed time.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for wait operations (4 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 4_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of one polling attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Condition met
    Ready(T),
    /// Not yet; carries a description of what was observed
    Pending(String),
}

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    /// Value produced by the successful attempt
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of attempts made
    pub attempts: u32,
}

/// Poll `attempt` until it returns [`Attempt::Ready`] or the timeout expires.
///
/// Errors returned by `attempt` abort the wait immediately. At least one
/// attempt is always made, even with a zero timeout.
pub async fn poll_until<T, F, Fut>(
    waited_for: &str,
    options: &WaitOptions,
    mut attempt: F,
) -> ProbeResult<WaitResult<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Attempt<T>>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match attempt().await? {
            Attempt::Ready(value) => {
                return Ok(WaitResult {
                    value,
                    elapsed: start.elapsed(),
                    attempts,
                });
            }
            Attempt::Pending(last_observed) => {
                if start.elapsed() >= options.timeout() {
                    tracing::debug!(waited_for, attempts, %last_observed, "wait timed out");
                    return Err(ProbeError::Timeout {
                        waited_for: waited_for.to_string(),
                        ms: options.timeout_ms,
                        last_observed,
                    });
                }
            }
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = WaitOptions::default();
            assert_eq!(options.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(options.poll_interval(), Duration::from_millis(50));
        }

        #[test]
        fn test_builder() {
            let options = WaitOptions::new().with_timeout(100).with_poll_interval(5);
            assert_eq!(options.timeout(), Duration::from_millis(100));
            assert_eq!(options.poll_interval_ms, 5);
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_ready_on_first_attempt() {
            let result = poll_until("always", &WaitOptions::new(), || async {
                Ok(Attempt::Ready(7))
            })
            .await
            .unwrap();
            assert_eq!(result.value, 7);
            assert_eq!(result.attempts, 1);
        }

        #[tokio::test]
        async fn test_ready_after_retries() {
            let calls = AtomicU32::new(0);
            let options = WaitOptions::new().with_timeout(1_000).with_poll_interval(1);
            let result = poll_until("third call", &options, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n >= 2 {
                        Ok(Attempt::Ready(n))
                    } else {
                        Ok(Attempt::Pending(format!("call {n}")))
                    }
                }
            })
            .await
            .unwrap();
            assert_eq!(result.value, 2);
            assert_eq!(result.attempts, 3);
        }

        #[tokio::test]
        async fn test_timeout_reports_last_observation() {
            let options = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let err = poll_until::<(), _, _>("never", &options, || async {
                Ok(Attempt::Pending("still 3 cards".to_string()))
            })
            .await
            .unwrap_err();
            match err {
                ProbeError::Timeout {
                    waited_for,
                    ms,
                    last_observed,
                } => {
                    assert_eq!(waited_for, "never");
                    assert_eq!(ms, 20);
                    assert_eq!(last_observed, "still 3 cards");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_zero_timeout_still_attempts_once() {
            let options = WaitOptions::new().with_timeout(0);
            let result = poll_until("once", &options, || async { Ok(Attempt::Ready(())) }).await;
            assert!(result.is_ok());
        }

        #[tokio::test]
        async fn test_errors_abort_immediately() {
            let calls = AtomicU32::new(0);
            let err = poll_until::<(), _, _>("broken", &WaitOptions::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ProbeError::driver("count", "target closed")) }
            })
            .await
            .unwrap_err();
            assert!(matches!(err, ProbeError::Driver { .. }));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }
}
