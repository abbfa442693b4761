//! Exponential backoff and the transient/fatal split for a single resolution
//! attempt (§4.6 "Retry and blacklist").

use libreseed_types::error::CoreError;
use libreseed_types::{MAX_RETRY_ATTEMPTS, RETRY_BASE_DELAY_SECS, RETRY_MAX_DELAY_SECS};
use std::time::Duration;

/// The outcome of running an operation under [`RetryController::run`].
pub enum Outcome<T> {
    /// The operation succeeded.
    Done(T),
    /// The operation failed non-transiently, or exhausted its retry budget;
    /// the caller should blacklist the target.
    Exhausted(CoreError),
}

/// Drives `min(1s * 2^attempt, 60s)` backoff, capped at
/// [`MAX_RETRY_ATTEMPTS`] attempts, for a single `(pubkey, name, version)`
/// resolution target.
///
/// Non-transient errors ([`CoreError::is_transient`] false) are immediately
/// fatal — no retries, per §4.6.
pub struct RetryController {
    max_attempts: u32,
}

impl RetryController {
    /// Builds a controller using the spec's default attempt cap (10).
    pub fn new() -> Self {
        Self {
            max_attempts: MAX_RETRY_ATTEMPTS,
        }
    }

    /// Builds a controller with a caller-chosen attempt cap.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// The backoff delay before attempt `attempt` (0-indexed): `min(1s *
    /// 2^attempt, 60s)`.
    pub fn backoff_for(attempt: u32) -> Duration {
        let secs = RETRY_BASE_DELAY_SECS.saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX));
        Duration::from_secs(secs.min(RETRY_MAX_DELAY_SECS))
    }

    /// Runs `op` until it succeeds, fails non-transiently, or exhausts the
    /// attempt budget, sleeping `backoff_for(attempt)` between transient
    /// failures.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Outcome<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Outcome::Done(value),
                Err(err) if !err.is_transient() => return Outcome::Exhausted(err),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Outcome::Exhausted(err);
                    }
                    tokio::time::sleep(Self::backoff_for(attempt)).await;
                }
            }
        }
    }
}

impl Default for RetryController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libreseed_types::error::{DiscoveryError, ValidationError};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_doubles_until_the_cap() {
        assert_eq!(RetryController::backoff_for(0), Duration::from_secs(1));
        assert_eq!(RetryController::backoff_for(1), Duration::from_secs(2));
        assert_eq!(RetryController::backoff_for(2), Duration::from_secs(4));
        assert_eq!(RetryController::backoff_for(6), Duration::from_secs(60));
        assert_eq!(RetryController::backoff_for(30), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_retries_until_success() {
        let calls = AtomicU32::new(0);
        let controller = RetryController::with_max_attempts(5);
        let outcome = controller
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(CoreError::Discovery(DiscoveryError::NameIndexNotFound(
                            "hello".to_string(),
                        )))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;
        assert!(matches!(outcome, Outcome::Done(42)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_exhausts_after_cap() {
        let controller = RetryController::with_max_attempts(3);
        let outcome: Outcome<()> = controller
            .run(|| async {
                Err(CoreError::Discovery(DiscoveryError::NameIndexNotFound(
                    "hello".to_string(),
                )))
            })
            .await;
        assert!(matches!(outcome, Outcome::Exhausted(_)));
    }

    #[tokio::test]
    async fn non_transient_failure_never_retries() {
        let calls = AtomicU32::new(0);
        let controller = RetryController::new();
        let outcome: Outcome<()> = controller
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(CoreError::Validation(ValidationError::InvalidTimestamp("timestamp"))) }
            })
            .await;
        assert!(matches!(outcome, Outcome::Exhausted(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
