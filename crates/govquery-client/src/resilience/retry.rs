//! Retry orchestration with linear backoff

use std::fmt;
use std::future::Future;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use super::RequestOutcome;
use crate::constants::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY};
use crate::{Error, Result};

/// Which failures are replayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    /// Every failed attempt is retried, including 4xx rejections
    #[default]
    All,
    /// Only timeouts, transport failures, 5xx, 408 and 429
    #[serde(alias = "transient")]
    TransientOnly,
}

impl RetryMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::TransientOnly => "transient_only",
        }
    }
}

impl fmt::Display for RetryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "transient" | "transient_only" | "transient-only" => Ok(Self::TransientOnly),
            other => Err(Error::Config(format!(
                "Invalid retry mode: {other} (expected all or transient_only)"
            ))),
        }
    }
}

/// Bounded retry with linear backoff.
///
/// After failed attempt `n` the policy waits `n * base_delay` before attempt
/// `n + 1`. There is no wait after the final attempt; exhaustion returns the
/// last failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    base_delay: Duration,
    mode: RetryMode,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: NonZeroU32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            mode: RetryMode::All,
        }
    }

    /// Single attempt, no retries
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(NonZeroU32::MIN, Duration::ZERO)
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: RetryMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn max_attempts(&self) -> NonZeroU32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    #[must_use]
    pub const fn mode(&self) -> RetryMode {
        self.mode
    }

    /// Backoff after failed attempt `attempt` (1-based)
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Whether a failed outcome may be replayed under this policy's mode
    #[must_use]
    pub const fn should_retry<T>(&self, outcome: &RequestOutcome<T>) -> bool {
        match self.mode {
            RetryMode::All => !outcome.is_success(),
            RetryMode::TransientOnly => outcome.is_transient(),
        }
    }

    /// Run `attempt_fn` until it succeeds, the failure is not retryable, or
    /// the attempt ceiling is reached.
    ///
    /// `attempt_fn` receives the 1-based attempt number. Cancelling `cancel`
    /// drops the in-flight attempt or pending backoff and returns
    /// [`Error::Cancelled`].
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        mut attempt_fn: F,
    ) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = RequestOutcome<T>>,
    {
        let max_attempts = self.max_attempts.get();
        let mut attempt = 1;

        loop {
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                outcome = attempt_fn(attempt) => outcome,
            };

            let retryable = self.should_retry(&outcome);
            let failure = match outcome.into_result() {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !retryable {
                warn!(
                    operation,
                    attempt,
                    error = %failure,
                    "Operation failed with non-retryable error"
                );
                return Err(failure);
            }

            if attempt >= max_attempts {
                error!(
                    operation,
                    attempts = max_attempts,
                    error = %failure,
                    "Operation failed after all attempts"
                );
                return Err(failure);
            }

            let delay = self.delay_after(attempt);
            warn!(
                operation,
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %failure,
                "Operation failed, retrying"
            );

            #[cfg(feature = "metrics")]
            {
                crate::observability::record_retry(operation);
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            NonZeroU32::new(DEFAULT_RETRY_ATTEMPTS).unwrap_or(NonZeroU32::MIN),
            DEFAULT_RETRY_BASE_DELAY,
        )
    }
}
