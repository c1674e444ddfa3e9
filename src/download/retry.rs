//! Retry classification and pacing for file transfers.
//!
//! A failed attempt is classified into a [`FailureType`]. Transient failures
//! are retried until the attempt bound is reached; permanent ones end the
//! transfer at once. Between attempts the [`RetryPolicy`] waits with
//! exponential backoff and jitter.
//!
//! ```text
//! delay = min(base_delay * multiplier^(attempt - 1), max_delay) + jitter
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use super::DownloadError;

/// Default maximum attempts per file.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff (1 second).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Classification of transfer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// May succeed on another attempt: network errors, timeouts, HTTP error
    /// statuses, truncated bodies.
    Transient,

    /// Will not succeed on another attempt: local I/O, bad URLs, missing login.
    Permanent,
}

/// Decision on whether to retry a failed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after `delay`; `attempt` is the number of the next attempt.
    Retry { delay: Duration, attempt: u32 },

    /// Give up.
    DoNotRetry { reason: String },
}

/// Backoff configuration.
///
/// The attempt bound is not part of the policy; it is passed per transfer.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with custom backoff settings and jitter enabled.
    #[must_use]
    pub fn new(base_delay: Duration, max_delay: Duration, backoff_multiplier: f32) -> Self {
        Self {
            base_delay,
            max_delay,
            backoff_multiplier,
            jitter: true,
        }
    }

    /// Retries without waiting.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Decides whether attempt `attempt` (1-indexed) of at most
    /// `max_attempts` should be followed by another one.
    #[instrument(skip(self))]
    pub fn should_retry(
        &self,
        failure_type: FailureType,
        attempt: u32,
        max_attempts: u32,
    ) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= max_attempts {
            debug!(attempt, max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({max_attempts}) exhausted"),
            };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);
        let exponent = f64::from(attempt.saturating_sub(1));

        let delay_ms = base_ms * multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + self.calculate_jitter()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn calculate_jitter(&self) -> Duration {
        if !self.jitter {
            return Duration::ZERO;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=MAX_JITTER.as_millis() as u64);
        Duration::from_millis(jitter_ms)
    }
}

/// Classifies a transfer error for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Network, Timeout | Transient |
/// | HttpStatus (any) | Transient |
/// | Truncated | Transient |
/// | Io, InvalidUrl, NotAuthenticated | Permanent |
/// | AlreadyDownloaded | Permanent (never retried) |
#[must_use]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::Network { .. }
        | DownloadError::Timeout { .. }
        | DownloadError::HttpStatus { .. }
        | DownloadError::Truncated { .. } => FailureType::Transient,

        DownloadError::AlreadyDownloaded { .. }
        | DownloadError::NotAuthenticated
        | DownloadError::Io { .. }
        | DownloadError::InvalidUrl { .. } => FailureType::Permanent,
    }
}
