// cybertip-oracle/src/retry.rs
// ============================================================================
// Module: Oracle Retry Policy
// Description: Exponential backoff for oracle invocation attempts.
// Purpose: Bound retries of transient oracle failures without retry storms.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Oracle calls fail transiently (unreachable endpoint, timeout) far more
//! often than they fail structurally (a malformed or refused request). This
//! module separates the two: only transient failures are retried, up to a
//! fixed attempt ceiling, with the delay between attempts doubling each
//! time.

use std::thread;
use std::time::Duration;

/// Exponential backoff policy for oracle invocation retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: u32,
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    /// Base delay 2s, factor 2, at most 3 attempts total.
    fn default() -> Self {
        Self { base_delay: Duration::from_secs(2), backoff_factor: 2, max_attempts: 3 }
    }
}

impl RetryPolicy {
    /// Returns the delay to sleep before attempt `attempt` (0-indexed,
    /// counting the first retry as attempt 1).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let factor = self.backoff_factor.saturating_pow(exponent);
        self.base_delay.saturating_mul(factor)
    }
}

/// Outcome of a retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    /// Final result, success or the last error encountered.
    pub result: T,
    /// Total number of attempts made.
    pub attempts: u32,
}

/// Runs `operation` under `policy`, retrying while `is_retryable` returns
/// `true` for the error and attempts remain. Sleeps between attempts using
/// [`thread::sleep`] with the policy's backoff delay.
pub fn run_with_retry<T, E>(
    policy: RetryPolicy,
    mut operation: impl FnMut() -> Result<T, E>,
    is_retryable: impl Fn(&E) -> bool,
) -> RetryOutcome<Result<T, E>> {
    let mut attempt = 1;
    loop {
        match operation() {
            Ok(value) => return RetryOutcome { result: Ok(value), attempts: attempt },
            Err(error) => {
                if attempt >= policy.max_attempts || !is_retryable(&error) {
                    return RetryOutcome { result: Err(error), attempts: attempt };
                }
                thread::sleep(policy.delay_for_attempt(attempt));
                attempt += 1;
            }
        }
    }
}
