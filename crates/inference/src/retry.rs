//! Bounded retry of timeout-guarded operations
//!
//! Attempts are strictly sequential and happen back to back with no delay
//! between them. A timeout ends the chain immediately: the deadline has
//! already been spent and there is no evidence another attempt would fare
//! better.

use crate::error::{Failure, Result};
use crate::timeout::with_timeout;
use std::future::Future;
use std::time::Duration;

/// Default deadline for a single attempt (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Retry and timeout settings shared read-only by every invocation of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    timeout: Duration,
}

impl RetryPolicy {
    /// Create a policy, rejecting a zero timeout
    pub fn new(max_retries: u32, timeout: Duration) -> std::result::Result<Self, Failure> {
        if timeout.is_zero() {
            return Err(Failure::validation(
                "Timeout must be a positive number of milliseconds",
            ));
        }
        Ok(Self {
            max_retries,
            timeout,
        })
    }

    /// Create a policy from a millisecond timeout
    pub fn from_millis(max_retries: u32, timeout_ms: u64) -> std::result::Result<Self, Failure> {
        Self::new(max_retries, Duration::from_millis(timeout_ms))
    }

    /// Retries permitted beyond the first attempt
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Deadline applied to each attempt
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upper bound on attempts in one chain
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Run `operation` through [`with_timeout`] until it succeeds, times out, or
/// the policy's retry budget is spent.
///
/// `operation` is called once per attempt to produce a fresh future. The
/// attempt counter lives in this call only, so concurrent chains sharing one
/// policy never see each other's attempts. `label` names the operation in
/// log output.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries: u32 = 0;

    loop {
        match with_timeout(operation(), policy.timeout()).await {
            Ok(value) => {
                if retries > 0 {
                    tracing::debug!("{} succeeded after {} attempts", label, retries + 1);
                }
                return Ok(value);
            }
            Err(err) if err.is_timeout() => return Err(err),
            Err(err) => {
                if retries >= policy.max_retries() {
                    tracing::warn!(
                        "{} failed after {} attempts: {}",
                        label,
                        retries + 1,
                        err
                    );
                    return Err(err);
                }

                retries += 1;
                tracing::warn!("Retry attempt {} for {}: {}", retries, label, err);
            }
        }
    }
}
