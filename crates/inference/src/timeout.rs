//! Deadline enforcement for a single asynchronous operation

use crate::error::{Error, Failure, Result};
use std::future::Future;
use std::time::Duration;

/// Race `operation` against a deadline of `timeout`.
///
/// If the operation settles first its outcome, success or error, is
/// returned unchanged. If the deadline fires first the result is a
/// [`Failure::timeout`] and the operation is dropped, along with the timer.
///
/// A zero `timeout` is rejected as a validation failure without polling the
/// operation.
pub async fn with_timeout<T, Fut>(operation: Fut, timeout: Duration) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    if timeout.is_zero() {
        let failure = Failure::validation("Timeout must be a positive number of milliseconds");
        return Err(failure.into());
    }

    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Operation timed out after {:?}", timeout);
            Err(Error::Failure(Failure::timeout()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[tokio::test(start_paused = true)]
    async fn test_operation_finishing_first_wins() {
        let result = with_timeout(
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(42)
            },
            Duration::from_millis(100),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_firing_first_times_out() {
        let result: Result<()> = with_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            },
            Duration::from_millis(50),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.as_failure().unwrap().status_code, 408);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settling_just_before_deadline_is_not_a_timeout() {
        let result = with_timeout(
            async {
                tokio::time::sleep(Duration::from_millis(99)).await;
                Ok("done")
            },
            Duration::from_millis(100),
        )
        .await;

        assert_eq!(result.unwrap(), "done");
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_error_propagates_unchanged() {
        let result: Result<()> = with_timeout(
            async { Err(Error::Provider("boom".into())) },
            Duration::from_millis(100),
        )
        .await;

        assert!(matches!(result, Err(Error::Provider(msg)) if msg == "boom"));
    }

    #[tokio::test]
    async fn test_zero_timeout_is_validation_failure() {
        let result = with_timeout(async { Ok(1) }, Duration::ZERO).await;

        let failure = result.unwrap_err().into_failure("unused");
        assert_eq!(failure.kind, FailureKind::Validation);
        assert_eq!(failure.status_code, 400);
    }
}
