//! Bounded retry until a producer yields something.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{DispatchError, DispatchResult};

/// Pause between empty results.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Call `producer` until it returns a non-empty `Vec` or `timeout` has
/// elapsed, sleeping [`RETRY_BACKOFF`] after each empty result.
///
/// The producer is always called at least once. Its errors are returned
/// immediately. Exhausting the budget yields `DispatchError::Timeout`; an
/// empty result is never returned.
pub async fn retry_until_non_empty<T, F, Fut>(
    mut producer: F,
    timeout: Duration,
    during: &str,
) -> DispatchResult<Vec<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DispatchResult<Vec<T>>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let items = producer().await?;
        if !items.is_empty() {
            return Ok(items);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            debug!(attempts, ?elapsed, "retry budget exhausted");
            return Err(DispatchError::Timeout {
                during: during.to_string(),
                after: elapsed,
            });
        }

        debug!(attempts, "empty result, retrying");
        sleep(RETRY_BACKOFF).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use workflow_api::ApiError;

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_non_empty_result() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let start = Instant::now();

        let items = retry_until_non_empty(
            || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Ok(if n < 3 { vec![] } else { vec![n] })
            },
            Duration::from_secs(10),
            "testing",
        )
        .await
        .unwrap();

        assert_eq!(items, vec![3]);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_always_empty() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let start = Instant::now();

        let err = retry_until_non_empty::<u64, _, _>(
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![])
            },
            Duration::from_millis(3500),
            "listing runs",
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("listing runs"));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3500));
        assert!(elapsed <= Duration::from_millis(3500) + RETRY_BACKOFF);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_still_calls_once() {
        let items = retry_until_non_empty(
            || async { Ok(vec!["x"]) },
            Duration::ZERO,
            "testing",
        )
        .await
        .unwrap();
        assert_eq!(items, vec!["x"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_error_is_not_retried() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let err = retry_until_non_empty::<u64, _, _>(
            || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::UnexpectedStatus {
                    status: 500,
                    message: "boom".to_string(),
                }
                .into())
            },
            Duration::from_secs(10),
            "testing",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DispatchError::Api(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
