//! Async retry loop for registry calls.

use std::future::Future;

use crate::registry::TransportError;

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `f` until it succeeds or the policy says to stop, sleeping for the
/// backoff between attempts. `what` names the operation in logs.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut f: F,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut attempt = 1u32;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, classify::classify(&e)) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    tracing::debug!(attempt, delay_ms = d.as_millis() as u64, error = %e, "retrying {}", what);
                    tokio::time::sleep(d).await;
                    attempt += 1;
                }
            },
        }
    }
}
