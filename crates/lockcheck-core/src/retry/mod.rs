//! Retry and backoff for registry calls.
//!
//! Transport failures are classified (timeouts, throttling, connection
//! failures, 5xx) and retried with capped exponential backoff. Anything that
//! will not change on a second attempt (4xx, unpublished version, integrity
//! mismatch) fails immediately.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
