use std::time::Duration;

use crate::config::RetryConfig;

/// Retry-relevant classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect or transfer timed out.
    Timeout,
    /// Registry asked us to slow down (429, 503).
    Throttled,
    /// Connection reset, DNS failure, and similar.
    Connection,
    /// Retryable server error.
    Http5xx(u16),
    /// Not retried.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Exponential backoff with caps.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let max_delay = Duration::from_secs(cfg.max_delay_secs);
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: clamp_delay(cfg.base_delay_secs, max_delay),
            max_delay,
        }
    }
}

/// Seconds from config as a delay in `[0, cap]`; NaN and negatives become zero.
fn clamp_delay(secs: f64, cap: Duration) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).map_or(cap, |d| d.min(cap))
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// `attempt` is 1-based (1 = the attempt that just failed).
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::Timeout
            | ErrorKind::Connection
            | ErrorKind::Throttled
            | ErrorKind::Http5xx(_) => {
                // base * 2^(attempt-1), capped.
                let exp = 1u32 << attempt.saturating_sub(1).min(8);
                let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay(d: RetryDecision) -> Duration {
        match d {
            RetryDecision::RetryAfter(d) => d,
            RetryDecision::NoRetry => panic!("expected retry"),
        }
    }

    #[test]
    fn other_is_never_retried() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Other), RetryDecision::NoRetry);
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let p = RetryPolicy {
            max_attempts: 20,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
        };
        assert_eq!(delay(p.decide(1, ErrorKind::Timeout)), Duration::from_millis(100));
        assert_eq!(delay(p.decide(2, ErrorKind::Timeout)), Duration::from_millis(200));
        assert_eq!(delay(p.decide(3, ErrorKind::Connection)), Duration::from_millis(400));
        assert_eq!(delay(p.decide(12, ErrorKind::Throttled)), Duration::from_secs(1));
    }

    #[test]
    fn stops_at_max_attempts() {
        let p = RetryPolicy {
            max_attempts: 3,
            ..RetryPolicy::default()
        };
        assert!(matches!(
            p.decide(2, ErrorKind::Http5xx(502)),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::Http5xx(502)), RetryDecision::NoRetry);
    }

    #[test]
    fn none_policy_never_retries() {
        assert_eq!(
            RetryPolicy::none().decide(1, ErrorKind::Timeout),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn from_config() {
        let cfg = RetryConfig {
            max_attempts: 0,
            base_delay_secs: 0.5,
            max_delay_secs: 4,
        };
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.base_delay, Duration::from_millis(500));
        assert_eq!(p.max_delay, Duration::from_secs(4));
    }

    #[test]
    fn out_of_range_base_delay_is_clamped() {
        let cfg = |base_delay_secs| RetryConfig {
            max_attempts: 3,
            base_delay_secs,
            max_delay_secs: 10,
        };
        assert_eq!(RetryPolicy::from(&cfg(f64::INFINITY)).base_delay, Duration::from_secs(10));
        assert_eq!(RetryPolicy::from(&cfg(1e300)).base_delay, Duration::from_secs(10));
        assert_eq!(RetryPolicy::from(&cfg(f64::NAN)).base_delay, Duration::ZERO);
        assert_eq!(RetryPolicy::from(&cfg(-1.0)).base_delay, Duration::ZERO);
    }
}
