//! When, and for how long, a failed indexer query is repeated.
//!
//! Snapshot queries are plain GETs, so any of them may be sent again. A retry
//! follows a transport failure, a timeout, or a status listed in
//! [`RetryConfig::retryable_statuses`]. A rate-limited response honours the
//! server's `Retry-After` hint, but never waits longer than
//! [`RetryConfig::max_delay`].

use crate::error::HttpError;
use rand::Rng;
use std::time::Duration;

/// How many times a snapshot query is attempted.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// Single attempt.
    #[default]
    None,
    /// [`RetryConfig::idempotent`]. Used for every snapshot query.
    Idempotent,
    /// Caller-provided settings.
    Custom(RetryConfig),
}

impl RetryPolicy {
    /// `None` means the query is sent once.
    pub fn config(&self) -> Option<RetryConfig> {
        match self {
            RetryPolicy::None => None,
            RetryPolicy::Idempotent => Some(RetryConfig::idempotent()),
            RetryPolicy::Custom(c) => Some(c.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Wait before the first retry when the server gave no hint.
    pub initial_delay: Duration,
    /// Upper bound on any single wait, including a server `Retry-After`.
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// Scale each computed wait by a random factor in `[0.75, 1.25]`.
    pub jitter: bool,
    /// Statuses worth another attempt. Leaving out 429 makes a rate-limited
    /// response fail immediately.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::idempotent()
    }
}

impl RetryConfig {
    /// Three retries starting at 200ms, doubling up to 10s, on 429 and
    /// gateway errors.
    pub fn idempotent() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![429, 502, 503, 504],
        }
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Whether `error` is worth another attempt under this config.
    pub fn should_retry(&self, error: &HttpError) -> bool {
        match error {
            HttpError::ServerError { status, .. } => self.is_retryable_status(*status),
            HttpError::RateLimited { .. } => self.is_retryable_status(429),
            HttpError::Timeout => true,
            HttpError::Reqwest(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Wait before retry number `attempt` (0-indexed) after `error`.
    ///
    /// A server `Retry-After` wins over the computed backoff, clipped to
    /// `max_delay`.
    pub fn wait_before_retry(&self, attempt: u32, error: &HttpError) -> Duration {
        match error {
            HttpError::RateLimited {
                retry_after_ms: Some(ms),
            } => Duration::from_millis(*ms).min(self.max_delay),
            _ => self.backoff(attempt),
        }
    }

    /// Exponential backoff for retry number `attempt`, clipped to `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let cap_ms = self.max_delay.as_millis() as f64;
        let grown = self.initial_delay.as_millis() as f64
            * self.backoff_factor.powi(attempt.min(64) as i32);
        let mut ms = grown.min(cap_ms);
        if self.jitter {
            ms *= rand::thread_rng().gen_range(0.75..=1.25);
        }
        Duration::from_millis(ms.max(0.0) as u64)
    }
}

/// Parse a `Retry-After` header given in whole seconds.
///
/// HTTP-date values are not used by the indexer and yield `None`.
pub(crate) fn parse_retry_after_ms(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}
