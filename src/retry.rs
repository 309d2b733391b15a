//! Transport-level retry policy.
//!
//! Transient statuses (429 and the usual 5xx gateway family) and connection
//! failures are retried a bounded number of times with exponential backoff.
//! A server's `Retry-After` on 413, 429 and 503 replaces the computed delay.
//! Nothing above the client retries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode};

/// Statuses that are worth another attempt.
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Statuses whose `Retry-After` header is honoured.
pub const RETRY_AFTER_STATUSES: [u16; 3] = [413, 429, 503];

/// Ceiling for the computed backoff.
pub const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Bounded exponential-backoff retry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Sleep before retry `n` (n >= 2) is `backoff_factor * 2^(n-1)`. The
    /// first retry goes out immediately.
    pub backoff_factor: Duration,
    /// Response statuses that trigger a retry.
    pub retry_statuses: Vec<u16>,
    /// Methods that may be retried.
    pub allowed_methods: Vec<Method>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_secs(1),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            allowed_methods: vec![
                Method::HEAD,
                Method::GET,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
                Method::TRACE,
            ],
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Same policy with a different backoff base.
    #[must_use]
    pub fn with_backoff(mut self, backoff_factor: Duration) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    /// Same policy with a different retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether `method` is eligible for retry at all.
    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method)
    }

    /// Whether a response with `status` should be retried, given that
    /// `retries_done` retries have already happened.
    pub fn should_retry_status(&self, method: &Method, status: StatusCode, retries_done: u32) -> bool {
        retries_done < self.max_retries
            && self.allows(method)
            && self.retry_statuses.contains(&status.as_u16())
    }

    /// Whether a failed send should be retried.
    pub fn should_retry_error(&self, method: &Method, err: &reqwest::Error, retries_done: u32) -> bool {
        retries_done < self.max_retries && self.allows(method) && err.is_connect()
    }

    /// Whether an attempt that stalled past its timeout should be retried.
    pub fn should_retry_timeout(&self, method: &Method, retries_done: u32) -> bool {
        retries_done < self.max_retries && self.allows(method)
    }

    /// Delay before retry number `retry` (1-based), capped at [`MAX_BACKOFF`].
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exponent = (retry - 1).min(16);
        self.backoff_factor
            .saturating_mul(1u32 << exponent)
            .min(MAX_BACKOFF)
    }

    /// Delay before retrying a response with `status`: the server's
    /// `Retry-After` when the status carries one, else [`backoff`](Self::backoff).
    pub fn delay_for(&self, retry: u32, status: StatusCode, headers: &HeaderMap) -> Duration {
        if RETRY_AFTER_STATUSES.contains(&status.as_u16()) {
            if let Some(delay) = retry_after(headers) {
                return delay;
            }
        }
        self.backoff(retry)
    }
}

/// Parse a `Retry-After` header: whole seconds or an HTTP date. A date in
/// the past means no wait.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?;
    Some(
        at.with_timezone(&Utc)
            .signed_duration_since(Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO),
    )
}
