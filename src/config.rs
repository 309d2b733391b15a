//! Client configuration.
//!
//! Values come from the environment (`MOBSF_API_KEY`, `MOBSF_SERVER`) or are
//! set explicitly; the CLI layers its own flags on top.

use std::env;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Server used when none is configured.
pub const DEFAULT_SERVER: &str = "http://localhost:8000";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MOBSF_API_KEY";

/// Environment variable holding the server URL.
pub const SERVER_ENV: &str = "MOBSF_SERVER";

/// Timeout for metadata calls (upload, scans, delete, source).
///
/// Every timeout here limits inactivity: connecting, a stretch without
/// progress while sending, or the wait for the next piece of the answer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the scan call; static analysis of a large app is slow.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for report downloads.
pub const DEFAULT_REPORT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything needed to build a [`MobsfClient`](crate::MobsfClient).
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    pub api_key: String,
    pub server: String,
    pub timeout: Duration,
    pub scan_timeout: Duration,
    pub report_timeout: Duration,
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server", &self.server)
            .field("timeout", &self.timeout)
            .field("scan_timeout", &self.scan_timeout)
            .field("report_timeout", &self.report_timeout)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            server: DEFAULT_SERVER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            report_timeout: DEFAULT_REPORT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration for the given key and server, with default timeouts.
    pub fn new(api_key: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            server: server.into(),
            ..Self::default()
        }
    }

    /// Read `MOBSF_API_KEY` and `MOBSF_SERVER`, falling back to an empty key
    /// and [`DEFAULT_SERVER`].
    pub fn from_env() -> Self {
        let api_key = env::var(API_KEY_ENV).unwrap_or_default();
        let server = env::var(SERVER_ENV).unwrap_or_else(|_| DEFAULT_SERVER.to_string());
        Self::new(api_key, server)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_report_timeout(mut self, timeout: Duration) -> Self {
        self.report_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
