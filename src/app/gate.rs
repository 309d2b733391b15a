//! CI quality gate.
//!
//! A finished scan passes when its average CVSS is at most the limit, its
//! security score is at least the limit, and (when the scan reports
//! trackers) the detected tracker count is at most the limit. Checks run in
//! that order and stop at the first violation.

use thiserror::Error;

use crate::models::ScanResult;

pub const DEFAULT_MAX_CVSS: f64 = 3.9;
pub const DEFAULT_MAX_TRACKERS: u32 = 0;
pub const DEFAULT_MIN_SECURITY: u32 = 71;

/// A metric outside its configured limit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdViolation {
    #[error("CVSS score [{value}] is too high. Max: {limit}! (over by {:.1})", cvss_excess(.value, .limit))]
    Cvss { value: f64, limit: f64 },

    #[error("Security score [{value}] is too low. Min: {limit}! (under by {})", count_gap(.value, .limit))]
    SecurityScore { value: u32, limit: u32 },

    #[error("Trackers score [{value}] is too high. Max: {limit}! (over by {})", count_gap(.value, .limit))]
    Trackers { value: u32, limit: u32 },
}

fn cvss_excess(value: &f64, limit: &f64) -> f64 {
    value - limit
}

fn count_gap(value: &u32, limit: &u32) -> u32 {
    value.abs_diff(*limit)
}

/// Limits applied to a scan by the `ci` command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Highest acceptable average CVSS (0.0 to 10.0).
    pub max_cvss: f64,
    /// Highest acceptable number of detected trackers.
    pub max_trackers: u32,
    /// Lowest acceptable security score (0 to 100).
    pub min_security: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_cvss: DEFAULT_MAX_CVSS,
            max_trackers: DEFAULT_MAX_TRACKERS,
            min_security: DEFAULT_MIN_SECURITY,
        }
    }
}

/// Outcome of one passed check, for progress output.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckPassed {
    pub metric: &'static str,
    pub value: String,
    pub limit: String,
}

impl std::fmt::Display for CheckPassed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}/{}. OK", self.metric, self.value, self.limit)
    }
}

impl Thresholds {
    pub fn check_cvss(&self, scan: &ScanResult) -> Result<CheckPassed, ThresholdViolation> {
        if scan.average_cvss > self.max_cvss {
            return Err(ThresholdViolation::Cvss {
                value: scan.average_cvss,
                limit: self.max_cvss,
            });
        }
        Ok(CheckPassed {
            metric: "CVSS score",
            value: scan.average_cvss.to_string(),
            limit: self.max_cvss.to_string(),
        })
    }

    pub fn check_security(&self, scan: &ScanResult) -> Result<CheckPassed, ThresholdViolation> {
        if scan.security_score < self.min_security {
            return Err(ThresholdViolation::SecurityScore {
                value: scan.security_score,
                limit: self.min_security,
            });
        }
        Ok(CheckPassed {
            metric: "Security score",
            value: scan.security_score.to_string(),
            limit: self.min_security.to_string(),
        })
    }

    /// `Ok(None)` when the scan has no tracker data to check.
    pub fn check_trackers(
        &self,
        scan: &ScanResult,
    ) -> Result<Option<CheckPassed>, ThresholdViolation> {
        let Some(detected) = scan.detected_trackers() else {
            return Ok(None);
        };

        if detected > self.max_trackers {
            return Err(ThresholdViolation::Trackers {
                value: detected,
                limit: self.max_trackers,
            });
        }
        Ok(Some(CheckPassed {
            metric: "Trackers score",
            value: detected.to_string(),
            limit: self.max_trackers.to_string(),
        }))
    }

    /// Run every check in order, returning the passed checks or the first
    /// violation.
    pub fn check(&self, scan: &ScanResult) -> Result<Vec<CheckPassed>, ThresholdViolation> {
        let mut passed = vec![self.check_cvss(scan)?, self.check_security(scan)?];
        passed.extend(self.check_trackers(scan)?);
        Ok(passed)
    }
}
