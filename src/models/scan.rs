//! Scan model and operation.

use serde::{Deserialize, Serialize};

use crate::client::{MobsfClient, SCAN_API};
use crate::error::Result;

/// Result of a static-analysis scan.
///
/// `package_name` and `trackers` are absent for some app types (iOS zips,
/// Windows packages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub title: String,
    pub version: String,
    pub file_name: String,
    pub app_name: String,
    pub app_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    /// Human-readable size as reported by the server (e.g. "10MB").
    pub size: String,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    /// Average CVSS of the findings, 0.0 to 10.0.
    pub average_cvss: f64,
    /// Overall security rating, 0 to 100.
    pub security_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trackers: Option<TrackerInfo>,
}

/// Tracker detection summary.
///
/// `detected_trackers <= total_trackers` is expected but not checked; the
/// values are passed through as the server sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerInfo {
    pub detected_trackers: u32,
    pub total_trackers: u32,
}

impl ScanResult {
    /// Number of detected trackers, if the scan reports trackers at all.
    pub fn detected_trackers(&self) -> Option<u32> {
        self.trackers.map(|t| t.detected_trackers)
    }
}

#[derive(Debug, Serialize)]
struct ScanForm<'a> {
    scan_type: &'a str,
    file_name: &'a str,
    hash: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    re_scan: Option<&'static str>,
}

impl MobsfClient {
    /// Scan a previously uploaded file.
    ///
    /// Uses the extended scan timeout. With `rescan` the server analyses the
    /// file again instead of returning the cached result.
    ///
    /// # Errors
    ///
    /// `TransportError` when the request cannot complete, `InvalidResponse`
    /// for non-200 or undecodable answers.
    #[tracing::instrument(skip(self))]
    pub async fn scan(
        &self,
        scan_type: &str,
        file_name: &str,
        hash: &str,
        rescan: bool,
    ) -> Result<ScanResult> {
        let form = ScanForm {
            scan_type,
            file_name,
            hash,
            re_scan: rescan.then_some("1"),
        };

        let response = self
            .post_form(SCAN_API, &form, self.scan_timeout())
            .await?;
        Self::decode_json(response, self.scan_timeout()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::decode;
    use serde_json::json;

    fn scan_json() -> serde_json::Value {
        json!({
            "title": "Test App",
            "version": "1.0",
            "file_name": "test.apk",
            "app_name": "TestApp",
            "app_type": "apk",
            "package_name": "com.test.app",
            "size": "10MB",
            "md5": "abc123",
            "sha1": "def456",
            "sha256": "ghi789",
            "average_cvss": 3.5,
            "security_score": 75,
            "trackers": {
                "detected_trackers": 2,
                "total_trackers": 407
            }
        })
    }

    #[test]
    fn test_scan_result_decode() {
        let scan: ScanResult = decode(scan_json()).unwrap();

        assert_eq!(scan.title, "Test App");
        assert_eq!(scan.package_name.as_deref(), Some("com.test.app"));
        assert_eq!(scan.average_cvss, 3.5);
        assert_eq!(scan.security_score, 75);
        assert_eq!(
            scan.trackers,
            Some(TrackerInfo {
                detected_trackers: 2,
                total_trackers: 407
            })
        );
        assert_eq!(scan.detected_trackers(), Some(2));
    }

    #[test]
    fn test_scan_result_without_trackers() {
        let mut value = scan_json();
        let obj = value.as_object_mut().unwrap();
        obj.remove("trackers");
        obj.remove("package_name");

        let scan: ScanResult = decode(value).unwrap();
        assert!(scan.trackers.is_none());
        assert!(scan.package_name.is_none());
        assert_eq!(scan.detected_trackers(), None);
    }

    #[test]
    fn test_scan_result_integer_cvss() {
        let mut value = scan_json();
        value["average_cvss"] = json!(4);

        let scan: ScanResult = decode(value).unwrap();
        assert_eq!(scan.average_cvss, 4.0);
    }

    #[test]
    fn test_scan_result_rejects_string_score() {
        let mut value = scan_json();
        value["security_score"] = json!("75");

        let err = decode::<ScanResult>(value).unwrap_err();
        assert_eq!(err.cause, crate::ErrorCause::InvalidResponse);
    }

    #[test]
    fn test_scan_result_rejects_missing_md5() {
        let mut value = scan_json();
        value.as_object_mut().unwrap().remove("md5");

        assert!(decode::<ScanResult>(value).is_err());
    }

    #[test]
    fn test_trackers_passed_through_unchecked() {
        let mut value = scan_json();
        value["trackers"] = json!({"detected_trackers": 9, "total_trackers": 3});

        let scan: ScanResult = decode(value).unwrap();
        assert_eq!(scan.detected_trackers(), Some(9));
    }

    #[test]
    fn test_scan_form_rescan_flag() {
        let form = ScanForm {
            scan_type: "apk",
            file_name: "a.apk",
            hash: "h",
            re_scan: Some("1"),
        };
        let encoded = serde_json::to_value(&form).unwrap();
        assert_eq!(encoded["re_scan"], "1");

        let form = ScanForm { re_scan: None, ..form };
        let encoded = serde_json::to_value(&form).unwrap();
        assert!(encoded.get("re_scan").is_none());
    }
}
