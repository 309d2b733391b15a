//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use super::state::{ScanProfile, StoredUpload};
use crate::{ScanListEntry, ScanResult};

/// Hash of the preloaded sample app.
pub const SAMPLE_HASH: &str = "3a552566097a8de588b8184b059b0158";

/// Collection of fixture factories for test data.
pub struct Fixtures;

/// Data the default server starts with.
pub struct DefaultScenario {
    pub uploads: Vec<StoredUpload>,
    pub scans: Vec<(String, ScanResult)>,
}

impl Fixtures {
    /// The DIVA sample app, uploaded.
    pub fn sample_upload() -> StoredUpload {
        StoredUpload {
            hash: SAMPLE_HASH.to_string(),
            file_name: "diva-beta.apk".to_string(),
            scan_type: "apk".to_string(),
            size: 1_502_294,
        }
    }

    /// A scan of an uploaded file with the given scores.
    pub fn scan_for_upload(upload: &StoredUpload, profile: &ScanProfile) -> ScanResult {
        let stem = upload
            .file_name
            .rsplit_once('.')
            .map_or(upload.file_name.as_str(), |(stem, _)| stem);
        let android = matches!(upload.scan_type.as_str(), "apk" | "xapk" | "apks");

        ScanResult {
            title: "Static Analysis".to_string(),
            version: "v4.0.0".to_string(),
            file_name: upload.file_name.clone(),
            app_name: stem.to_string(),
            app_type: upload.scan_type.clone(),
            package_name: android.then(|| format!("com.example.{}", stem.to_lowercase())),
            size: format!("{}MB", (upload.size / 1_000_000).max(1)),
            md5: upload.hash.clone(),
            sha1: format!("{}{}", upload.hash, upload.hash.get(..8).unwrap_or_default()),
            sha256: upload.hash.repeat(2),
            average_cvss: profile.average_cvss,
            security_score: profile.security_score,
            trackers: if android { profile.trackers } else { None },
        }
    }

    /// History row for a scan, in the shape the scans endpoint lists.
    pub fn history_entry(hash: &str, scan: &ScanResult) -> ScanListEntry {
        ScanListEntry {
            scan_type: scan.app_type.clone(),
            analyzer: "static_analyzer".to_string(),
            timestamp: None,
            md5: hash.to_string(),
            version_name: "1.0".to_string(),
            app_name: scan.app_name.clone(),
            package_name: scan.package_name.clone().unwrap_or_default(),
            file_name: scan.file_name.clone(),
        }
    }

    /// Placeholder decompiled source for a path.
    pub fn generated_source(path: &str, scan: &ScanResult) -> String {
        let class = path
            .rsplit('/')
            .next()
            .and_then(|name| name.split('.').next())
            .unwrap_or("Main");
        let package = scan.package_name.as_deref().unwrap_or("app");

        format!("package {package};\n\npublic class {class} {{\n}}\n")
    }

    /// PDF body served for a hash. Larger than one download chunk so the
    /// client has to stream it.
    pub fn pdf_report(hash: &str) -> Vec<u8> {
        let mut body = format!("%PDF-1.4\n% MobSF report {hash}\n").into_bytes();
        while body.len() < 20_000 {
            body.extend_from_slice(b"0 0 0 rg 0 0 612 792 re f\n");
        }
        body.extend_from_slice(b"%%EOF\n");
        body
    }

    /// JSON report for a scan: the summary fields plus analysis sections.
    pub fn json_report(scan: &ScanResult) -> serde_json::Value {
        let mut report = serde_json::to_value(scan).unwrap_or_default();
        if let Some(map) = report.as_object_mut() {
            map.insert(
                "appsec".to_string(),
                serde_json::json!({
                    "high": [],
                    "warning": [],
                    "info": [],
                    "secure": [],
                    "security_score": scan.security_score,
                }),
            );
            map.insert("permissions".to_string(), serde_json::json!({}));
        }
        report
    }

    /// The default scenario: one scanned sample app.
    pub fn default_scenario() -> DefaultScenario {
        let upload = Self::sample_upload();
        let scan = Self::scan_for_upload(&upload, &ScanProfile::default());

        DefaultScenario {
            scans: vec![(upload.hash.clone(), scan)],
            uploads: vec![upload],
        }
    }
}
