//! In-memory data behind the mock MobSF server.

use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use super::fixtures::Fixtures;
use crate::{ScanListEntry, ScanResult, TrackerInfo};

/// A file the mock server has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub hash: String,
    pub file_name: String,
    pub scan_type: String,
    pub size: usize,
}

/// Scores handed out for every scan the server runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanProfile {
    pub average_cvss: f64,
    pub security_score: u32,
    pub trackers: Option<TrackerInfo>,
}

impl Default for ScanProfile {
    fn default() -> Self {
        Self {
            average_cvss: 3.5,
            security_score: 75,
            trackers: Some(TrackerInfo {
                detected_trackers: 0,
                total_trackers: 407,
            }),
        }
    }
}

/// Everything the mock server knows: uploads, scans, history and the knobs
/// tests use to shape responses. Handlers see it behind `Arc<RwLock<_>>`.
#[derive(Debug, Default)]
pub struct MockState {
    /// Uploaded files indexed by hash.
    pub uploads: HashMap<String, StoredUpload>,

    /// Finished scans indexed by hash.
    pub scans: HashMap<String, ScanResult>,

    /// Scan history, oldest first.
    pub history: Vec<ScanListEntry>,

    /// Source files indexed by (hash, relative path).
    pub sources: HashMap<(String, String), String>,

    /// Scores used for newly run scans.
    pub profile: ScanProfile,

    /// Statuses returned (one per request, in order) before normal handling
    /// resumes. Used to exercise the client's retry policy.
    pub injected_failures: VecDeque<u16>,

    /// Number of API requests received, including rejected ones.
    pub requests: usize,

    /// Optional API key. If set, requests must send it in `Authorization`.
    pub required_api_key: Option<String>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap for sharing with the router.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add an uploaded file to the state.
    pub fn with_upload(mut self, upload: StoredUpload) -> Self {
        self.uploads.insert(upload.hash.clone(), upload);
        self
    }

    /// Add a finished scan (and its history row) to the state.
    pub fn with_scan(mut self, hash: &str, scan: ScanResult) -> Self {
        self.history.push(Fixtures::history_entry(hash, &scan));
        self.scans.insert(hash.to_string(), scan);
        self
    }

    /// Add a source file for a scanned hash.
    pub fn with_source(mut self, hash: &str, path: &str, contents: &str) -> Self {
        self.sources
            .insert((hash.to_string(), path.to_string()), contents.to_string());
        self
    }

    /// Set the scores for scans run from now on.
    pub fn with_profile(mut self, profile: ScanProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Queue statuses to answer with before serving normally.
    pub fn with_injected_failures(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.injected_failures.extend(statuses);
        self
    }

    /// Set the required API key.
    pub fn with_required_api_key(mut self, key: &str) -> Self {
        self.required_api_key = Some(key.to_string());
        self
    }

    /// Store an uploaded file, detecting the scan type from its extension.
    pub fn record_upload(&mut self, file_name: &str, contents: &[u8]) -> Result<StoredUpload, String> {
        let scan_type = scan_type_for(file_name).ok_or_else(|| "File format not Supported!".to_string())?;

        let upload = StoredUpload {
            hash: content_hash(contents),
            file_name: file_name.to_string(),
            scan_type: scan_type.to_string(),
            size: contents.len(),
        };
        self.uploads.insert(upload.hash.clone(), upload.clone());
        Ok(upload)
    }

    /// Run (or, without `rescan`, reuse) the scan for an uploaded hash.
    pub fn run_scan(&mut self, hash: &str, rescan: bool) -> Option<ScanResult> {
        if !rescan {
            if let Some(existing) = self.scans.get(hash) {
                return Some(existing.clone());
            }
        }

        let upload = self.uploads.get(hash)?.clone();
        let scan = Fixtures::scan_for_upload(&upload, &self.profile);

        self.history.retain(|entry| entry.md5 != hash);
        let mut entry = Fixtures::history_entry(hash, &scan);
        entry.timestamp = Some(Utc::now());
        self.history.push(entry);
        self.scans.insert(hash.to_string(), scan.clone());
        Some(scan)
    }

    /// Get a finished scan by hash.
    pub fn get_scan(&self, hash: &str) -> Option<&ScanResult> {
        self.scans.get(hash)
    }

    /// Remove everything known about a hash. Returns false if nothing was
    /// there.
    pub fn delete(&mut self, hash: &str) -> bool {
        let had_upload = self.uploads.remove(hash).is_some();
        let had_scan = self.scans.remove(hash).is_some();
        self.history.retain(|entry| entry.md5 != hash);
        self.sources.retain(|(h, _), _| h != hash);
        had_upload || had_scan
    }

    /// Source file contents, if the hash has been scanned.
    pub fn source(&self, hash: &str, path: &str) -> Option<String> {
        let scan = self.scans.get(hash)?;
        let key = (hash.to_string(), path.to_string());
        Some(
            self.sources
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Fixtures::generated_source(path, scan)),
        )
    }

    /// History rows, newest first.
    pub fn recent_scans(&self) -> Vec<&ScanListEntry> {
        self.history.iter().rev().collect()
    }
}

/// Scan type for a file name, by extension.
pub fn scan_type_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "apk" => Some("apk"),
        "xapk" => Some("xapk"),
        "apks" => Some("apks"),
        "ipa" => Some("ipa"),
        "zip" => Some("zip"),
        "appx" => Some("appx"),
        _ => None,
    }
}

/// Deterministic 32-hex-digit stand-in for the MD5 the real server uses.
pub fn content_hash(contents: &[u8]) -> String {
    let mut first = std::collections::hash_map::DefaultHasher::new();
    contents.hash(&mut first);

    let mut second = std::collections::hash_map::DefaultHasher::new();
    contents.len().hash(&mut second);
    contents.hash(&mut second);

    format!("{:016x}{:016x}", first.finish(), second.finish())
}
