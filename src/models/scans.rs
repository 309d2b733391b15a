//! Scan history models and operation.
//!
//! The history endpoint has shipped both upper-case (`SCAN_TYPE`) and
//! lower-case (`scan_type`) keys over time, so entries are decoded through an
//! alias lookup rather than a plain derive.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::client::{MobsfClient, SCANS_API};
use crate::error::Result;
use crate::models::{lookup, lookup_string};

/// One row of scan history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanListEntry {
    pub scan_type: String,
    pub analyzer: String,
    /// When the scan ran. `None` if the server sent no timestamp or one that
    /// could not be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    pub md5: String,
    pub version_name: String,
    pub app_name: String,
    pub package_name: String,
    pub file_name: String,
}

impl ScanListEntry {
    /// Decode from a JSON object, accepting upper- and lower-case keys.
    ///
    /// Missing string fields default to empty. Present fields of the wrong
    /// type are an error.
    pub fn from_map(map: &Map<String, Value>) -> core::result::Result<Self, String> {
        Ok(Self {
            scan_type: lookup_string(map, &["SCAN_TYPE", "scan_type"])?,
            analyzer: lookup_string(map, &["ANALYZER", "analyzer"])?,
            timestamp: lookup(map, &["TIMESTAMP", "timestamp"]).and_then(parse_timestamp),
            md5: lookup_string(map, &["MD5", "md5"])?,
            version_name: lookup_string(map, &["VERSION_NAME", "version_name"])?,
            app_name: lookup_string(map, &["APP_NAME", "app_name"])?,
            package_name: lookup_string(map, &["PACKAGE_NAME", "package_name"])?,
            file_name: lookup_string(map, &["FILE_NAME", "file_name"])?,
        })
    }
}

impl<'de> Deserialize<'de> for ScanListEntry {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(&map).map_err(serde::de::Error::custom)
    }
}

/// Parse the timestamp formats MobSF has used. Unparseable values yield
/// `None` instead of an error.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// A page of scan history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScanListResponse")]
pub struct ScanListResult {
    pub entries: Vec<ScanListEntry>,
    /// Total scans known to the server.
    pub count: u64,
    pub num_pages: u64,
}

impl ScanListResult {
    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, ScanListEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ScanListResult {
    type Item = &'a ScanListEntry;
    type IntoIter = std::slice::Iter<'a, ScanListEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// API response wrapper for the history endpoint.
#[derive(Debug, Deserialize)]
struct ScanListResponse {
    #[serde(default)]
    content: Vec<ScanListEntry>,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    num_pages: Option<u64>,
}

impl From<ScanListResponse> for ScanListResult {
    fn from(data: ScanListResponse) -> Self {
        let count = data.count.unwrap_or(data.content.len() as u64);
        Self {
            entries: data.content,
            count,
            num_pages: data.num_pages.unwrap_or(1),
        }
    }
}

impl MobsfClient {
    /// List recent scans.
    ///
    /// # Errors
    ///
    /// `TransportError` when the request cannot complete, `InvalidResponse`
    /// for non-200 or undecodable answers.
    #[tracing::instrument(skip(self))]
    pub async fn list_scans(&self) -> Result<ScanListResult> {
        let response = self.get(SCANS_API, self.timeout()).await?;
        Self::decode_json(response, self.timeout()).await
    }
}
