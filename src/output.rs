//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::{DeleteResult, ScanListEntry, ScanListResult, ScanResult, SourceViewResult, UploadResult};

/// Trait for human-readable output.
///
/// Implemented by response records to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for UploadResult {
    fn pretty_print(&self) -> String {
        [
            format!("Analyzer:       {}", self.analyzer),
            format!("Status:         {}", self.status),
            format!("Hash:           {}", self.hash),
            format!("Scan type:      {}", self.scan_type),
            format!("File name:      {}", self.file_name),
        ]
        .join("\n")
    }
}

impl PrettyPrint for ScanResult {
    fn pretty_print(&self) -> String {
        let divider = "─".repeat(self.title.chars().count().max(30));

        let mut lines = vec![
            format!("Title: {}", self.title),
            divider,
            format!("Version:        {}", self.version),
            format!("File name:      {}", self.file_name),
            format!("App name:       {}", self.app_name),
            format!("App type:       {}", self.app_type),
        ];

        if let Some(ref package) = self.package_name {
            lines.push(format!("Package name:   {}", package));
        }

        lines.push(format!("Size:           {}", self.size));
        lines.push(format!("MD5:            {}", self.md5));
        lines.push(format!("SHA1:           {}", self.sha1));
        lines.push(format!("SHA256:         {}", self.sha256));
        lines.push(format!("Average CVSS:   {}", self.average_cvss));
        lines.push(format!("Security score: {}/100", self.security_score));

        if let Some(ref trackers) = self.trackers {
            lines.push(format!(
                "Trackers:       {}/{}",
                trackers.detected_trackers, trackers.total_trackers
            ));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for DeleteResult {
    fn pretty_print(&self) -> String {
        format!("Deleted: {}", self.deleted_hash)
    }
}

impl PrettyPrint for SourceViewResult {
    fn pretty_print(&self) -> String {
        let header = [
            format!("Title:          {}", self.title),
            format!("File:           {}", self.file_path),
            format!("Type:           {}", self.file_type),
            format!("Version:        {}", self.version),
        ]
        .join("\n");

        format!("{header}\n\n{}", self.source_text)
    }
}

impl PrettyPrint for ScanListResult {
    fn pretty_print(&self) -> String {
        if self.is_empty() {
            return "No scans found.".to_string();
        }

        let rows: Vec<ScanRow> = self.iter().map(ScanRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::ascii());

        format!(
            "{table}\n{} scans, {} page(s)",
            self.count, self.num_pages
        )
    }
}

/// Table row for the scan history.
#[derive(Debug, Tabled)]
pub struct ScanRow {
    #[tabled(rename = "Type")]
    pub scan_type: String,
    #[tabled(rename = "Analyzer")]
    pub analyzer: String,
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Hash")]
    pub hash: String,
    #[tabled(rename = "Version")]
    pub version: String,
    #[tabled(rename = "App name")]
    pub app_name: String,
    #[tabled(rename = "Package name")]
    pub package_name: String,
    #[tabled(rename = "File name")]
    pub file_name: String,
}

impl From<&ScanListEntry> for ScanRow {
    fn from(e: &ScanListEntry) -> Self {
        Self {
            scan_type: e.scan_type.clone(),
            analyzer: e.analyzer.clone(),
            time: e
                .timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
            hash: ellipsize(&e.md5, 12),
            version: e.version_name.clone(),
            app_name: truncate(&e.app_name, 20),
            package_name: truncate(&e.package_name, 20),
            file_name: truncate(&e.file_name, 20),
        }
    }
}

/// First `max` characters of `s`.
pub fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// First `max` characters of `s`, followed by `...` if anything was cut.
pub fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", truncate(s, max))
    } else {
        s.to_string()
    }
}
