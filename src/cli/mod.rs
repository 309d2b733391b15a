//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! mobsf-cli binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::app::gate::{DEFAULT_MAX_CVSS, DEFAULT_MAX_TRACKERS, DEFAULT_MIN_SECURITY};
use crate::app::{AppError, AppResult, OutputFormat, Thresholds};
use crate::client::MobsfClient;
use crate::config::{ClientConfig, DEFAULT_SERVER};

/// MobSF command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "mobsf-cli",
    about = "CLI wrapper for the Mobile Security Framework (MobSF) REST API",
    version
)]
pub struct Cli {
    /// API key (overrides MOBSF_API_KEY).
    #[arg(
        short = 'a',
        long = "api-key",
        env = "MOBSF_API_KEY",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true,
        global = true
    )]
    pub api_key: String,

    /// Server, e.g. http://localhost:8000 (overrides MOBSF_SERVER).
    #[arg(
        short = 's',
        long = "server",
        env = "MOBSF_SERVER",
        default_value = DEFAULT_SERVER,
        global = true
    )]
    pub server: String,

    /// Timeout in seconds for metadata calls.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output results as JSON instead of human-readable text.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Log level or filter directive (RUST_LOG takes precedence).
    #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Build the MobSF client from the global flags.
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] when the server URL or API key is unusable.
    pub fn client(&self) -> AppResult<MobsfClient> {
        MobsfClient::with_config(self.client_config())
            .map_err(|e| AppError::Config(format!("Failed to initialize MobSF client: {e}")))
    }

    /// Client configuration from the global flags.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.api_key.clone(), self.server.clone());
        match self.timeout {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Pretty
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a file.
    Upload {
        /// Path to the file to upload.
        file_path: PathBuf,
    },

    /// Scan an uploaded file.
    Scan {
        /// Scan type.
        scan_type: ScanType,

        /// File name, as returned by upload.
        file_name: String,

        /// File hash, as returned by upload.
        hash: String,

        /// Rescan a file.
        #[arg(short = 'r', long = "rescan")]
        rescan: bool,
    },

    /// Display recent scans.
    Scans,

    /// Get a report.
    Report {
        #[command(subcommand)]
        format: ReportFormat,
    },

    /// Delete a scan.
    Delete {
        /// File hash.
        hash: String,
    },

    /// Upload a file and start the scan.
    Play {
        /// Path to the file to upload.
        file_path: PathBuf,

        /// Rescan a file.
        #[arg(short = 'r', long = "rescan")]
        rescan: bool,
    },

    /// For CI/CD stages: upload, scan, save reports and check scores.
    Ci {
        /// Path to the file to upload.
        file_path: PathBuf,

        /// Directory to save the reports (pdf and json) in.
        #[arg(short = 'p', long = "path", required = true)]
        report_dir: PathBuf,

        /// Rescan a file.
        #[arg(short = 'r', long = "rescan")]
        rescan: bool,

        /// Fail above this average CVSS score (0.0-10.0).
        #[arg(short = 'c', long = "cvss", default_value_t = DEFAULT_MAX_CVSS)]
        cvss: f64,

        /// Fail above this number of detected trackers.
        #[arg(short = 't', long = "trackers", default_value_t = DEFAULT_MAX_TRACKERS)]
        trackers: u32,

        /// Fail below this security score (0-100).
        #[arg(short = 'u', long = "security", default_value_t = DEFAULT_MIN_SECURITY)]
        security: u32,
    },

    /// View a decompiled source file.
    Source {
        /// Source type.
        source_type: SourceType,

        /// Relative file path inside the app.
        file_path: String,

        /// File hash.
        hash: String,
    },
}

impl Command {
    /// Gate limits for `ci`; `None` for every other command.
    pub fn thresholds(&self) -> Option<Thresholds> {
        match *self {
            Command::Ci {
                cvss,
                trackers,
                security,
                ..
            } => Some(Thresholds {
                max_cvss: cvss,
                max_trackers: trackers,
                min_security: security,
            }),
            _ => None,
        }
    }
}

/// Report formats.
#[derive(Subcommand, Debug)]
pub enum ReportFormat {
    /// PDF report.
    Pdf {
        /// File hash.
        hash: String,

        /// Where to save the report.
        #[arg(short = 'o', long = "output", default_value = "report.pdf")]
        output: PathBuf,
    },

    /// JSON report.
    Json {
        /// File hash.
        hash: String,

        /// Where to save the report.
        #[arg(short = 'o', long = "output", default_value = "report.json")]
        output: PathBuf,

        /// Print to stdout instead of saving a file.
        #[arg(short = 'p', long = "print")]
        print: bool,
    },
}

/// Types accepted by the scan endpoint.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanType {
    Xapk,
    Apk,
    Zip,
    Ipa,
    Appx,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xapk => "xapk",
            Self::Apk => "apk",
            Self::Zip => "zip",
            Self::Ipa => "ipa",
            Self::Appx => "appx",
        }
    }
}

/// Types accepted by the view-source endpoint.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceType {
    Apk,
    Ipa,
    Studio,
    Eclipse,
    Ios,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apk => "apk",
            Self::Ipa => "ipa",
            Self::Studio => "studio",
            Self::Eclipse => "eclipse",
            Self::Ios => "ios",
        }
    }
}
