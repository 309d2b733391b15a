//! Workflow layer.
//!
//! [`App`] turns CLI commands into sequences of [`ScanService`] calls and
//! writes their results. Each step finishes before the next starts: `ci`
//! uploads, scans, saves both reports and only then checks the gate.

mod error;
pub mod gate;

pub use error::{AppError, AppResult};
pub use gate::{CheckPassed, ThresholdViolation, Thresholds};

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::{Command, ReportFormat};
use crate::models::{ScanResult, UploadResult};
use crate::output::PrettyPrint;
use crate::traits::ScanService;

/// Name used in the follow-up hints printed after an upload.
pub const APP_NAME: &str = "mobsf-cli";

/// How records are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summaries and tables, plus progress lines.
    #[default]
    Pretty,
    /// One pretty-printed JSON document per record, no progress lines.
    Json,
}

/// Paths of the reports saved by a `ci` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReports {
    pub pdf: PathBuf,
    pub json: PathBuf,
}

impl SavedReports {
    /// `<dir>/report_<file_name>.pdf` and `.json`.
    pub fn in_dir(dir: &Path, file_name: &str) -> Self {
        Self {
            pdf: dir.join(format!("report_{file_name}.pdf")),
            json: dir.join(format!("report_{file_name}.json")),
        }
    }
}

/// Runs commands against a [`ScanService`] and writes to `W`.
pub struct App<S, W = io::Stdout> {
    service: S,
    out: W,
    format: OutputFormat,
}

impl<S: ScanService> App<S, io::Stdout> {
    /// An app writing to stdout.
    pub fn stdout(service: S) -> Self {
        Self::new(service, io::stdout())
    }
}

impl<S: ScanService, W: Write> App<S, W> {
    pub fn new(service: S, out: W) -> Self {
        Self {
            service,
            out,
            format: OutputFormat::default(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Give back the output sink (used by tests to inspect what was written).
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run one CLI command.
    pub async fn execute(&mut self, command: Command) -> AppResult<()> {
        tracing::debug!(?command, "executing");
        let thresholds = command.thresholds();

        match command {
            Command::Upload { file_path } => {
                self.upload_file(&file_path).await?;
            }
            Command::Scan {
                scan_type,
                file_name,
                hash,
                rescan,
            } => {
                self.scan(scan_type.as_str(), &file_name, &hash, rescan)
                    .await?;
            }
            Command::Scans => self.scans().await?,
            Command::Report { format } => match format {
                ReportFormat::Pdf { hash, output } => self.report_pdf(&hash, &output).await?,
                ReportFormat::Json {
                    hash,
                    print: true,
                    ..
                } => self.print_report_json(&hash).await?,
                ReportFormat::Json { hash, output, .. } => {
                    self.write_report_json(&hash, &output).await?
                }
            },
            Command::Delete { hash } => self.delete_scan(&hash).await?,
            Command::Play { file_path, rescan } => {
                self.play(&file_path, rescan).await?;
            }
            Command::Ci {
                file_path,
                report_dir,
                rescan,
                ..
            } => {
                let thresholds = thresholds.unwrap_or_default();
                self.ci(&file_path, rescan, &report_dir, &thresholds)
                    .await?;
            }
            Command::Source {
                source_type,
                file_path,
                hash,
            } => {
                self.view_source(source_type.as_str(), &file_path, &hash)
                    .await?
            }
        }

        Ok(())
    }

    /// Upload a file and print the follow-up scan command.
    pub async fn upload_file(&mut self, path: &Path) -> AppResult<UploadResult> {
        let upload = self.service.upload(path).await?;
        self.emit(&upload)?;
        self.progress(&format!(
            "Start scan command: {APP_NAME} scan {} {} {}",
            upload.scan_type, upload.file_name, upload.hash
        ))?;
        Ok(upload)
    }

    pub async fn scans(&mut self) -> AppResult<()> {
        let scans = self.service.list_scans().await?;
        self.emit(&scans)
    }

    pub async fn scan(
        &mut self,
        scan_type: &str,
        file_name: &str,
        hash: &str,
        rescan: bool,
    ) -> AppResult<ScanResult> {
        let scan = self
            .service
            .scan(scan_type, file_name, hash, rescan)
            .await?;
        self.emit(&scan)?;
        Ok(scan)
    }

    pub async fn delete_scan(&mut self, hash: &str) -> AppResult<()> {
        let deleted = self.service.delete_scan(hash).await?;
        self.emit(&deleted)
    }

    /// Upload then scan.
    pub async fn play(&mut self, path: &Path, rescan: bool) -> AppResult<(UploadResult, ScanResult)> {
        self.progress("Uploading...")?;
        let upload = self.service.upload(path).await?;
        self.emit(&upload)?;

        self.progress("Scanning. It takes some time...")?;
        let scan = self
            .service
            .scan(&upload.scan_type, &upload.file_name, &upload.hash, rescan)
            .await?;
        self.emit(&scan)?;

        Ok((upload, scan))
    }

    /// Upload, scan, save both reports, then apply the gate.
    ///
    /// Reports are saved before the gate runs so a failing build still
    /// leaves them behind for inspection.
    pub async fn ci(
        &mut self,
        path: &Path,
        rescan: bool,
        report_dir: &Path,
        thresholds: &Thresholds,
    ) -> AppResult<ScanResult> {
        let (upload, scan) = self.play(path, rescan).await?;

        let reports = SavedReports::in_dir(report_dir, &scan.file_name);
        self.progress("Downloading reports...")?;

        self.service
            .download_pdf_report(&upload.hash, &reports.pdf)
            .await?;
        self.progress(&format!("Pdf report saved: {}", reports.pdf.display()))?;

        self.service
            .write_json_report(&upload.hash, &reports.json)
            .await?;
        self.progress(&format!("Json report saved: {}", reports.json.display()))?;

        self.progress("Validating scan scores...")?;
        let passed = thresholds.check(&scan).map_err(|violation| {
            tracing::info!(%violation, "ci gate failed");
            violation
        })?;
        for check in passed {
            self.progress(&check.to_string())?;
        }

        Ok(scan)
    }

    pub async fn report_pdf(&mut self, hash: &str, dest: &Path) -> AppResult<()> {
        self.service.download_pdf_report(hash, dest).await?;
        self.progress(&format!("Pdf report saved: {}", dest.display()))
    }

    pub async fn write_report_json(&mut self, hash: &str, dest: &Path) -> AppResult<()> {
        self.service.write_json_report(hash, dest).await?;
        self.progress(&format!("Json report saved: {}", dest.display()))
    }

    /// Print the raw JSON report; it is written as-is in both output formats.
    pub async fn print_report_json(&mut self, hash: &str) -> AppResult<()> {
        let report = self.service.fetch_json_report(hash).await?;
        writeln!(self.out, "{report}")?;
        Ok(())
    }

    pub async fn view_source(
        &mut self,
        scan_type: &str,
        file_path: &str,
        hash: &str,
    ) -> AppResult<()> {
        let source = self.service.view_source(scan_type, file_path, hash).await?;
        self.emit(&source)
    }

    fn emit<T: PrettyPrint + Serialize>(&mut self, item: &T) -> AppResult<()> {
        match self.format {
            OutputFormat::Pretty => writeln!(self.out, "{}\n", item.pretty_print())?,
            OutputFormat::Json => writeln!(self.out, "{}", serde_json::to_string_pretty(item)?)?,
        }
        Ok(())
    }

    fn progress(&mut self, line: &str) -> AppResult<()> {
        if self.format == OutputFormat::Pretty {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }
}
