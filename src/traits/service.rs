//! ScanService trait for the remote operations.

use std::path::Path;

use async_trait::async_trait;

use crate::client::MobsfClient;
use crate::error::Result;
use crate::models::{DeleteResult, ScanListResult, ScanResult, SourceViewResult, UploadResult};

/// The operations MobSF exposes, one method per endpoint.
///
/// [`MobsfClient`] is the production implementation.
///
/// # Example
///
/// ```ignore
/// use mobsf_cli::{MobsfClient, ScanService};
///
/// let client = MobsfClient::from_env()?;
/// let uploaded = ScanService::upload(&client, Path::new("app.apk")).await?;
/// let scan = client
///     .scan(&uploaded.scan_type, &uploaded.file_name, &uploaded.hash, false)
///     .await?;
/// ```
#[async_trait]
pub trait ScanService: Send + Sync {
    /// Upload an application binary.
    async fn upload(&self, path: &Path) -> Result<UploadResult>;

    /// List recent scans.
    async fn list_scans(&self) -> Result<ScanListResult>;

    /// Scan an uploaded file.
    async fn scan(
        &self,
        scan_type: &str,
        file_name: &str,
        hash: &str,
        rescan: bool,
    ) -> Result<ScanResult>;

    /// Delete a scan.
    async fn delete_scan(&self, hash: &str) -> Result<DeleteResult>;

    /// Stream the PDF report into `dest`.
    async fn download_pdf_report(&self, hash: &str, dest: &Path) -> Result<()>;

    /// Fetch the JSON report as text.
    async fn fetch_json_report(&self, hash: &str) -> Result<String>;

    /// Fetch the JSON report and write it to `dest`.
    async fn write_json_report(&self, hash: &str, dest: &Path) -> Result<String>;

    /// Fetch one decompiled source file.
    async fn view_source(
        &self,
        scan_type: &str,
        file_path: &str,
        hash: &str,
    ) -> Result<SourceViewResult>;
}

#[async_trait]
impl ScanService for MobsfClient {
    async fn upload(&self, path: &Path) -> Result<UploadResult> {
        MobsfClient::upload(self, path).await
    }

    async fn list_scans(&self) -> Result<ScanListResult> {
        MobsfClient::list_scans(self).await
    }

    async fn scan(
        &self,
        scan_type: &str,
        file_name: &str,
        hash: &str,
        rescan: bool,
    ) -> Result<ScanResult> {
        MobsfClient::scan(self, scan_type, file_name, hash, rescan).await
    }

    async fn delete_scan(&self, hash: &str) -> Result<DeleteResult> {
        MobsfClient::delete_scan(self, hash).await
    }

    async fn download_pdf_report(&self, hash: &str, dest: &Path) -> Result<()> {
        MobsfClient::download_pdf_report(self, hash, dest).await
    }

    async fn fetch_json_report(&self, hash: &str) -> Result<String> {
        MobsfClient::fetch_json_report(self, hash).await
    }

    async fn write_json_report(&self, hash: &str, dest: &Path) -> Result<String> {
        MobsfClient::write_json_report(self, hash, dest).await
    }

    async fn view_source(
        &self,
        scan_type: &str,
        file_path: &str,
        hash: &str,
    ) -> Result<SourceViewResult> {
        MobsfClient::view_source(self, scan_type, file_path, hash).await
    }
}
