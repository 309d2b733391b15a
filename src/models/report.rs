//! Report download operations.
//!
//! PDF reports are streamed to disk; JSON reports are small enough to be
//! returned as text.

use std::path::Path;

use reqwest::Response;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::client::{MobsfClient, REPORT_JSON_API, REPORT_PDF_API};
use crate::error::{MobsfError, Result};
use crate::models::delete::HashForm;

/// Size of the write buffer used while streaming a PDF to disk.
pub const REPORT_CHUNK_SIZE: usize = 8192;

impl MobsfClient {
    /// Download the PDF report for `hash` into `dest`.
    ///
    /// The destination is only created once the server has answered 200, so
    /// a rejected request leaves no empty file behind. The body is written
    /// in [`REPORT_CHUNK_SIZE`] pieces as it arrives. The report timeout
    /// limits the wait for each piece, not the whole transfer; if the
    /// transfer breaks off, the partial file is removed.
    ///
    /// # Errors
    ///
    /// `IoError` if the file cannot be created or written, `TransportError`
    /// if the request or the body transfer fails, `InvalidResponse` for
    /// non-200 answers.
    #[tracing::instrument(skip(self, dest), fields(dest = %dest.as_ref().display()))]
    pub async fn download_pdf_report(&self, hash: &str, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        let response = self
            .post_form(REPORT_PDF_API, &HashForm { hash }, self.report_timeout())
            .await?;

        let file = File::create(dest).await.map_err(|e| write_error(dest, e))?;
        match self.stream_to_file(response, file, dest).await {
            Ok(written) => {
                tracing::debug!(bytes = written, "pdf report saved");
                Ok(())
            }
            Err(err) => {
                if let Err(remove) = tokio::fs::remove_file(dest).await {
                    tracing::warn!(error = %remove, "could not remove partial report");
                }
                Err(err)
            }
        }
    }

    async fn stream_to_file(&self, mut response: Response, file: File, dest: &Path) -> Result<usize> {
        let mut writer = BufWriter::with_capacity(REPORT_CHUNK_SIZE, file);
        let mut written = 0usize;

        while let Some(chunk) = Self::next_chunk(&mut response, self.report_timeout()).await? {
            let chunk = chunk.as_ref();
            writer.write_all(chunk).await.map_err(|e| write_error(dest, e))?;
            written += chunk.len();
        }

        writer.flush().await.map_err(|e| write_error(dest, e))?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|e| write_error(dest, e))?;
        Ok(written)
    }

    /// Fetch the JSON report for `hash` as raw text.
    ///
    /// # Errors
    ///
    /// `TransportError` when the request cannot complete, `InvalidResponse`
    /// for non-200 answers.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_json_report(&self, hash: &str) -> Result<String> {
        let response = self
            .post_form(REPORT_JSON_API, &HashForm { hash }, self.report_timeout())
            .await?;
        let body = Self::read_body(response, self.report_timeout()).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Fetch the JSON report and also write it to `dest`.
    ///
    /// # Errors
    ///
    /// As [`fetch_json_report`](Self::fetch_json_report), plus `IoError` if
    /// the file cannot be written.
    #[tracing::instrument(skip(self, dest), fields(dest = %dest.as_ref().display()))]
    pub async fn write_json_report(&self, hash: &str, dest: impl AsRef<Path>) -> Result<String> {
        let dest = dest.as_ref();
        let text = self.fetch_json_report(hash).await?;

        let mut file = File::create(dest).await.map_err(|e| write_error(dest, e))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| write_error(dest, e))?;
        file.flush().await.map_err(|e| write_error(dest, e))?;

        Ok(text)
    }
}

fn write_error(dest: &Path, err: std::io::Error) -> MobsfError {
    MobsfError::io(format!("Failed to write {}: {err}", dest.display()))
}
