//! Upload model and operation.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::{MobsfClient, UPLOAD_API};
use crate::error::{MobsfError, Result};

/// Result of uploading an app binary.
///
/// `hash` identifies the artifact in every later call (scan, report,
/// delete, source).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Analyzer that will process the file (e.g. "static_analyzer").
    pub analyzer: String,
    /// Upload status reported by the server.
    pub status: String,
    /// Content hash of the uploaded file.
    pub hash: String,
    /// Detected scan type ("apk", "ipa", ...).
    pub scan_type: String,
    /// File name as stored by the server.
    pub file_name: String,
}

impl MobsfClient {
    /// Upload an application binary.
    ///
    /// The path is checked and read before any request is made, so a missing
    /// or unreadable file fails with `IoError` without touching the network.
    ///
    /// # Errors
    ///
    /// `IoError` for local file problems, `TransportError` when the request
    /// cannot complete, `InvalidResponse` for non-200 or undecodable answers.
    #[tracing::instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn upload(&self, path: impl AsRef<Path>) -> Result<UploadResult> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| metadata_error(path, &e))?;
        if !metadata.is_file() {
            return Err(MobsfError::io(format!("Not a file: {}", path.display())));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| MobsfError::io(format!("Not a file: {}", path.display())))?;

        let contents = tokio::fs::read(path).await.map_err(|e| {
            MobsfError::io(format!("Failed to read {}: {e}", path.display()))
        })?;

        tracing::debug!(%file_name, bytes = contents.len(), "uploading");
        let response = self
            .post_file(UPLOAD_API, "file", &file_name, &contents, self.timeout())
            .await?;
        Self::decode_json(response, self.timeout()).await
    }
}

fn metadata_error(path: &Path, err: &std::io::Error) -> MobsfError {
    match err.kind() {
        ErrorKind::NotFound => MobsfError::io(format!("File not found: {}", path.display())),
        _ => MobsfError::io(format!("Cannot access {}: {err}", path.display())),
    }
}
