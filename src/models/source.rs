//! Source view model and operation.

use serde::{Deserialize, Serialize};

use crate::client::{MobsfClient, VIEW_SOURCE_API};
use crate::error::Result;

/// A decompiled source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceViewResult {
    pub title: String,
    /// Path of the file inside the decompiled app.
    #[serde(rename = "file")]
    pub file_path: String,
    /// Language/format of the file; some server versions call it `file_type`.
    #[serde(rename = "type", alias = "file_type", default)]
    pub file_type: String,
    /// The file's contents.
    #[serde(rename = "data")]
    pub source_text: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
struct ViewSourceForm<'a> {
    hash: &'a str,
    file: &'a str,
    #[serde(rename = "type")]
    scan_type: &'a str,
}

impl MobsfClient {
    /// Fetch one decompiled source file of a scanned app.
    ///
    /// # Errors
    ///
    /// `TransportError` when the request cannot complete, `InvalidResponse`
    /// for non-200 or undecodable answers.
    #[tracing::instrument(skip(self))]
    pub async fn view_source(
        &self,
        scan_type: &str,
        file_path: &str,
        hash: &str,
    ) -> Result<SourceViewResult> {
        let form = ViewSourceForm {
            hash,
            file: file_path,
            scan_type,
        };

        let response = self
            .post_form(VIEW_SOURCE_API, &form, self.timeout())
            .await?;
        Self::decode_json(response, self.timeout()).await
    }
}
