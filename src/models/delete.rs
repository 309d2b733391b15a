//! Delete-scan model and operation.

use serde::{Deserialize, Serialize};

use crate::client::{MobsfClient, DELETE_SCAN_API};
use crate::error::Result;

/// Result of deleting a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// The server's `deleted` field.
    #[serde(rename = "deleted")]
    pub deleted_hash: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HashForm<'a> {
    pub hash: &'a str,
}

impl MobsfClient {
    /// Delete a scan and its results from the server.
    ///
    /// # Errors
    ///
    /// `TransportError` when the request cannot complete, `InvalidResponse`
    /// for non-200 or undecodable answers.
    #[tracing::instrument(skip(self))]
    pub async fn delete_scan(&self, hash: &str) -> Result<DeleteResult> {
        let response = self
            .post_form(DELETE_SCAN_API, &HashForm { hash }, self.timeout())
            .await?;
        Self::decode_json(response, self.timeout()).await
    }
}
