//! Upload, scan, history and delete endpoint handlers.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{admit, error_response, SharedState};
use crate::ScanListEntry;

/// Form for the scan endpoint.
#[derive(Debug, Deserialize)]
pub struct ScanParams {
    pub scan_type: String,
    pub file_name: String,
    pub hash: String,
    pub re_scan: Option<String>,
}

/// Form carrying only a hash.
#[derive(Debug, Deserialize)]
pub struct HashParams {
    pub hash: String,
}

/// POST /api/v1/upload
pub async fn upload(
    State(state): State<SharedState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = admit(&mut state, &headers) {
        return rejection;
    }

    let mut file = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => file = Some((file_name, bytes)),
            Err(_) => return error_response(StatusCode::BAD_REQUEST, "Upload failed"),
        }
        break;
    }

    let Some((file_name, bytes)) = file else {
        return error_response(StatusCode::BAD_REQUEST, "file is required");
    };

    match state.record_upload(&file_name, &bytes) {
        Ok(upload) => Json(json!({
            "analyzer": "static_analyzer",
            "status": "success",
            "hash": upload.hash,
            "scan_type": upload.scan_type,
            "file_name": upload.file_name,
        }))
        .into_response(),
        Err(message) => error_response(StatusCode::BAD_REQUEST, &message),
    }
}

/// GET /api/v1/scans
pub async fn list_scans(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = admit(&mut state, &headers) {
        return rejection;
    }

    let content: Vec<Value> = state.recent_scans().into_iter().map(history_json).collect();
    let count = content.len();

    Json(json!({
        "content": content,
        "count": count,
        "num_pages": 1,
    }))
    .into_response()
}

/// POST /api/v1/scan
pub async fn scan(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(params): Form<ScanParams>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = admit(&mut state, &headers) {
        return rejection;
    }

    tracing::debug!(
        scan_type = %params.scan_type,
        file_name = %params.file_name,
        "mock scan"
    );
    let rescan = params.re_scan.as_deref() == Some("1");

    match state.run_scan(&params.hash, rescan) {
        Some(scan) => Json(scan).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Invalid hash"),
    }
}

/// POST /api/v1/delete_scan
pub async fn delete_scan(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(params): Form<HashParams>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = admit(&mut state, &headers) {
        return rejection;
    }

    if state.delete(&params.hash) {
        Json(json!({ "deleted": "yes" })).into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "Invalid hash")
    }
}

/// History row with the upper-case keys the scans endpoint uses.
fn history_json(entry: &ScanListEntry) -> Value {
    json!({
        "SCAN_TYPE": entry.scan_type,
        "ANALYZER": entry.analyzer,
        "TIMESTAMP": entry
            .timestamp
            .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        "MD5": entry.md5,
        "VERSION_NAME": entry.version_name,
        "APP_NAME": entry.app_name,
        "PACKAGE_NAME": entry.package_name,
        "FILE_NAME": entry.file_name,
    })
}
