//! Report and source endpoint handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{admit, error_response, HashParams, SharedState};
use crate::mock_server::fixtures::Fixtures;

/// Form for the view-source endpoint.
#[derive(Debug, Deserialize)]
pub struct SourceParams {
    pub hash: String,
    pub file: String,
    #[serde(rename = "type")]
    pub source_type: String,
}

/// POST /api/v1/download_pdf
pub async fn download_pdf(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(params): Form<HashParams>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = admit(&mut state, &headers) {
        return rejection;
    }

    if state.get_scan(&params.hash).is_none() {
        return error_response(StatusCode::NOT_FOUND, "Invalid scan hash");
    }

    (
        [(header::CONTENT_TYPE, "application/pdf")],
        Fixtures::pdf_report(&params.hash),
    )
        .into_response()
}

/// POST /api/v1/report_json
pub async fn report_json(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(params): Form<HashParams>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = admit(&mut state, &headers) {
        return rejection;
    }

    match state.get_scan(&params.hash) {
        Some(scan) => Json(Fixtures::json_report(scan)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Invalid scan hash"),
    }
}

/// POST /api/v1/view_source
pub async fn view_source(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(params): Form<SourceParams>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = admit(&mut state, &headers) {
        return rejection;
    }

    let Some(data) = state.source(&params.hash, &params.file) else {
        return error_response(StatusCode::NOT_FOUND, "Invalid hash");
    };

    let title = params
        .file
        .rsplit('/')
        .next()
        .unwrap_or(params.file.as_str())
        .to_string();
    let file_type = match params.source_type.as_str() {
        "ipa" | "ios" => "objc",
        _ => "java",
    };

    Json(json!({
        "title": title,
        "file": params.file,
        "type": file_type,
        "data": data,
        "version": "v4.0.0",
    }))
    .into_response()
}
