use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::BlobStoreError;
use crate::domain::{ImageFormat, StoragePath};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

#[tracing::instrument(skip(state))]
pub async fn result_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    // Result names are always a single flat segment; anything else is
    // treated as unknown rather than resolved against the filesystem.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return not_found(&filename);
    }

    let path = StoragePath::from_raw(filename.clone());
    match state.results.fetch(&path).await {
        Ok(bytes) => {
            let content_type = ImageFormat::from_filename(&filename)
                .map(|f| f.as_mime())
                .unwrap_or("application/octet-stream");
            ([(header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        Err(BlobStoreError::NotFound(_)) => not_found(&filename),
        Err(e) => {
            tracing::error!(error = %e, filename = %filename, "Failed to read result file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    ok: false,
                    error: format!("Failed to read result: {}", e),
                }),
            )
                .into_response()
        }
    }
}

fn not_found(filename: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            ok: false,
            error: format!("Result not found: {}", filename),
        }),
    )
        .into_response()
}
