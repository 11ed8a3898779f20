use std::io;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::StylizeMessage;
use crate::domain::{ImageFormat, Job, JobStatus, Preset, StoragePath};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ImpressionResponse {
    pub ok: bool,
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub status: String,
    pub preset: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<&'static str>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            allowed: None,
        }
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn impression_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut staged: Option<(StoragePath, ImageFormat)> = None;
    let mut preset_name: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                discard_staged(&state, &staged).await;
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(format!("Failed to read multipart: {}", e))),
                )
                    .into_response();
            }
        };

        match field.name() {
            Some("image") => {
                let format = field
                    .content_type()
                    .and_then(ImageFormat::from_mime)
                    .or_else(|| field.file_name().and_then(ImageFormat::from_filename))
                    .unwrap_or(ImageFormat::Jpeg);

                let path =
                    StoragePath::from_raw(format!("{}.{}", Uuid::new_v4(), format.extension()));
                let stream = field.map_err(io::Error::other).boxed();

                match state.uploads.store(&path, stream).await {
                    Ok(size) => {
                        tracing::debug!(bytes = size, path = %path, "Upload staged");
                        staged = Some((path, format));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to stage upload");
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorResponse::new(format!("Failed to read image: {}", e))),
                        )
                            .into_response();
                    }
                }
            }
            Some("preset") => match field.text().await {
                Ok(text) => preset_name = Some(text),
                Err(e) => {
                    discard_staged(&state, &staged).await;
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(ErrorResponse::new(format!("Failed to read preset: {}", e))),
                    )
                        .into_response();
                }
            },
            _ => {}
        }
    }

    let Some((upload_path, format)) = staged else {
        tracing::warn!("Impression request with no image field");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing image field")),
        )
            .into_response();
    };

    let resolved = preset_name.as_deref().and_then(Preset::resolve);
    let preset = match resolved {
        Some(p) => p,
        None => {
            discard_staged(&state, &Some((upload_path, format))).await;
            let supplied = preset_name.unwrap_or_default();
            tracing::warn!(preset = %supplied, "Unrecognized preset");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    ok: false,
                    error: format!("Unknown preset: {}", supplied),
                    allowed: Some(Preset::allowed_names()),
                }),
            )
                .into_response();
        }
    };

    if !preset.is_pass_through() && !state.settings.replicate.is_configured() {
        discard_staged(&state, &Some((upload_path, format))).await;
        tracing::error!("Replicate token not configured for stylization request");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(
                "Replicate API token is not configured (set APP_REPLICATE__TOKEN)",
            )),
        )
            .into_response();
    }

    let job = Job::new(preset.name().to_string());
    let job_id = job.id;

    if let Err(e) = state.job_repository.create(&job).await {
        tracing::error!(error = %e, "Failed to create job record");
        discard_staged(&state, &Some((upload_path, format))).await;
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Failed to create job: {}", e))),
        )
            .into_response();
    }

    let msg = StylizeMessage {
        job_id,
        preset,
        upload_path,
        format,
    };

    if let Err(send_err) = state.stylize_sender.send(msg).await {
        tracing::error!(job_id = %job_id, "Failed to enqueue stylize job");
        // The record must not sit in `queued` forever, and the staged
        // upload has no worker left to clean it up.
        let msg = send_err.0;
        discard_staged(&state, &Some((msg.upload_path, msg.format))).await;
        if let Err(e) = state
            .job_repository
            .update_status(
                job_id,
                JobStatus::Error,
                None,
                Some("stylize worker unavailable"),
            )
            .await
        {
            tracing::error!(error = %e, "Failed to record enqueue failure");
        }
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Stylize queue full or worker unavailable")),
        )
            .into_response();
    }

    tracing::info!(
        job_id = %job_id,
        preset = preset.name(),
        "Impression job enqueued"
    );

    (
        StatusCode::ACCEPTED,
        Json(ImpressionResponse {
            ok: true,
            job_id: job_id.to_string(),
            status: job.status.as_str().to_string(),
            preset: preset.name().to_string(),
        }),
    )
        .into_response()
}

/// Removes a staged upload after a rejected request, best-effort.
async fn discard_staged(state: &AppState, staged: &Option<(StoragePath, ImageFormat)>) {
    if let Some((path, _)) = staged {
        if let Err(e) = state.uploads.delete(path).await {
            tracing::warn!(error = %e, path = %path, "Failed to discard staged upload");
        }
    }
}
