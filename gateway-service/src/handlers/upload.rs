use crate::dtos::UploadResponse;
use crate::error::GatewayError;
use crate::services::UploadMetadata;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Accept one image file and store it remotely, answering with its public URL.
///
/// Non-file fields are ignored. A body that is not multipart at all counts as
/// a missing file.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, GatewayError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Upload request is not a multipart form");
        GatewayError::MissingFile
    })?;

    let mut image: Option<(UploadMetadata, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart field", e))?
    {
        // A file input left empty still sends a part, with `filename=""`.
        let has_file = field.file_name().is_some_and(|name| !name.is_empty());
        if field.name() != Some(IMAGE_FIELD) || !has_file {
            continue;
        }

        if image.is_some() {
            tracing::warn!("Upload request carried more than one image file");
            return Err(GatewayError::BadRequest("Unexpected field".to_string()));
        }

        let metadata = UploadMetadata {
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file bytes", e))?;

        image = Some((metadata, data));
    }

    let (metadata, data) = image.ok_or_else(|| {
        tracing::warn!("Upload request without an image file");
        GatewayError::MissingFile
    })?;

    tracing::info!(
        file_name = ?metadata.file_name,
        content_type = ?metadata.content_type,
        size = data.len(),
        "Image upload started"
    );

    let stored = state.store.upload(data, &metadata).await.map_err(|e| {
        tracing::error!(error = %e, "Image upload failed");
        GatewayError::UploadFailed(e.to_string())
    })?;

    tracing::info!(url = %stored.secure_url, "Image upload completed");

    Ok(Json(UploadResponse {
        image_url: stored.secure_url,
    }))
}

/// Bodies over the configured upload limit keep their 413; any other
/// malformed multipart input is a 400.
fn multipart_error(context: &str, err: MultipartError) -> GatewayError {
    tracing::warn!(error = %err, "{}", context);
    let message = format!("{}: {}", context, err);
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge(message)
    } else {
        GatewayError::BadRequest(message)
    }
}
