//! Client-facing error envelope.
//!
//! Upstream rejections are relayed with their own status and JSON body.
//! Everything else becomes `{ "message": ... }` with a 4xx/5xx status chosen
//! here.

use crate::dtos::MessageResponse;
use crate::services::luma::LumaError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No image file provided")]
    MissingFile,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Image upload failed: {0}")]
    UploadFailed(String),

    #[error("Upstream responded with {status}")]
    Upstream { status: StatusCode, body: Value },

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Status check failed: {0}")]
    StatusCheckFailed(String),
}

impl GatewayError {
    /// Map a failed generation submit. Transport failures lose the upstream
    /// status since no response was received.
    pub fn from_submit(err: LumaError) -> Self {
        match err {
            LumaError::Upstream { status, body } => GatewayError::Upstream { status, body },
            LumaError::Transport(e) => GatewayError::RequestFailed(e.to_string()),
        }
    }

    /// Map a failed job status lookup.
    pub fn from_status_check(err: LumaError) -> Self {
        match err {
            LumaError::Upstream { status, body } => GatewayError::Upstream { status, body },
            LumaError::Transport(e) => GatewayError::StatusCheckFailed(e.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingFile | GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Upstream { status, .. } => *status,
            GatewayError::UploadFailed(_)
            | GatewayError::RequestFailed(_)
            | GatewayError::StatusCheckFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            GatewayError::Upstream { body, .. } => (status, Json(body)).into_response(),
            other => (status, Json(MessageResponse::new(other.to_string()))).into_response(),
        }
    }
}
