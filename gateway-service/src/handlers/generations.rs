//! Generation job relay.
//!
//! Success bodies are relayed verbatim with 200; upstream rejections keep
//! their status and body (see `GatewayError::Upstream`).

use crate::error::GatewayError;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

pub async fn submit_generation(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected generation request body");
        GatewayError::BadRequest(rejection.body_text())
    })?;

    let generation = state
        .luma
        .create_generation(&request)
        .await
        .map_err(GatewayError::from_submit)?;

    let generation_id = generation
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("-");
    tracing::info!(generation_id, "Generation submitted");

    Ok(Json(generation))
}

pub async fn check_generation_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let generation = state
        .luma
        .get_generation(&id)
        .await
        .map_err(GatewayError::from_status_check)?;

    Ok(Json(generation))
}
