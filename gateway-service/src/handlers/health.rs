use crate::dtos::MessageResponse;
use axum::Json;

pub const HEALTH_MESSAGE: &str = "Luma AI Proxy is running";

pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse::new(HEALTH_MESSAGE))
}
