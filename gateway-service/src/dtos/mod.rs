use serde::{Deserialize, Serialize};

/// Body of a successful `/upload`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// `{ "message": ... }` envelope used for the health check and for every
/// error the gateway produces itself.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
