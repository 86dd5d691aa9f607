//! Remote object store for uploaded images.
//!
//! The handler sees a single awaitable `upload` that resolves to the stored
//! object's descriptor or an error detail. `CloudinaryStore` is the
//! production backend; tests substitute their own `ObjectStore`.

use crate::config::CloudinaryConfig;
use crate::services::metrics::record_upstream_call;
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Instant;
use thiserror::Error;

/// Error type for object store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered but refused the upload (bad credentials, bad file).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected store response: {0}")]
    InvalidResponse(String),
}

/// What the caller told us about the uploaded file.
#[derive(Debug, Clone, Default)]
pub struct UploadMetadata {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// Descriptor of an object the store accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub secure_url: String,
    pub public_id: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write the whole buffer as one image object.
    async fn upload(
        &self,
        data: Bytes,
        metadata: &UploadMetadata,
    ) -> Result<StoredObject, StoreError>;
}

/// Cloudinary upload API client.
pub struct CloudinaryStore {
    client: Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct CloudinaryUpload {
    secure_url: String,
    public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorDetail,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorDetail {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Sign the upload parameters.
    ///
    /// Parameters are sorted by name, joined as `k=v` with `&`, the API
    /// secret is appended and the result hashed with SHA-256. Every form
    /// field except `file` and `api_key` must be passed here. The account's
    /// signature algorithm has to be set to SHA-256.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.config.api_secret.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    async fn upload(
        &self,
        data: Bytes,
        metadata: &UploadMetadata,
    ) -> Result<StoredObject, StoreError> {
        let started = Instant::now();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.sign(&[("timestamp", timestamp.as_str())]);
        let size = data.len();

        let file_name = metadata
            .file_name
            .clone()
            .unwrap_or_else(|| "upload".to_string());
        let file = Part::stream_with_length(data, size as u64).file_name(file_name);

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        tracing::debug!(
            cloud_name = %self.config.cloud_name,
            size,
            content_type = ?metadata.content_type,
            "Uploading image to Cloudinary"
        );

        let response = match self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                record_upstream_call("cloudinary", "upload", "transport", started.elapsed());
                return Err(StoreError::Transport(e));
            }
        };

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            record_upstream_call("cloudinary", "upload", "rejected", started.elapsed());
            let message = serde_json::from_str::<CloudinaryErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("Cloudinary responded with {}: {}", status, body));
            return Err(StoreError::Rejected { status, message });
        }

        record_upstream_call("cloudinary", "upload", "success", started.elapsed());

        let upload: CloudinaryUpload = serde_json::from_str(&body)
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            public_id = ?upload.public_id,
            size,
            "Image stored in Cloudinary"
        );

        Ok(StoredObject {
            secure_url: upload.secure_url,
            public_id: upload.public_id,
        })
    }
}
