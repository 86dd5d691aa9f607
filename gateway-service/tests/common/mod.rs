#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Bytes;
use gateway_service::config::{CloudinaryConfig, GatewayConfig, LumaConfig, UploadConfig};
use gateway_service::services::{ObjectStore, StoreError, StoredObject, UploadMetadata};
use gateway_service::startup::Application;
use reqwest::StatusCode;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::{Arc, Mutex};

pub const TEST_LUMA_KEY: &str = "luma-test-key";

/// Object store double: answers every upload with a fixed outcome and keeps
/// the last upload it received.
pub struct MockStore {
    outcome: Result<String, String>,
    pub received: Mutex<Option<(UploadMetadata, Bytes)>>,
}

impl MockStore {
    pub fn succeeding(secure_url: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(secure_url.to_string()),
            received: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            received: Mutex::new(None),
        })
    }

    pub fn last_upload(&self) -> Option<(UploadMetadata, Bytes)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn upload(
        &self,
        data: Bytes,
        metadata: &UploadMetadata,
    ) -> Result<StoredObject, StoreError> {
        *self.received.lock().unwrap() = Some((metadata.clone(), data));

        match &self.outcome {
            Ok(url) => Ok(StoredObject {
                secure_url: url.clone(),
                public_id: None,
            }),
            Err(message) => Err(StoreError::Rejected {
                status: StatusCode::UNAUTHORIZED,
                message: message.clone(),
            }),
        }
    }
}

pub fn test_config(luma_api_url: &str) -> GatewayConfig {
    GatewayConfig {
        common: CoreConfig { port: 0 },
        cloudinary: CloudinaryConfig {
            cloud_name: "test-cloud".to_string(),
            api_key: "test-key".to_string(),
            api_secret: Secret::new("test-secret".to_string()),
            api_base_url: "http://127.0.0.1:1".to_string(),
        },
        luma: LumaConfig {
            api_key: Secret::new(TEST_LUMA_KEY.to_string()),
            api_url: luma_api_url.to_string(),
        },
        upload: UploadConfig {
            max_upload_bytes: 1024 * 1024,
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(config: GatewayConfig, store: Arc<dyn ObjectStore>) -> Self {
        let app = Application::build_with_store(config, store)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            let _ = app.run_until_stopped().await;
        });

        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp { address, client }
    }

    /// Gateway with a store that always succeeds, talking to `luma_api_url`.
    pub async fn with_luma(luma_api_url: &str) -> Self {
        Self::spawn(
            test_config(luma_api_url),
            MockStore::succeeding("https://example.com/unused.png"),
        )
        .await
    }
}
