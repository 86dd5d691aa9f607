//! Luma Dream Machine generations client.
//!
//! Bodies are opaque JSON in both directions: requests are forwarded as-is
//! and responses are handed back without interpretation.

use crate::config::LumaConfig;
use crate::services::metrics::record_upstream_call;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LumaError {
    /// Luma answered with a non-2xx status and a JSON error body.
    #[error("Luma API responded with {status}")]
    Upstream { status: StatusCode, body: Value },

    /// No usable response: connect/DNS/timeout, or a body that is not JSON.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct LumaClient {
    client: Client,
    config: LumaConfig,
}

impl LumaClient {
    pub fn new(config: LumaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// POST a generation request.
    pub async fn create_generation(&self, request: &Value) -> Result<Value, LumaError> {
        let builder = self
            .authorized(self.client.post(&self.config.api_url))
            .json(request);

        self.execute("create_generation", builder).await
    }

    /// GET a generation by id.
    pub async fn get_generation(&self, id: &str) -> Result<Value, LumaError> {
        let url = self.generation_url(id);
        let builder = self.authorized(self.client.get(&url));

        self.execute("get_generation", builder).await
    }

    fn generation_url(&self, id: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), id)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(ACCEPT, "application/json")
            .bearer_auth(self.config.api_key.expose_secret())
    }

    async fn execute(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> Result<Value, LumaError> {
        let started = Instant::now();

        let result = match builder.send().await {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(LumaError::Transport(e)),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(LumaError::Upstream { .. }) => "rejected",
            Err(LumaError::Transport(_)) => "transport",
        };
        record_upstream_call("luma", operation, outcome, started.elapsed());

        match &result {
            Ok(_) => tracing::debug!(operation, "Luma API call succeeded"),
            Err(LumaError::Upstream { status, .. }) => {
                tracing::warn!(operation, status = %status, "Luma API rejected request")
            }
            Err(LumaError::Transport(e)) => {
                tracing::error!(operation, error = %e, "Luma API call failed")
            }
        }

        result
    }

    async fn read_json(response: Response) -> Result<Value, LumaError> {
        let status = response.status();
        let body: Value = response.json().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(LumaError::Upstream { status, body })
        }
    }
}
