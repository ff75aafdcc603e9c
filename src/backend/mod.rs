use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::backend::model::{GenerateBody, GenerateResp};
use crate::config::Config;
use crate::model::GenerationRequest;

pub mod model;

/// Any failure talking to the backend. Every variant is retryable.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend error {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed backend response: {0}")]
    Envelope(String),
    #[error("backend returned an empty response")]
    EmptyResponse,
}

/// Prompt in, text out.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;
}

/// Client for an Ollama-style `/api/generate` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    url: Url,
    model: String,
}

impl fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaClient")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OllamaClient {
    pub fn new(url: Url, model: String, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder()
            .user_agent(concat!("mailgen/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { http, url, model })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let url = Url::parse(&cfg.backend.url)
            .map_err(|e| anyhow::anyhow!("invalid backend.url {:?}: {}", cfg.backend.url, e))?;
        Ok(Self::new(url, cfg.backend.model.clone(), cfg.timeout())?)
    }

    pub fn build_request(&self, request: &GenerationRequest) -> Result<reqwest::Request, BackendError> {
        let body = GenerateBody {
            model: &self.model,
            system: &request.system,
            prompt: &request.prompt,
            stream: false,
            options: request.sampling,
        };
        Ok(self.http.post(self.url.clone()).json(&body).build()?)
    }
}

#[async_trait]
impl Backend for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let req = self.build_request(request)?;
        debug!(url = %req.url(), model = %self.model, role = %request.role, "backend request");

        let res = self.http.execute(req).await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let text = res.text().await?;
        let payload: GenerateResp =
            serde_json::from_str(&text).map_err(|e| BackendError::Envelope(e.to_string()))?;
        if payload.response.trim().is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        debug!(chars = payload.response.len(), "backend response");
        Ok(payload.response)
    }
}
