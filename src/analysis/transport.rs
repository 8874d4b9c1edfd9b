//! Transport for vision model requests
//!
//! The remote analyzer only sees [`Transport`]; the HTTP implementation lives
//! here so tests can substitute scripted responses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::error;

use super::{AnalysisError, ChatCompletionRequest};

/// Raw status and body returned by the endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one chat completion request
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ChatCompletionRequest) -> Result<TransportResponse, AnalysisError>;
}

/// reqwest-backed transport for OpenAI-compatible endpoints
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ChatCompletionRequest) -> Result<TransportResponse, AnalysisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to {}: {}", self.endpoint, e);
                if e.is_timeout() {
                    AnalysisError::Transport("request timed out".to_string())
                } else {
                    AnalysisError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read response from {}: {}", self.endpoint, e);
            AnalysisError::Transport(format!("Failed to read response: {}", e))
        })?;

        Ok(TransportResponse { status, body })
    }
}
