use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{Result, StudyError};
use crate::models::{GenerateRequest, GenerateResponse};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// One round trip to the hosted generative model. Implementations make
/// exactly one request per call and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate(&self, api_key: &str, req: &GenerateRequest) -> Result<GenerateResponse>;
}

pub struct GeminiTransport {
    client: Client,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StudyError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate(&self, api_key: &str, req: &GenerateRequest) -> Result<GenerateResponse> {
        let url = self.endpoint(&req.model);
        tracing::debug!(%url, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await
            .map_err(|e| {
                StudyError::Transport(format!("Failed to send request to Gemini API: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(%status, %body, "Gemini API returned an error status");
            return Err(StudyError::Transport(format!(
                "Gemini API error: HTTP {status}"
            )));
        }

        response.json().await.map_err(|e| {
            StudyError::Transport(format!("Failed to decode Gemini API response envelope: {e}"))
        })
    }
}
