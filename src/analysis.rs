use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{Result, StudyError};
use crate::models::{Content, GenerateRequest, GenerationConfig, Part, StudyRecord};
use crate::prompt::{PROMPT_VERSION, SYSTEM_INSTRUCTION, build_prompt};
use crate::schema;
use crate::transport::Transport;

#[cfg(test)]
use mockall::automock;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Produces a complete study for `passage`. The caller rejects blank input.
    async fn analyze(&self, passage: &str) -> Result<StudyRecord>;
}

/// Request client for the hosted Gemini model.
///
/// Holds the credential it was constructed with; a missing credential fails
/// every call with [`StudyError::Configuration`] before the transport is touched.
pub struct GeminiAnalyzer {
    tx: Arc<dyn Transport>,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
    temperature: Option<f32>,
    schema: Value,
}

impl GeminiAnalyzer {
    pub fn new(tx: Arc<dyn Transport>, api_key: Option<String>, model: String) -> Self {
        Self {
            tx,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
            schema: schema::study_schema(),
        }
    }

    pub fn from_config(tx: Arc<dyn Transport>, cfg: &GeminiConfig) -> Self {
        Self::new(tx, cfg.api_key.clone(), cfg.model.clone())
            .with_timeout(cfg.timeout())
            .with_temperature(cfg.temperature)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request(&self, passage: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(SYSTEM_INSTRUCTION)],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(build_prompt(passage))],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: self.schema.clone(),
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, passage: &str) -> Result<StudyRecord> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StudyError::Configuration("API key is not configured".to_string()))?;

        tracing::info!(
            model = %self.model,
            prompt_version = PROMPT_VERSION,
            "Requesting study analysis for: {}",
            passage
        );
        let request = self.build_request(passage);

        let response = tokio::time::timeout(self.timeout, self.tx.generate(api_key, &request))
            .await
            .map_err(|_| {
                StudyError::Transport(format!(
                    "Gemini API request timed out after {} seconds",
                    self.timeout.as_secs_f64()
                ))
            })??;

        let Some(text) = response.text() else {
            if let Some(reason) = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                tracing::warn!(block_reason = reason, "Gemini API blocked the prompt");
            }
            return Err(StudyError::EmptyResponse);
        };
        tracing::debug!(bytes = text.len(), "Received study payload");

        parse_reply(&text, &self.schema)
    }
}

/// Parses and checks a raw model reply. All or nothing: any defect rejects the whole record.
pub fn parse_reply(text: &str, schema: &Value) -> Result<StudyRecord> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        tracing::error!(raw = %text, "Failed to parse JSON response: {e}");
        StudyError::MalformedResponse(e.to_string())
    })?;

    schema::check(&value, schema)?;

    let record: StudyRecord = serde_json::from_value(value)
        .map_err(|e| StudyError::schema_violation("$", e.to_string()))?;
    record.ensure_complete()?;
    Ok(record)
}
