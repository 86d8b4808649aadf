//! Gemini summarization backend.
//!
//! Calls the `generateContent` REST endpoint directly. The backend reports
//! failures as `Error::Inference`; it never fabricates a summary, so
//! callers can rely on an `Ok` result containing real model output.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use jot_core::{
    defaults::{GEMINI_BASE_URL, GEMINI_MODEL, SUMMARIZE_TIMEOUT_SECS},
    Error, Language, Result, SummaryBackend,
};

use crate::prompts::build_prompt;

/// Gemini backend configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for the Gemini API.
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// Base URL of the API (overridable for tests).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Build a configuration from environment variables.
    ///
    /// `GEMINI_API_KEY` is required; `GEMINI_MODEL` and `GEMINI_BASE_URL`
    /// fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Config("GEMINI_API_KEY is not set".to_string()))?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| GEMINI_MODEL.to_string());
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| GEMINI_BASE_URL.to_string());
        let timeout = std::env::var("SUMMARIZE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(SUMMARIZE_TIMEOUT_SECS));

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout,
        })
    }
}

/// Gemini summarization backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a backend from an explicit configuration.
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "gemini",
            model = %config.model,
            "Initializing Gemini backend"
        );

        Ok(Self { client, config })
    }

    /// Create a backend from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(GeminiConfig::from_env()?)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

/// The request payload for a summarization call.
fn build_payload(prompt: &str) -> Value {
    json!({
        "contents": [
            { "parts": [ { "text": prompt } ] }
        ],
        "generationConfig": {
            "temperature": 0.2,
            "topK": 40,
            "topP": 0.95,
            "maxOutputTokens": 1024,
        }
    })
}

/// Pull the generated text out of a `generateContent` response body.
fn extract_summary(body: &Value) -> Option<String> {
    let text = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?;
    Some(text.trim().to_string())
}

#[async_trait]
impl SummaryBackend for GeminiBackend {
    async fn summarize(&self, title: &str, content: &str, language: Language) -> Result<String> {
        let start = Instant::now();
        let prompt = build_prompt(title, content, language);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&build_payload(&prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                subsystem = "inference",
                component = "gemini",
                op = "summarize",
                status = status.as_u16(),
                "Gemini API error"
            );
            return Err(Error::Inference(format!(
                "Gemini API returned {}: {}",
                status, body
            )));
        }

        let body: Value = response.json().await?;
        let summary = extract_summary(&body).ok_or_else(|| {
            Error::Inference("Unexpected Gemini API response format".to_string())
        })?;

        debug!(
            subsystem = "inference",
            component = "gemini",
            op = "summarize",
            language = %language,
            duration_ms = start.elapsed().as_millis() as u64,
            "Summary generated"
        );
        Ok(summary)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
