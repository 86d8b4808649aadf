//! Mock summarization backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jot_inference::mock::MockSummaryBackend;
//!
//! let backend = MockSummaryBackend::new().with_fixed_response("Test summary");
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use jot_core::{Error, Language, Result, SummaryBackend};

/// A recorded summarization call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub title: String,
    pub content: String,
    pub language: Language,
}

#[derive(Debug, Clone)]
struct MockConfig {
    response: String,
    fail_with: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            response: "Mock summary".to_string(),
            fail_with: None,
        }
    }
}

/// Mock summarization backend recording every call.
#[derive(Clone)]
pub struct MockSummaryBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockSummaryBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the fixed response returned by every call.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).response = response.into();
        self
    }

    /// Make every call fail with an `Error::Inference`.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).fail_with = Some(message.into());
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of summarize calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

impl Default for MockSummaryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryBackend for MockSummaryBackend {
    async fn summarize(&self, title: &str, content: &str, language: Language) -> Result<String> {
        self.call_log.lock().unwrap().push(MockCall {
            title: title.to_string(),
            content: content.to_string(),
            language,
        });

        match &self.config.fail_with {
            Some(message) => Err(Error::Inference(message.clone())),
            None => Ok(self.config.response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
