//! Mock provider implementation for testing.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// What every call to the mock resolves to.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Text(String),
    Error(ProviderError),
}

/// A prompt and parameter set the mock was called with.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub params: GenerationParams,
}

/// Scripted text provider that records its calls.
pub struct MockTextProvider {
    outcome: MockOutcome,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTextProvider {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(text: impl Into<String>) -> Self {
        Self::new(MockOutcome::Text(text.into()))
    }

    /// Fails every call with an upstream error whose message is `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockOutcome::Error(ProviderError::ApiError(message.into())))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                params: params.clone(),
            });
        }

        // Yield once so callers exercise a real suspension point.
        tokio::task::yield_now().await;

        match &self.outcome {
            MockOutcome::Text(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: prompt.len() as i32 / 4,
                output_tokens: text.len() as i32 / 4,
                finish_reason: FinishReason::Complete,
            }),
            MockOutcome::Error(error) => Err(error.clone()),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.outcome {
            MockOutcome::Text(_) => Ok(()),
            MockOutcome::Error(error) => Err(error.clone()),
        }
    }
}
