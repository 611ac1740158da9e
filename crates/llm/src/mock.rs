//! Mock LLM Service Implementation
//!
//! Minimal mock used by `LlmServiceFactory` when provider is `"mock"`.
//! Echoes the last user message by default; tests can script a queue of
//! responses to exercise the tool-calling two-pass flow.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService, MessageContent};

/// Mock LLM service for testing
#[derive(Debug, Default)]
pub struct MockLlmService {
    scripted: Mutex<VecDeque<CompletionResponse>>,
}

impl MockLlmService {
    /// Create a new mock LLM service
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that plays back the given responses in order, then
    /// falls back to echoing.
    pub fn with_responses(responses: Vec<CompletionResponse>) -> Self {
        Self {
            scripted: Mutex::new(responses.into()),
        }
    }

    /// Build a plain-text scripted response
    pub fn text_response(text: impl Into<String>) -> CompletionResponse {
        CompletionResponse {
            text: text.into(),
            tool_uses: Vec::new(),
            model: "mock-model".to_string(),
            input_tokens: 1,
            output_tokens: 1,
            stop_reason: "end_turn".to_string(),
        }
    }

    /// Build a tool-use scripted response
    pub fn tool_response(tool_uses: Vec<crate::ToolUse>) -> CompletionResponse {
        CompletionResponse {
            text: String::new(),
            tool_uses,
            model: "mock-model".to_string(),
            input_tokens: 1,
            output_tokens: 1,
            stop_reason: "tool_use".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if let Some(scripted) = self.scripted.lock().expect("mock lock").pop_front() {
            return Ok(scripted);
        }

        tracing::info!("Mock LLM service processing completion request");

        let model = if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model
        };

        // Generate a simple response based on the last textual message
        let last_message = request
            .messages
            .iter()
            .rev()
            .find_map(|m| match &m.content {
                MessageContent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or("empty");

        let content = format!("Mock response to: {}", last_message);
        let input_tokens = request
            .messages
            .iter()
            .map(|m| match &m.content {
                MessageContent::Text(text) => text.len() as i32 / 4,
                _ => 1,
            })
            .sum::<i32>();
        let output_tokens = content.len() as i32 / 4;

        Ok(CompletionResponse {
            text: content,
            tool_uses: Vec::new(),
            model,
            input_tokens,
            output_tokens,
            stop_reason: "end_turn".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
