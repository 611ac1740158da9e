//! LLM service abstraction for Retiro
//!
//! Provides chat completion with tool use ("function calling") over the
//! Anthropic Messages API, plus a deterministic mock for tests:
//! - `LlmService` trait consumed by the dialogue orchestrator
//! - `AnthropicService` production implementation
//! - `MockLlmService` scriptable mock
//!
//! A completion request carries a system prompt, role-tagged message history
//! (whose content is text, tool-use, or tool-result blocks) and a tool
//! catalog; the response is either assistant text or a list of requested tool
//! invocations.

pub mod anthropic;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request error: {0}")]
    Request(String),

    #[error("LLM response error: {0}")]
    Response(String),

    #[error("LLM rate limit exceeded")]
    RateLimit,

    #[error("LLM request timed out")]
    Timeout,
}

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    User,
    Assistant,
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// The outcome of a tool invocation, fed back on the follow-up pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub tool_use_id: String,
    pub content: String,
    pub is_error: bool,
}

/// One schema-described tool the model may invoke
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Content of a chat message: plain text, the model's tool requests, or the
/// results the server produced for them.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    ToolUses(Vec<ToolUse>),
    ToolOutcomes(Vec<ToolOutcome>),
}

/// A single role-tagged message in a completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: LlmRole,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: LlmRole::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn tool_uses(uses: Vec<ToolUse>) -> Self {
        Self {
            role: LlmRole::Assistant,
            content: MessageContent::ToolUses(uses),
        }
    }

    pub fn tool_outcomes(outcomes: Vec<ToolOutcome>) -> Self {
        Self {
            role: LlmRole::User,
            content: MessageContent::ToolOutcomes(outcomes),
        }
    }
}

/// Chat completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model override; empty string selects the configured default
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Chat completion response
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Concatenated text blocks; may be empty when the model only requested tools
    pub text: String,
    /// Tool invocations requested by the model, in model order
    pub tool_uses: Vec<ToolUse>,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

impl CompletionResponse {
    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses.is_empty()
    }
}

/// LLM service trait for different providers
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    fn default_model(&self) -> &str;
}

/// LLM service configuration
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Factory for creating LlmService implementations
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    pub fn create(provider: &str, config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match provider {
            "anthropic" => {
                tracing::info!(model = %config.default_model, "Creating Anthropic LLM service");
                Ok(Box::new(anthropic::AnthropicService::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock LLM service");
                Ok(Box::new(mock::MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: anthropic, mock",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let m = ChatMessage::user("hola");
        assert_eq!(m.role, LlmRole::User);
        assert_eq!(m.content, MessageContent::Text("hola".to_string()));

        let m = ChatMessage::assistant("claro");
        assert_eq!(m.role, LlmRole::Assistant);

        let uses = vec![ToolUse {
            id: "tu_1".to_string(),
            name: "createBooking".to_string(),
            arguments: serde_json::json!({}),
        }];
        let m = ChatMessage::tool_uses(uses.clone());
        assert_eq!(m.role, LlmRole::Assistant);
        assert_eq!(m.content, MessageContent::ToolUses(uses));

        let outcomes = vec![ToolOutcome {
            tool_use_id: "tu_1".to_string(),
            content: "{}".to_string(),
            is_error: false,
        }];
        let m = ChatMessage::tool_outcomes(outcomes.clone());
        assert_eq!(m.role, LlmRole::User);
        assert_eq!(m.content, MessageContent::ToolOutcomes(outcomes));
    }

    #[test]
    fn test_response_tool_use_detection() {
        let response = CompletionResponse {
            text: String::new(),
            tool_uses: vec![ToolUse {
                id: "tu_1".to_string(),
                name: "addContactNotes".to_string(),
                arguments: serde_json::json!({"notes": "vip"}),
            }],
            model: "m".to_string(),
            input_tokens: 1,
            output_tokens: 1,
            stop_reason: "tool_use".to_string(),
        };
        assert!(response.has_tool_uses());

        let response = CompletionResponse {
            text: "hola".to_string(),
            tool_uses: Vec::new(),
            model: "m".to_string(),
            input_tokens: 1,
            output_tokens: 1,
            stop_reason: "end_turn".to_string(),
        };
        assert!(!response.has_tool_uses());
    }

    #[test]
    fn test_factory_unknown_provider() {
        let config = LlmConfig {
            api_key: "k".to_string(),
            base_url: None,
            default_model: "m".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout_secs: 30,
        };
        let result = LlmServiceFactory::create("openai", config);
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_config_debug_hides_api_key() {
        let config = LlmConfig {
            api_key: "super-secret".to_string(),
            base_url: None,
            default_model: "m".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout_secs: 30,
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
    }
}
