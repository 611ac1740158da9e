//! Anthropic Claude API Implementation
//!
//! Calls the Anthropic Messages API (https://api.anthropic.com/v1/messages)
//! using reqwest HTTP client, including tool-use content blocks.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmConfig, LlmError, LlmRole, LlmService,
    MessageContent, ToolDefinition, ToolUse,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API request body
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    messages: Vec<MessageBody>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    role: String,
    content: Vec<WireBlock>,
}

/// Content block on the wire; the same tagged shape appears in requests
/// (text, tool_result) and responses (text, tool_use).
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

/// Anthropic Messages API response body
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<WireBlock>,
    model: String,
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: i32,
    output_tokens: i32,
}

/// Anthropic API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

fn to_wire_message(message: &ChatMessage) -> MessageBody {
    let role = match message.role {
        LlmRole::User => "user".to_string(),
        LlmRole::Assistant => "assistant".to_string(),
    };

    let content = match &message.content {
        MessageContent::Text(text) => vec![WireBlock::Text { text: text.clone() }],
        MessageContent::ToolUses(uses) => uses
            .iter()
            .map(|u| WireBlock::ToolUse {
                id: u.id.clone(),
                name: u.name.clone(),
                input: u.arguments.clone(),
            })
            .collect(),
        MessageContent::ToolOutcomes(outcomes) => outcomes
            .iter()
            .map(|o| WireBlock::ToolResult {
                tool_use_id: o.tool_use_id.clone(),
                content: o.content.clone(),
                is_error: o.is_error,
            })
            .collect(),
    };

    MessageBody { role, content }
}

fn to_wire_tool(tool: &ToolDefinition) -> WireTool {
    WireTool {
        name: tool.name.clone(),
        description: tool.description.clone(),
        input_schema: tool.input_schema.clone(),
    }
}

/// Anthropic LLM service implementation
pub struct AnthropicService {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

impl AnthropicService {
    /// Create a new Anthropic service
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            config,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl LlmService for AnthropicService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);
        let temperature = request.temperature.or(Some(self.config.temperature));

        let body = MessagesRequest {
            model: model.clone(),
            max_tokens,
            system: request.system_prompt,
            temperature,
            tools: request.tools.iter().map(to_wire_tool).collect(),
            messages: request.messages.iter().map(to_wire_message).collect(),
        };

        let url = format!("{}/v1/messages", self.base_url);

        tracing::debug!(
            model = %model,
            max_tokens = %max_tokens,
            tools = body.tools.len(),
            "Sending Anthropic API request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Request(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            // Try to parse as API error
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(LlmError::Response(format!(
                    "Anthropic API error ({}): {}",
                    error_response.error.error_type, error_response.error.message
                )));
            }

            return Err(LlmError::Response(format!(
                "Anthropic API returned {}: {}",
                status, error_body
            )));
        }

        let api_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        let mut text_parts = Vec::new();
        let mut tool_uses = Vec::new();
        for block in api_response.content {
            match block {
                WireBlock::Text { text } => text_parts.push(text),
                WireBlock::ToolUse { id, name, input } => tool_uses.push(ToolUse {
                    id,
                    name,
                    arguments: input,
                }),
                WireBlock::ToolResult { .. } => {
                    // Never expected from the model side; ignore rather than fail.
                }
            }
        }

        Ok(CompletionResponse {
            text: text_parts.join(""),
            tool_uses,
            model: api_response.model,
            input_tokens: api_response.usage.input_tokens,
            output_tokens: api_response.usage.output_tokens,
            stop_reason: api_response
                .stop_reason
                .unwrap_or_else(|| "end_turn".to_string()),
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolOutcome;

    fn config() -> LlmConfig {
        LlmConfig {
            api_key: "k".to_string(),
            base_url: Some("http://localhost:9".to_string()),
            default_model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_text_message_serializes_to_text_block() {
        let wire = to_wire_message(&ChatMessage::user("hola"));
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "hola");
    }

    #[test]
    fn test_tool_use_message_serializes_to_tool_use_blocks() {
        let wire = to_wire_message(&ChatMessage::tool_uses(vec![ToolUse {
            id: "tu_1".to_string(),
            name: "createBooking".to_string(),
            arguments: serde_json::json!({"serviceName": "Temazcal"}),
        }]));
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"][0]["type"], "tool_use");
        assert_eq!(json["content"][0]["name"], "createBooking");
        assert_eq!(json["content"][0]["input"]["serviceName"], "Temazcal");
    }

    #[test]
    fn test_tool_outcome_message_serializes_to_tool_result_blocks() {
        let wire = to_wire_message(&ChatMessage::tool_outcomes(vec![ToolOutcome {
            tool_use_id: "tu_1".to_string(),
            content: r#"{"status":"pending"}"#.to_string(),
            is_error: false,
        }]));
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "tool_result");
        assert_eq!(json["content"][0]["tool_use_id"], "tu_1");
    }

    #[test]
    fn test_response_parses_mixed_content_blocks() {
        let raw = serde_json::json!({
            "content": [
                {"type": "text", "text": "Déjame registrar eso."},
                {"type": "tool_use", "id": "tu_9", "name": "addContactNotes",
                 "input": {"notes": "prefiere julio"}}
            ],
            "model": "claude-sonnet-4-5-20250929",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 20}
        });

        let parsed: MessagesResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.content.len(), 2);
        assert!(matches!(parsed.content[0], WireBlock::Text { .. }));
        assert!(matches!(parsed.content[1], WireBlock::ToolUse { .. }));
        assert_eq!(parsed.usage.output_tokens, 20);
    }

    #[test]
    fn test_request_omits_empty_tools() {
        let body = MessagesRequest {
            model: "m".to_string(),
            max_tokens: 10,
            system: None,
            temperature: None,
            tools: Vec::new(),
            messages: vec![to_wire_message(&ChatMessage::user("q"))],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_default_model_comes_from_config() {
        let service = AnthropicService::new(config());
        assert_eq!(service.default_model(), "claude-sonnet-4-5-20250929");
    }
}
