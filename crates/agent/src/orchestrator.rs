//! The dialogue orchestrator: one inbound message in, exactly one reply out
//!
//! Pipeline per inbound message: resolve contact → ensure conversation →
//! persist inbound (durability before any model call) → bounded history →
//! first model pass → execute requested actions → follow-up pass → deliver →
//! persist outbound. The two-pass tool protocol is typed end to end:
//! `ModelTurn::Proposed` tool calls become `ActionRecord`s, which become
//! `tool_result` blocks on the follow-up request (Proposed → Executed →
//! Narrated), never string-concatenated logs.
//!
//! Failure policy: a model or action-infrastructure failure falls back to a
//! short apology so the customer is never left without a reply; a gateway
//! delivery failure is logged and surfaced to the caller without rolling back
//! the persisted inbound message.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use retiro_common::{Error, Result};
use retiro_contacts::{Contact, ContactDirectory};
use retiro_conversations::{Conversation, ConversationStore};
use retiro_gateway::{ChatGateway, GatewayError};
use retiro_llm::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmError, LlmService, ToolOutcome, ToolUse,
};
use serde_json::json;

use crate::actions::AgentAction;
use crate::executor::{ActionExecutor, ActionOutcome};
use crate::prompt;

/// A classified inbound chat message handed over by the webhook ingress
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Gateway message id, used for webhook idempotency
    pub external_id: Option<String>,
    /// Gateway chat identity, e.g. `"5215551234567@c.us"`
    pub chat_id: String,
    pub body: String,
}

/// Fixed dialogue configuration; none of this varies per request
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub history_limit: usize,
    pub fallback_reply: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            history_limit: 10,
            fallback_reply:
                "Lo siento, tuve un problema técnico. ¿Podrías repetir tu mensaje?".to_string(),
        }
    }
}

/// What the model asked for on a pass
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    /// A direct natural-language reply
    Reply(String),
    /// One or more action invocations, in model order
    Proposed(Vec<ToolUse>),
}

/// Interpret a completion as a typed turn
pub fn interpret(response: &CompletionResponse) -> ModelTurn {
    if response.has_tool_uses() {
        ModelTurn::Proposed(response.tool_uses.clone())
    } else {
        ModelTurn::Reply(response.text.clone())
    }
}

/// One executed action: the machine-readable record threaded into the
/// follow-up pass
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub tool_use_id: String,
    pub action: String,
    pub arguments: serde_json::Value,
    pub outcome: ActionOutcome,
}

impl ActionRecord {
    /// Render this record as a `tool_result` block for the follow-up pass
    pub fn tool_outcome(&self) -> ToolOutcome {
        match &self.outcome {
            ActionOutcome::Applied(value) => ToolOutcome {
                tool_use_id: self.tool_use_id.clone(),
                content: value.to_string(),
                is_error: false,
            },
            ActionOutcome::Rejected(reason) => ToolOutcome {
                tool_use_id: self.tool_use_id.clone(),
                content: json!({ "error": reason }).to_string(),
                is_error: true,
            },
        }
    }
}

pub struct DialogueOrchestrator {
    directory: ContactDirectory,
    store: ConversationStore,
    executor: ActionExecutor,
    llm: Arc<dyn LlmService>,
    gateway: Arc<dyn ChatGateway>,
    settings: OrchestratorSettings,
    // Serializes pipelines per chat so burst messages from one contact are
    // processed in arrival order; distinct chats proceed in parallel.
    chat_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DialogueOrchestrator {
    pub fn new(
        directory: ContactDirectory,
        store: ConversationStore,
        executor: ActionExecutor,
        llm: Arc<dyn LlmService>,
        gateway: Arc<dyn ChatGateway>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            directory,
            store,
            executor,
            llm,
            gateway,
            settings,
            chat_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run the full pipeline for one inbound message.
    pub async fn handle_inbound(&self, inbound: InboundMessage) -> Result<()> {
        let lock = self.chat_lock(&inbound.chat_id).await;
        let _guard = lock.lock().await;

        let contact = self.directory.resolve(&inbound.chat_id).await?;
        let conversation = self.store.ensure_active(contact.id).await?;

        // Durability before any model call: once the inbound row exists, a
        // crash cannot lose the customer's text.
        let appended = self
            .store
            .append_inbound(
                conversation.id,
                &inbound.body,
                inbound.external_id.as_deref(),
            )
            .await?;
        if appended.duplicate {
            tracing::info!(
                external_id = ?inbound.external_id,
                "Duplicate inbound message; reply already owed by the first delivery"
            );
            return Ok(());
        }

        if let Err(e) = self.gateway.start_typing(&inbound.chat_id).await {
            tracing::debug!(error = %e, "Typing indicator failed");
        }

        let reply = match self.converse(&contact, &conversation).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(
                    contact_id = %contact.id,
                    conversation_id = %conversation.id,
                    error = %e,
                    "Dialogue failed; sending fallback reply"
                );
                self.settings.fallback_reply.clone()
            }
        };

        if let Err(e) = self.gateway.stop_typing(&inbound.chat_id).await {
            tracing::debug!(error = %e, "Typing indicator failed");
        }

        if let Err(e) = self.gateway.send_text(&inbound.chat_id, &reply).await {
            tracing::error!(chat_id = %inbound.chat_id, error = %e, "Failed to deliver reply");
            return Err(map_gateway_error(e));
        }

        self.store.append_outbound(conversation.id, &reply).await?;

        tracing::info!(
            contact_id = %contact.id,
            conversation_id = %conversation.id,
            "Inbound message handled"
        );
        Ok(())
    }

    /// The bounded model dialogue: first pass, optional action execution,
    /// optional follow-up pass. Returns the final user-facing reply.
    async fn converse(&self, contact: &Contact, conversation: &Conversation) -> Result<String> {
        let history = self
            .store
            .history(conversation.id, self.settings.history_limit)
            .await?;

        // The inbound message was persisted before this read, so the history
        // already ends with the customer's new text.
        let messages = prompt::history_messages(&history);
        let system_prompt = prompt::build_system_prompt(contact, &conversation.context.0);

        let first = self
            .llm
            .complete(CompletionRequest {
                model: String::new(),
                system_prompt: Some(system_prompt.clone()),
                messages: messages.clone(),
                tools: AgentAction::definitions(),
                max_tokens: None,
                temperature: None,
            })
            .await
            .map_err(map_llm_error)?;

        let tool_uses = match interpret(&first) {
            ModelTurn::Reply(text) if text.trim().is_empty() => {
                tracing::warn!("Model returned an empty reply");
                return Ok(self.settings.fallback_reply.clone());
            }
            ModelTurn::Reply(text) => return Ok(text),
            ModelTurn::Proposed(tool_uses) => tool_uses,
        };

        // Executed: run each requested action sequentially, in model order.
        let mut records = Vec::with_capacity(tool_uses.len());
        for tool_use in &tool_uses {
            records.push(self.execute_tool(tool_use).await?);
        }

        // Narrated: the follow-up pass turns the outcome records into the
        // final user-facing reply.
        let mut followup_messages = messages;
        followup_messages.push(ChatMessage::tool_uses(tool_uses));
        followup_messages.push(ChatMessage::tool_outcomes(
            records.iter().map(ActionRecord::tool_outcome).collect(),
        ));

        let followup = self
            .llm
            .complete(CompletionRequest {
                model: String::new(),
                system_prompt: Some(system_prompt),
                messages: followup_messages,
                tools: AgentAction::definitions(),
                max_tokens: None,
                temperature: None,
            })
            .await
            .map_err(map_llm_error)?;

        // The follow-up exists to narrate; further tool requests are not
        // honored, preventing unbounded loops.
        if followup.text.trim().is_empty() {
            tracing::warn!("Follow-up pass produced no text");
            return Ok(self.settings.fallback_reply.clone());
        }
        Ok(followup.text)
    }

    async fn execute_tool(&self, tool_use: &ToolUse) -> Result<ActionRecord> {
        match AgentAction::parse(&tool_use.name, &tool_use.arguments) {
            Ok(action) => {
                let outcome = self.executor.execute(&action).await?;
                Ok(ActionRecord {
                    tool_use_id: tool_use.id.clone(),
                    action: action.name().to_string(),
                    arguments: tool_use.arguments.clone(),
                    outcome,
                })
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(action = %tool_use.name, error = %e, "Rejected malformed tool call");
                Ok(ActionRecord {
                    tool_use_id: tool_use.id.clone(),
                    action: tool_use.name.clone(),
                    arguments: tool_use.arguments.clone(),
                    outcome: ActionOutcome::Rejected(e.to_string()),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn chat_lock(&self, chat_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.chat_locks.lock().await;
        locks
            .entry(chat_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn map_llm_error(e: LlmError) -> Error {
    match e {
        LlmError::RateLimit | LlmError::Timeout | LlmError::Request(_) => {
            Error::Transient(format!("LLM call failed: {}", e))
        }
        LlmError::Response(_) | LlmError::Configuration(_) => {
            Error::Internal(format!("LLM call failed: {}", e))
        }
    }
}

fn map_gateway_error(e: GatewayError) -> Error {
    match e {
        GatewayError::Transport(_) | GatewayError::Timeout => {
            Error::Transient(format!("Gateway call failed: {}", e))
        }
        GatewayError::Response(_) | GatewayError::Configuration(_) => {
            Error::Internal(format!("Gateway call failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retiro_llm::mock::MockLlmService;

    #[test]
    fn test_interpret_text_response() {
        let response = MockLlmService::text_response("¡Hola!");
        assert_eq!(interpret(&response), ModelTurn::Reply("¡Hola!".to_string()));
    }

    #[test]
    fn test_interpret_tool_response_preserves_model_order() {
        let uses = vec![
            ToolUse {
                id: "tu_1".to_string(),
                name: "analyzeCustomerIntent".to_string(),
                arguments: json!({}),
            },
            ToolUse {
                id: "tu_2".to_string(),
                name: "createBooking".to_string(),
                arguments: json!({}),
            },
        ];
        let response = MockLlmService::tool_response(uses.clone());
        assert_eq!(interpret(&response), ModelTurn::Proposed(uses));
    }

    #[test]
    fn test_action_record_applied_renders_payload() {
        let record = ActionRecord {
            tool_use_id: "tu_1".to_string(),
            action: "createBooking".to_string(),
            arguments: json!({"serviceName": "Temazcal"}),
            outcome: ActionOutcome::Applied(json!({"bookingId": "b1", "status": "pending"})),
        };

        let outcome = record.tool_outcome();
        assert_eq!(outcome.tool_use_id, "tu_1");
        assert!(!outcome.is_error);
        let payload: serde_json::Value = serde_json::from_str(&outcome.content).unwrap();
        assert_eq!(payload["status"], "pending");
    }

    #[test]
    fn test_action_record_rejected_renders_error() {
        let record = ActionRecord {
            tool_use_id: "tu_2".to_string(),
            action: "updateBookingStatus".to_string(),
            arguments: json!({}),
            outcome: ActionOutcome::Rejected("Booking b9 not found".to_string()),
        };

        let outcome = record.tool_outcome();
        assert!(outcome.is_error);
        let payload: serde_json::Value = serde_json::from_str(&outcome.content).unwrap();
        assert_eq!(payload["error"], "Booking b9 not found");
    }

    #[test]
    fn test_llm_error_mapping() {
        assert!(matches!(
            map_llm_error(LlmError::RateLimit),
            Error::Transient(_)
        ));
        assert!(matches!(
            map_llm_error(LlmError::Timeout),
            Error::Transient(_)
        ));
        assert!(matches!(
            map_llm_error(LlmError::Response("bad json".to_string())),
            Error::Internal(_)
        ));
    }

    #[test]
    fn test_gateway_error_mapping() {
        assert!(matches!(
            map_gateway_error(GatewayError::Timeout),
            Error::Transient(_)
        ));
        assert!(matches!(
            map_gateway_error(GatewayError::Response("500".to_string())),
            Error::Internal(_)
        ));
    }

    #[test]
    fn test_default_settings() {
        let settings = OrchestratorSettings::default();
        assert_eq!(settings.history_limit, 10);
        assert!(!settings.fallback_reply.is_empty());
    }
}
