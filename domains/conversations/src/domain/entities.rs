//! Domain entities for the Conversations domain
//!
//! A Conversation is a bounded dialogue session owned by exactly one contact;
//! at most one is active per contact at any time. Messages are immutable once
//! written and ordered by timestamp; the ordered sequence is the dialogue
//! history fed to the model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use retiro_common::{Error, Result};

/// Message direction — matches the `message_direction` DB enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

impl std::fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageDirection::Inbound => write!(f, "inbound"),
            MessageDirection::Outbound => write!(f, "outbound"),
        }
    }
}

/// Message payload type — only text is in scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "message_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
}

/// Message delivery status — matches the `message_status` DB enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Received,
    Sent,
}

/// Customer intent detected by the model during analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerIntent {
    Greeting,
    Inquiry,
    BookingRequest,
    BookingChange,
    Pricing,
    Complaint,
    Farewell,
    Other,
}

impl std::fmt::Display for CustomerIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomerIntent::Greeting => write!(f, "greeting"),
            CustomerIntent::Inquiry => write!(f, "inquiry"),
            CustomerIntent::BookingRequest => write!(f, "booking_request"),
            CustomerIntent::BookingChange => write!(f, "booking_change"),
            CustomerIntent::Pricing => write!(f, "pricing"),
            CustomerIntent::Complaint => write!(f, "complaint"),
            CustomerIntent::Farewell => write!(f, "farewell"),
            CustomerIntent::Other => write!(f, "other"),
        }
    }
}

/// Current schema version for the conversation context record
const CONTEXT_VERSION: u32 = 1;

fn context_version() -> u32 {
    CONTEXT_VERSION
}

/// Structured per-conversation context
///
/// A versioned record with known optional fields, not a free-form bag: what
/// the model extracts must match what the store expects, and old rows stay
/// readable through serde defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    #[serde(default = "context_version")]
    pub version: u32,
    #[serde(default)]
    pub last_intent: Option<CustomerIntent>,
    #[serde(default)]
    pub needs_human_agent: bool,
    #[serde(default)]
    pub extracted_name: Option<String>,
    #[serde(default)]
    pub extracted_email: Option<String>,
    #[serde(default)]
    pub interested_in: Vec<String>,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self {
            version: CONTEXT_VERSION,
            last_intent: None,
            needs_human_agent: false,
            extracted_name: None,
            extracted_email: None,
            interested_in: Vec::new(),
        }
    }
}

/// Maximum message content length (CHECK length <= 65536)
const MAX_CONTENT_LENGTH: usize = 65536;

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub context: Json<ConversationContext>,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
}

impl Conversation {
    /// Open a new active conversation with empty context
    pub fn new(contact_id: Uuid) -> Self {
        Conversation {
            id: Uuid::new_v4(),
            contact_id,
            started_at: Utc::now(),
            ended_at: None,
            is_active: true,
            context: Json(ConversationContext::default()),
            summary: None,
            sentiment: None,
        }
    }
}

/// Message entity — immutable once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub external_id: Option<String>,
    pub direction: MessageDirection,
    pub message_type: MessageType,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new inbound message (status `received`)
    pub fn new_inbound(
        conversation_id: Uuid,
        content: String,
        external_id: Option<String>,
    ) -> Result<Self> {
        Self::validate_content(&content)?;

        Ok(Message {
            id: Uuid::new_v4(),
            conversation_id,
            external_id,
            direction: MessageDirection::Inbound,
            message_type: MessageType::Text,
            content,
            status: MessageStatus::Received,
            created_at: Utc::now(),
        })
    }

    /// Create a new outbound message (status `sent`)
    pub fn new_outbound(conversation_id: Uuid, content: String) -> Result<Self> {
        Self::validate_content(&content)?;

        Ok(Message {
            id: Uuid::new_v4(),
            conversation_id,
            external_id: None,
            direction: MessageDirection::Outbound,
            message_type: MessageType::Text,
            content,
            status: MessageStatus::Sent,
            created_at: Utc::now(),
        })
    }

    fn validate_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }
        if content.len() > MAX_CONTENT_LENGTH {
            return Err(Error::InvalidArgument(format!(
                "Message content must be at most {} bytes",
                MAX_CONTENT_LENGTH
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_display() {
        assert_eq!(MessageDirection::Inbound.to_string(), "inbound");
        assert_eq!(MessageDirection::Outbound.to_string(), "outbound");
    }

    #[test]
    fn test_direction_serialization_lowercase() {
        assert_eq!(
            serde_json::to_string(&MessageDirection::Inbound).unwrap(),
            "\"inbound\""
        );
        assert_eq!(
            serde_json::to_string(&MessageStatus::Sent).unwrap(),
            "\"sent\""
        );
    }

    #[test]
    fn test_intent_serialization_snake_case() {
        assert_eq!(
            serde_json::to_string(&CustomerIntent::BookingRequest).unwrap(),
            "\"booking_request\""
        );
        let parsed: CustomerIntent = serde_json::from_str("\"pricing\"").unwrap();
        assert_eq!(parsed, CustomerIntent::Pricing);
    }

    #[test]
    fn test_new_conversation_is_active_with_empty_context() {
        let contact_id = Uuid::new_v4();
        let conv = Conversation::new(contact_id);

        assert_eq!(conv.contact_id, contact_id);
        assert!(conv.is_active);
        assert!(conv.ended_at.is_none());
        assert_eq!(conv.context.0, ConversationContext::default());
        assert!(conv.summary.is_none());
        assert!(conv.sentiment.is_none());
    }

    #[test]
    fn test_context_default_version() {
        let ctx = ConversationContext::default();
        assert_eq!(ctx.version, 1);
        assert!(ctx.last_intent.is_none());
        assert!(!ctx.needs_human_agent);
    }

    #[test]
    fn test_context_old_rows_deserialize_with_defaults() {
        // A row written before newer fields existed still loads
        let ctx: ConversationContext = serde_json::from_str("{}").unwrap();
        assert_eq!(ctx.version, 1);
        assert!(ctx.interested_in.is_empty());

        let ctx: ConversationContext =
            serde_json::from_str(r#"{"last_intent":"greeting","needs_human_agent":true}"#).unwrap();
        assert_eq!(ctx.last_intent, Some(CustomerIntent::Greeting));
        assert!(ctx.needs_human_agent);
    }

    #[test]
    fn test_context_roundtrip() {
        let ctx = ConversationContext {
            version: 1,
            last_intent: Some(CustomerIntent::BookingRequest),
            needs_human_agent: false,
            extracted_name: Some("María".to_string()),
            extracted_email: None,
            interested_in: vec!["temazcal".to_string()],
        };
        let json = serde_json::to_string(&ctx).unwrap();
        let parsed: ConversationContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, parsed);
    }

    #[test]
    fn test_inbound_message_fields() {
        let conv_id = Uuid::new_v4();
        let msg = Message::new_inbound(
            conv_id,
            "quiero reservar".to_string(),
            Some("wamid.123".to_string()),
        )
        .unwrap();

        assert_eq!(msg.conversation_id, conv_id);
        assert_eq!(msg.direction, MessageDirection::Inbound);
        assert_eq!(msg.status, MessageStatus::Received);
        assert_eq!(msg.message_type, MessageType::Text);
        assert_eq!(msg.external_id.as_deref(), Some("wamid.123"));
    }

    #[test]
    fn test_outbound_message_fields() {
        let msg = Message::new_outbound(Uuid::new_v4(), "¡Claro!".to_string()).unwrap();
        assert_eq!(msg.direction, MessageDirection::Outbound);
        assert_eq!(msg.status, MessageStatus::Sent);
        assert!(msg.external_id.is_none());
    }

    #[test]
    fn test_message_content_empty_rejected() {
        let result = Message::new_inbound(Uuid::new_v4(), "".to_string(), None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_message_content_whitespace_only_rejected() {
        let result = Message::new_outbound(Uuid::new_v4(), "   \t\n  ".to_string());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_message_content_oversized_rejected() {
        let result = Message::new_inbound(Uuid::new_v4(), "x".repeat(65537), None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_message_serialization_roundtrip() {
        let msg = Message::new_inbound(Uuid::new_v4(), "hola".to_string(), None).unwrap();
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, deserialized);
    }
}
