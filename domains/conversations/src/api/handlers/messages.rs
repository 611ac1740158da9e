//! Message API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use retiro_common::{Error, Result};
use serde::Serialize;
use uuid::Uuid;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Message, MessageDirection, MessageStatus, MessageType};

/// Message response DTO
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub external_id: Option<String>,
    pub direction: MessageDirection,
    pub message_type: MessageType,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            external_id: m.external_id,
            direction: m.direction,
            message_type: m.message_type,
            content: m.content,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

/// List messages for a conversation, ascending by time
pub async fn list_messages(
    State(state): State<ConversationsState>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>> {
    // Verify conversation exists
    state
        .repos
        .conversations
        .find(conversation_id)
        .await?
        .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;

    let messages = state
        .repos
        .messages
        .list_by_conversation(conversation_id)
        .await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}
