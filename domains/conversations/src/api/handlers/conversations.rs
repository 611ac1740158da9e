//! Conversation API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use retiro_common::Result;
use serde::Serialize;
use uuid::Uuid;

use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Conversation, ConversationContext};

/// Conversation response DTO
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub context: ConversationContext,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            contact_id: c.contact_id,
            started_at: c.started_at,
            ended_at: c.ended_at,
            is_active: c.is_active,
            context: c.context.0,
            summary: c.summary,
            sentiment: c.sentiment,
        }
    }
}

/// List conversations for a contact
pub async fn list_contact_conversations(
    State(state): State<ConversationsState>,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<Vec<ConversationResponse>>> {
    let convs = state
        .repos
        .conversations
        .list_by_contact(contact_id)
        .await?;

    Ok(Json(convs.into_iter().map(Into::into).collect()))
}
