//! Message repository

use crate::domain::entities::Message;
use retiro_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new message.
    ///
    /// Returns `None` when the external id was already seen: the
    /// `ON CONFLICT DO NOTHING` guard makes webhook redelivery idempotent —
    /// no second row is ever written for the same external id.
    pub async fn create(&self, msg: &Message) -> Result<Option<Message>> {
        let created = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (
                id, conversation_id, external_id, direction,
                message_type, content, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (external_id) DO NOTHING
            RETURNING id, conversation_id, external_id, direction,
                      message_type, content, status, created_at
            "#,
        )
        .bind(msg.id)
        .bind(msg.conversation_id)
        .bind(&msg.external_id)
        .bind(msg.direction)
        .bind(msg.message_type)
        .bind(&msg.content)
        .bind(msg.status)
        .bind(msg.created_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }

    /// Find a message by its external (gateway) id
    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Message>> {
        let msg = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, external_id, direction,
                   message_type, content, status, created_at
            FROM messages
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(msg)
    }

    /// Most recent `limit` messages of a conversation, ascending by time
    pub async fn recent_by_conversation(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>> {
        let mut messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, external_id, direction,
                   message_type, content, status, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        messages.reverse();
        Ok(messages)
    }

    /// All messages of a conversation, ascending by time
    pub async fn list_by_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, external_id, direction,
                   message_type, content, status, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
