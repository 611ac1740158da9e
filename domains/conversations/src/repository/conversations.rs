//! Conversation repository

use crate::domain::entities::{Conversation, ConversationContext};
use retiro_common::Result;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find conversation by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Conversation>> {
        let conv = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, contact_id, started_at, ended_at, is_active,
                   context, summary, sentiment
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conv)
    }

    /// Find the active conversation for a contact, most recently started first
    pub async fn find_active_by_contact(&self, contact_id: Uuid) -> Result<Option<Conversation>> {
        let conv = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, contact_id, started_at, ended_at, is_active,
                   context, summary, sentiment
            FROM conversations
            WHERE contact_id = $1 AND is_active
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conv)
    }

    /// List conversations for a contact, newest first
    pub async fn list_by_contact(&self, contact_id: Uuid) -> Result<Vec<Conversation>> {
        let convs = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, contact_id, started_at, ended_at, is_active,
                   context, summary, sentiment
            FROM conversations
            WHERE contact_id = $1
            ORDER BY started_at DESC
            "#,
        )
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(convs)
    }

    /// Create a new conversation
    pub async fn create(&self, conv: &Conversation) -> Result<Conversation> {
        let created = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (
                id, contact_id, started_at, ended_at, is_active,
                context, summary, sentiment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, contact_id, started_at, ended_at, is_active,
                      context, summary, sentiment
            "#,
        )
        .bind(conv.id)
        .bind(conv.contact_id)
        .bind(conv.started_at)
        .bind(conv.ended_at)
        .bind(conv.is_active)
        .bind(&conv.context)
        .bind(&conv.summary)
        .bind(&conv.sentiment)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Replace the structured context of a conversation
    pub async fn update_context(
        &self,
        id: Uuid,
        context: &ConversationContext,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE conversations SET context = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(context))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Whether a sqlx error is a unique-constraint violation
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db) if db.is_unique_violation()
    )
}
