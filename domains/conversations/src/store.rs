//! Conversation store: session lifecycle and the ordered message log
//!
//! Owns the "at most one active conversation per contact" invariant. The
//! database enforces it with a partial unique index on `(contact_id) WHERE
//! is_active`; a creation race is resolved by re-fetching the winner's row.

use uuid::Uuid;

use retiro_common::{Error, Result};

use crate::domain::entities::{Conversation, ConversationContext, Message};
use crate::repository::conversations::is_unique_violation;
use crate::repository::ConversationsRepositories;

/// Result of appending an inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct AppendedMessage {
    pub message: Message,
    /// The external id had already been persisted; no new row was written
    pub duplicate: bool,
}

#[derive(Clone)]
pub struct ConversationStore {
    repos: ConversationsRepositories,
}

impl ConversationStore {
    pub fn new(repos: ConversationsRepositories) -> Self {
        Self { repos }
    }

    /// Fetch the contact's active conversation, opening one if none exists.
    pub async fn ensure_active(&self, contact_id: Uuid) -> Result<Conversation> {
        if let Some(conv) = self
            .repos
            .conversations
            .find_active_by_contact(contact_id)
            .await?
        {
            return Ok(conv);
        }

        let conv = Conversation::new(contact_id);
        match self.repos.conversations.create(&conv).await {
            Ok(created) => {
                tracing::info!(conversation_id = %created.id, contact_id = %contact_id, "Opened conversation");
                Ok(created)
            }
            Err(Error::Database(ref e)) if is_unique_violation(e) => {
                // A concurrent pipeline opened the conversation first.
                self.repos
                    .conversations
                    .find_active_by_contact(contact_id)
                    .await?
                    .ok_or_else(|| {
                        Error::Internal(format!(
                            "Active conversation for {} vanished after unique violation",
                            contact_id
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Persist an inbound message, idempotently under webhook redelivery.
    pub async fn append_inbound(
        &self,
        conversation_id: Uuid,
        content: &str,
        external_id: Option<&str>,
    ) -> Result<AppendedMessage> {
        let msg = Message::new_inbound(
            conversation_id,
            content.to_string(),
            external_id.map(str::to_string),
        )?;

        if let Some(created) = self.repos.messages.create(&msg).await? {
            return Ok(AppendedMessage {
                message: created,
                duplicate: false,
            });
        }

        // The insert was skipped: the external id is already on file.
        let external_id = external_id.ok_or_else(|| {
            Error::Internal("Message insert skipped without an external id".to_string())
        })?;
        let existing = self
            .repos
            .messages
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(|| {
                Error::Internal(format!(
                    "Message {} vanished after conflict-skip",
                    external_id
                ))
            })?;

        Ok(AppendedMessage {
            message: existing,
            duplicate: true,
        })
    }

    /// Persist an outbound message.
    pub async fn append_outbound(&self, conversation_id: Uuid, content: &str) -> Result<Message> {
        let msg = Message::new_outbound(conversation_id, content.to_string())?;
        self.repos.messages.create(&msg).await?.ok_or_else(|| {
            Error::Internal("Outbound message insert unexpectedly skipped".to_string())
        })
    }

    /// The most recent `limit` messages in ascending time order.
    ///
    /// Pure read; calling it repeatedly without intervening writes yields the
    /// identical sequence.
    pub async fn history(&self, conversation_id: Uuid, limit: usize) -> Result<Vec<Message>> {
        self.repos
            .messages
            .recent_by_conversation(conversation_id, limit as i64)
            .await
    }

    /// Replace the structured context of a conversation.
    pub async fn update_context(
        &self,
        conversation_id: Uuid,
        context: &ConversationContext,
    ) -> Result<()> {
        let updated = self
            .repos
            .conversations
            .update_context(conversation_id, context)
            .await?;
        if !updated {
            return Err(Error::NotFound(format!(
                "Conversation {} not found",
                conversation_id
            )));
        }
        Ok(())
    }

    /// Find the active conversation for a contact without creating one.
    pub async fn find_active(&self, contact_id: Uuid) -> Result<Option<Conversation>> {
        self.repos
            .conversations
            .find_active_by_contact(contact_id)
            .await
    }
}
