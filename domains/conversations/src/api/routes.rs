//! Route definitions for the Conversations domain API

use axum::{routing::get, Router};

use super::handlers::{conversations, messages};
use super::middleware::ConversationsState;

/// Create all Conversations domain API routes
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .route(
            "/v1/contacts/{contact_id}/conversations",
            get(conversations::list_contact_conversations),
        )
        .route(
            "/v1/conversations/{conversation_id}/messages",
            get(messages::list_messages),
        )
}
