//! Conversations domain: dialogue sessions, message log, structured context

pub mod api;
pub mod domain;
pub mod repository;
pub mod store;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    Conversation, ConversationContext, CustomerIntent, Message, MessageDirection, MessageStatus,
    MessageType,
};

// Re-export repository types
pub use repository::{ConversationRepository, ConversationsRepositories, MessageRepository};

// Re-export the store
pub use store::{AppendedMessage, ConversationStore};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
