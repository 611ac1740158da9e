//! Conversations domain state

use crate::repository::ConversationsRepositories;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub repos: ConversationsRepositories,
}
