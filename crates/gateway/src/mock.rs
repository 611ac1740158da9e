//! Mock Chat Gateway Implementation
//!
//! Records sent messages and typing events; tests can script contact
//! profiles and force transport failures.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{ChatContactProfile, ChatGateway, GatewayError};

/// Recording mock gateway for testing
#[derive(Debug, Default)]
pub struct MockChatGateway {
    sent: Mutex<Vec<(String, String)>>,
    typing_events: Mutex<Vec<(String, bool)>>,
    profiles: Mutex<HashMap<String, ChatContactProfile>>,
    fail_sends: Mutex<bool>,
}

impl MockChatGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a profile for `fetch_contact`
    pub fn set_profile(&self, chat_id: &str, name: Option<&str>) {
        self.profiles.lock().expect("mock lock").insert(
            chat_id.to_string(),
            ChatContactProfile {
                name: name.map(str::to_string),
            },
        );
    }

    /// Make subsequent `send_text` calls fail with a transport error
    pub fn fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().expect("mock lock") = fail;
    }

    /// Messages sent so far, as `(chat_id, text)` pairs
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("mock lock").clone()
    }

    /// Typing events so far, as `(chat_id, started)` pairs
    pub fn typing_events(&self) -> Vec<(String, bool)> {
        self.typing_events.lock().expect("mock lock").clone()
    }
}

#[async_trait::async_trait]
impl ChatGateway for MockChatGateway {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), GatewayError> {
        if *self.fail_sends.lock().expect("mock lock") {
            return Err(GatewayError::Transport("mock send failure".to_string()));
        }
        self.sent
            .lock()
            .expect("mock lock")
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn start_typing(&self, chat_id: &str) -> Result<(), GatewayError> {
        self.typing_events
            .lock()
            .expect("mock lock")
            .push((chat_id.to_string(), true));
        Ok(())
    }

    async fn stop_typing(&self, chat_id: &str) -> Result<(), GatewayError> {
        self.typing_events
            .lock()
            .expect("mock lock")
            .push((chat_id.to_string(), false));
        Ok(())
    }

    async fn fetch_contact(
        &self,
        chat_id: &str,
    ) -> Result<Option<ChatContactProfile>, GatewayError> {
        Ok(self.profiles.lock().expect("mock lock").get(chat_id).cloned())
    }
}
