//! WhatsApp chat gateway client for Retiro
//!
//! Abstracts the HTTP gateway that bridges to WhatsApp:
//! - `ChatGateway` trait consumed by the contact directory and the orchestrator
//! - `WahaGateway` implementation for a WAHA-style HTTP API
//! - `MockChatGateway` recording mock for tests
//!
//! Transport failures surface as `GatewayError::Transport`; an unknown contact
//! is `Ok(None)` from `fetch_contact`, never an error.

pub mod mock;
pub mod waha;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway configuration error: {0}")]
    Configuration(String),

    #[error("Gateway transport error: {0}")]
    Transport(String),

    #[error("Gateway response error: {0}")]
    Response(String),

    #[error("Gateway request timed out")]
    Timeout,
}

/// Profile data the gateway knows about a chat identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatContactProfile {
    pub name: Option<String>,
}

/// Chat gateway trait for different providers
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send a text message to a chat
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), GatewayError>;

    /// Show the "typing..." indicator in a chat
    async fn start_typing(&self, chat_id: &str) -> Result<(), GatewayError>;

    /// Hide the "typing..." indicator in a chat
    async fn stop_typing(&self, chat_id: &str) -> Result<(), GatewayError>;

    /// Look up the gateway's profile for a chat identity.
    /// `Ok(None)` means the contact is unknown to the gateway.
    async fn fetch_contact(&self, chat_id: &str)
        -> Result<Option<ChatContactProfile>, GatewayError>;
}

/// Gateway configuration
#[derive(Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: String,
    pub session: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Factory for creating ChatGateway implementations
pub struct GatewayFactory;

impl GatewayFactory {
    pub fn create(provider: &str, config: GatewayConfig) -> Result<Box<dyn ChatGateway>, GatewayError> {
        match provider {
            "waha" => {
                tracing::info!(base_url = %config.base_url, session = %config.session, "Creating WAHA chat gateway");
                Ok(Box::new(waha::WahaGateway::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock chat gateway");
                Ok(Box::new(mock::MockChatGateway::new()))
            }
            provider => Err(GatewayError::Configuration(format!(
                "Unknown gateway provider: {}. Supported providers: waha, mock",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_mock_succeeds() {
        let config = GatewayConfig {
            base_url: "http://localhost:3001".to_string(),
            api_key: String::new(),
            session: "default".to_string(),
            timeout_secs: 15,
        };
        assert!(GatewayFactory::create("mock", config).is_ok());
    }

    #[test]
    fn test_factory_unknown_provider() {
        let config = GatewayConfig {
            base_url: "http://localhost:3001".to_string(),
            api_key: String::new(),
            session: "default".to_string(),
            timeout_secs: 15,
        };
        let result = GatewayFactory::create("telegram", config);
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }

    #[test]
    fn test_config_debug_hides_api_key() {
        let config = GatewayConfig {
            base_url: "http://localhost:3001".to_string(),
            api_key: "super-secret".to_string(),
            session: "default".to_string(),
            timeout_secs: 15,
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
    }
}
