//! WAHA-style WhatsApp HTTP API implementation
//!
//! Talks to a WAHA (WhatsApp HTTP API) instance: session-scoped endpoints,
//! `X-Api-Key` authentication. A 404 from the contacts endpoint means
//! "unknown contact", not a transport failure.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{ChatContactProfile, ChatGateway, GatewayConfig, GatewayError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendTextRequest<'a> {
    session: &'a str,
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypingRequest<'a> {
    session: &'a str,
    chat_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ContactResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    pushname: Option<String>,
}

/// WAHA chat gateway implementation
pub struct WahaGateway {
    client: Client,
    config: GatewayConfig,
}

impl WahaGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .header("X-Api-Key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Response(format!(
                "Gateway returned {}: {}",
                status, error_body
            )));
        }

        Ok(())
    }
}

fn map_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(format!("HTTP request failed: {}", e))
    }
}

#[async_trait::async_trait]
impl ChatGateway for WahaGateway {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), GatewayError> {
        tracing::debug!(chat_id = %chat_id, "Sending text via gateway");
        self.post_json(
            "sendText",
            &SendTextRequest {
                session: &self.config.session,
                chat_id,
                text,
            },
        )
        .await
    }

    async fn start_typing(&self, chat_id: &str) -> Result<(), GatewayError> {
        self.post_json(
            "startTyping",
            &TypingRequest {
                session: &self.config.session,
                chat_id,
            },
        )
        .await
    }

    async fn stop_typing(&self, chat_id: &str) -> Result<(), GatewayError> {
        self.post_json(
            "stopTyping",
            &TypingRequest {
                session: &self.config.session,
                chat_id,
            },
        )
        .await
    }

    async fn fetch_contact(
        &self,
        chat_id: &str,
    ) -> Result<Option<ChatContactProfile>, GatewayError> {
        let response = self
            .client
            .get(self.endpoint("contacts"))
            .header("X-Api-Key", &self.config.api_key)
            .query(&[
                ("contactId", chat_id),
                ("session", self.config.session.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Response(format!(
                "Gateway returned {}: {}",
                status, error_body
            )));
        }

        let contact: ContactResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Response(format!("Failed to parse contact: {}", e)))?;

        Ok(Some(ChatContactProfile {
            name: contact.name.or(contact.pushname),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base_url: &str) -> WahaGateway {
        WahaGateway::new(GatewayConfig {
            base_url: base_url.to_string(),
            api_key: "k".to_string(),
            session: "default".to_string(),
            timeout_secs: 15,
        })
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let g = gateway("http://localhost:3001/");
        assert_eq!(g.endpoint("sendText"), "http://localhost:3001/api/sendText");

        let g = gateway("http://localhost:3001");
        assert_eq!(
            g.endpoint("startTyping"),
            "http://localhost:3001/api/startTyping"
        );
    }

    #[test]
    fn test_send_text_request_shape() {
        let body = SendTextRequest {
            session: "default",
            chat_id: "5215551234567@c.us",
            text: "hola",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["session"], "default");
        assert_eq!(json["chatId"], "5215551234567@c.us");
        assert_eq!(json["text"], "hola");
    }

    #[test]
    fn test_contact_response_falls_back_to_pushname() {
        let raw = serde_json::json!({"pushname": "María"});
        let parsed: ContactResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.name.or(parsed.pushname).as_deref(), Some("María"));
    }
}
