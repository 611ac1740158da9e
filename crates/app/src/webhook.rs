//! WhatsApp webhook ingress
//!
//! Validates and classifies the inbound gateway event, acknowledges the HTTP
//! request immediately, and hands matching text messages to the orchestrator
//! on a spawned task — the gateway never waits on a model round trip.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use retiro_agent::InboundMessage;

use crate::AppState;

/// Gateway webhook envelope
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub payload: WebhookPayload,
}

/// Gateway webhook payload; unknown fields are ignored
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub has_media: bool,
}

/// Classify a webhook event, keeping only customer text messages.
///
/// Everything else — own outgoing messages, media, status events — gets a
/// generic acknowledgement and never reaches the orchestrator.
pub fn classify(envelope: &WebhookEnvelope) -> Option<InboundMessage> {
    if envelope.event != "message" {
        return None;
    }
    let payload = &envelope.payload;
    if payload.from_me || payload.has_media {
        return None;
    }
    let chat_id = payload.from.as_deref()?.trim();
    if chat_id.is_empty() {
        return None;
    }
    let body = payload.body.as_deref()?.trim();
    if body.is_empty() {
        return None;
    }

    Some(InboundMessage {
        external_id: payload.id.clone(),
        chat_id: chat_id.to_string(),
        body: body.to_string(),
    })
}

/// Receive a gateway webhook event
pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(envelope): Json<WebhookEnvelope>,
) -> Json<Value> {
    match classify(&envelope) {
        Some(inbound) => {
            tracing::info!(
                chat_id = %inbound.chat_id,
                session = ?envelope.session,
                "Accepted inbound message"
            );
            let orchestrator = state.orchestrator.clone();
            tokio::spawn(async move {
                if let Err(e) = orchestrator.handle_inbound(inbound).await {
                    tracing::error!(error = %e, "Inbound pipeline failed");
                }
            });
            Json(json!({ "status": "accepted" }))
        }
        None => {
            tracing::debug!(event = %envelope.event, "Ignored webhook event");
            Json(json!({ "status": "ignored" }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_envelope(payload: WebhookPayload) -> WebhookEnvelope {
        WebhookEnvelope {
            event: "message".to_string(),
            session: Some("default".to_string()),
            payload,
        }
    }

    fn text_payload() -> WebhookPayload {
        WebhookPayload {
            id: Some("wamid.123".to_string()),
            from: Some("5215551234567@c.us".to_string()),
            body: Some("quiero reservar la boda espiritual el 2025-07-26".to_string()),
            from_me: false,
            has_media: false,
        }
    }

    #[test]
    fn test_classify_accepts_customer_text() {
        let inbound = classify(&message_envelope(text_payload())).unwrap();
        assert_eq!(inbound.chat_id, "5215551234567@c.us");
        assert_eq!(inbound.external_id.as_deref(), Some("wamid.123"));
        assert!(inbound.body.starts_with("quiero reservar"));
    }

    #[test]
    fn test_classify_rejects_non_message_events() {
        let envelope = WebhookEnvelope {
            event: "session.status".to_string(),
            session: None,
            payload: text_payload(),
        };
        assert!(classify(&envelope).is_none());
    }

    #[test]
    fn test_classify_rejects_own_messages() {
        let mut payload = text_payload();
        payload.from_me = true;
        assert!(classify(&message_envelope(payload)).is_none());
    }

    #[test]
    fn test_classify_rejects_media_messages() {
        let mut payload = text_payload();
        payload.has_media = true;
        assert!(classify(&message_envelope(payload)).is_none());
    }

    #[test]
    fn test_classify_rejects_blank_body_or_sender() {
        let mut payload = text_payload();
        payload.body = Some("   ".to_string());
        assert!(classify(&message_envelope(payload)).is_none());

        let mut payload = text_payload();
        payload.body = None;
        assert!(classify(&message_envelope(payload)).is_none());

        let mut payload = text_payload();
        payload.from = None;
        assert!(classify(&message_envelope(payload)).is_none());
    }

    #[test]
    fn test_classify_tolerates_missing_external_id() {
        let mut payload = text_payload();
        payload.id = None;
        let inbound = classify(&message_envelope(payload)).unwrap();
        assert!(inbound.external_id.is_none());
    }

    #[test]
    fn test_envelope_deserializes_gateway_json() {
        let raw = json!({
            "event": "message",
            "session": "default",
            "payload": {
                "id": "wamid.456",
                "from": "5215559876543@c.us",
                "body": "hola",
                "fromMe": false,
                "hasMedia": false,
                "timestamp": 1753500000
            }
        });
        let envelope: WebhookEnvelope = serde_json::from_value(raw).unwrap();
        assert!(classify(&envelope).is_some());
    }
}
