//! Contact directory: resolves a gateway chat identity to a durable contact
//!
//! First contact from an unknown phone creates a `prospect` record, asking the
//! gateway for a display name on a best-effort basis. Concurrent first
//! contacts race on the unique phone key; the loser of the race re-fetches the
//! winner's row, so repeated resolves never produce a second contact.

use std::sync::Arc;

use retiro_common::{Error, Result};
use retiro_gateway::ChatGateway;

use crate::domain::entities::Contact;
use crate::repository::contacts::is_unique_violation;
use crate::repository::ContactRepository;

/// Derive the bare phone number from a gateway identity like
/// `"5215551234567@c.us"`.
pub fn phone_from_chat_id(chat_id: &str) -> &str {
    chat_id.split('@').next().unwrap_or(chat_id)
}

/// Fallback display name when the gateway has none
pub fn placeholder_name(phone_number: &str) -> String {
    let tail = if phone_number.len() > 4 {
        &phone_number[phone_number.len() - 4..]
    } else {
        phone_number
    };
    format!("WhatsApp {}", tail)
}

#[derive(Clone)]
pub struct ContactDirectory {
    repo: ContactRepository,
    gateway: Arc<dyn ChatGateway>,
}

impl ContactDirectory {
    pub fn new(repo: ContactRepository, gateway: Arc<dyn ChatGateway>) -> Self {
        Self { repo, gateway }
    }

    /// Resolve a chat identity to a contact, creating one on first contact.
    ///
    /// Idempotent under concurrent calls for the same phone number.
    pub async fn resolve(&self, chat_id: &str) -> Result<Contact> {
        let phone = phone_from_chat_id(chat_id);

        if let Some(contact) = self.repo.find_by_phone(phone).await? {
            self.repo.touch_last_seen(contact.id).await?;
            return Ok(contact);
        }

        // Best-effort display name from the gateway; a transport failure here
        // must not block first contact.
        let name = match self.gateway.fetch_contact(chat_id).await {
            Ok(Some(profile)) => profile
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| placeholder_name(phone)),
            Ok(None) => placeholder_name(phone),
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, error = %e, "Gateway contact lookup failed");
                placeholder_name(phone)
            }
        };

        let contact = Contact::new(phone.to_string(), name)?;
        match self.repo.create(&contact).await {
            Ok(created) => {
                tracing::info!(contact_id = %created.id, phone = %phone, "Created new contact");
                Ok(created)
            }
            Err(Error::Database(ref e)) if is_unique_violation(e) => {
                // A concurrent resolve won the race; use its row.
                let existing = self.repo.find_by_phone(phone).await?.ok_or_else(|| {
                    Error::Internal(format!(
                        "Contact for {} vanished after unique violation",
                        phone
                    ))
                })?;
                self.repo.touch_last_seen(existing.id).await?;
                Ok(existing)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_from_chat_id() {
        assert_eq!(phone_from_chat_id("5215551234567@c.us"), "5215551234567");
        assert_eq!(phone_from_chat_id("5215551234567"), "5215551234567");
        assert_eq!(phone_from_chat_id("@c.us"), "");
    }

    #[test]
    fn test_placeholder_name_uses_phone_tail() {
        assert_eq!(placeholder_name("5215551234567"), "WhatsApp 4567");
        assert_eq!(placeholder_name("123"), "WhatsApp 123");
    }
}
