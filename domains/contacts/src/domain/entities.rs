//! Domain entities for the Contacts domain
//!
//! A Contact is the durable customer record, one per unique phone identity.
//! Field updates merge rather than replace: interests are unioned and notes
//! are an append-only timestamped log, so re-applying the same update leaves
//! the record unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use retiro_common::{Error, Result};

/// Contact lifecycle status — matches the `contact_status` DB enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "contact_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Prospect,
    Lead,
    Opportunity,
    Customer,
    Inactive,
    Disqualified,
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactStatus::Prospect => write!(f, "prospect"),
            ContactStatus::Lead => write!(f, "lead"),
            ContactStatus::Opportunity => write!(f, "opportunity"),
            ContactStatus::Customer => write!(f, "customer"),
            ContactStatus::Inactive => write!(f, "inactive"),
            ContactStatus::Disqualified => write!(f, "disqualified"),
        }
    }
}

/// Maximum display name length (varchar(120))
const MAX_NAME_LENGTH: usize = 120;

/// Maximum phone number length (varchar(20))
const MAX_PHONE_LENGTH: usize = 20;

/// Lead score bounds
pub const MAX_LEAD_SCORE: i32 = 100;

/// Contact entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub phone_number: String,
    pub name: String,
    pub email: Option<String>,
    pub status: ContactStatus,
    pub lead_score: i32,
    pub interested_in: Vec<String>,
    pub notes: Option<String>,
    pub opted_in: bool,
    pub is_active: bool,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl Contact {
    /// Create a new contact with status `prospect`
    pub fn new(phone_number: String, name: String) -> Result<Self> {
        if phone_number.is_empty() || !phone_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "Phone number must be digits only, got {:?}",
                phone_number
            )));
        }
        if phone_number.len() > MAX_PHONE_LENGTH {
            return Err(Error::InvalidArgument(format!(
                "Phone number must be at most {} characters",
                MAX_PHONE_LENGTH
            )));
        }
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Contact name cannot be empty".to_string(),
            ));
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(Error::InvalidArgument(format!(
                "Contact name must be at most {} characters",
                MAX_NAME_LENGTH
            )));
        }

        let now = Utc::now();
        Ok(Contact {
            id: Uuid::new_v4(),
            phone_number,
            name,
            email: None,
            status: ContactStatus::default(),
            lead_score: 0,
            interested_in: Vec::new(),
            notes: None,
            opted_in: true,
            is_active: true,
            first_seen_at: now,
            last_seen_at: now,
        })
    }

    /// Merge a partial update into this contact.
    ///
    /// Given fields overwrite scalars; `interested_in` is unioned. Status is
    /// only changed when the lifecycle allows the move (same-status updates
    /// are no-ops), so a repeated identical update never corrupts the record.
    pub fn apply_update(&mut self, update: &ContactUpdate) -> Result<()> {
        if let Some(score) = update.lead_score {
            if !(0..=MAX_LEAD_SCORE).contains(&score) {
                return Err(Error::InvalidArgument(format!(
                    "Lead score must be in [0, {}], got {}",
                    MAX_LEAD_SCORE, score
                )));
            }
        }
        if let Some(ref email) = update.email {
            if !email.contains('@') {
                return Err(Error::InvalidArgument(format!(
                    "Invalid email address: {}",
                    email
                )));
            }
        }
        if let Some(ref name) = update.name {
            if name.trim().is_empty() || name.len() > MAX_NAME_LENGTH {
                return Err(Error::InvalidArgument(
                    "Contact name must be non-empty and at most 120 characters".to_string(),
                ));
            }
        }

        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(ref email) = update.email {
            self.email = Some(email.clone());
        }
        if let Some(score) = update.lead_score {
            self.lead_score = score;
        }
        if let Some(opted_in) = update.opted_in {
            self.opted_in = opted_in;
        }
        for interest in &update.interested_in {
            let interest = interest.trim();
            if !interest.is_empty() && !self.interested_in.iter().any(|i| i == interest) {
                self.interested_in.push(interest.to_string());
            }
        }
        if let Some(status) = update.status {
            if status != self.status {
                if self.status.can_transition_to(status) {
                    self.status = status;
                } else {
                    tracing::warn!(
                        contact_id = %self.id,
                        from = %self.status,
                        to = %status,
                        "Ignoring disallowed contact status change"
                    );
                }
            }
        }

        Ok(())
    }
}

/// Partial update for a contact; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<ContactStatus>,
    pub lead_score: Option<i32>,
    pub interested_in: Vec<String>,
    pub opted_in: Option<bool>,
}

/// Format one line of the append-only notes log
pub fn note_line(at: DateTime<Utc>, note: &str) -> String {
    format!("[{}] {}", at.format("%Y-%m-%d %H:%M UTC"), note.trim())
}
