//! Contact API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use retiro_common::{Error, Pagination, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::ContactsState;
use crate::domain::entities::{Contact, ContactStatus, ContactUpdate};

/// Contact response DTO
#[derive(Debug, Serialize)]
pub struct ContactResponse {
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

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            phone_number: c.phone_number,
            name: c.name,
            email: c.email,
            status: c.status,
            lead_score: c.lead_score,
            interested_in: c.interested_in,
            notes: c.notes,
            opted_in: c.opted_in,
            is_active: c.is_active,
            first_seen_at: c.first_seen_at,
            last_seen_at: c.last_seen_at,
        }
    }
}

/// Query parameters for listing contacts
#[derive(Debug, Deserialize)]
pub struct ListContactsQuery {
    pub status: Option<ContactStatus>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListContactsQuery {
    fn pagination(&self) -> Pagination {
        Pagination {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// Request for updating a contact
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContactRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub status: Option<ContactStatus>,
    #[validate(range(min = 0, max = 100))]
    pub lead_score: Option<i32>,
    #[serde(default)]
    pub interested_in: Vec<String>,
    pub opted_in: Option<bool>,
}

/// List contacts
pub async fn list_contacts(
    State(state): State<ContactsState>,
    Query(query): Query<ListContactsQuery>,
) -> Result<Json<Vec<ContactResponse>>> {
    let pagination = query.pagination();
    let contacts = state
        .contacts
        .list(query.status, pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

/// Get a single contact
pub async fn get_contact(
    State(state): State<ContactsState>,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<ContactResponse>> {
    let contact = state
        .contacts
        .find(contact_id)
        .await?
        .ok_or_else(|| Error::NotFound("Contact not found".to_string()))?;

    Ok(Json(contact.into()))
}

/// Merge a partial update into a contact
pub async fn update_contact(
    State(state): State<ContactsState>,
    Path(contact_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateContactRequest>,
) -> Result<Json<ContactResponse>> {
    let mut contact = state
        .contacts
        .find(contact_id)
        .await?
        .ok_or_else(|| Error::NotFound("Contact not found".to_string()))?;

    contact.apply_update(&ContactUpdate {
        name: req.name,
        email: req.email,
        status: req.status,
        lead_score: req.lead_score,
        interested_in: req.interested_in,
        opted_in: req.opted_in,
    })?;

    let updated = state
        .contacts
        .save_profile(&contact)
        .await?
        .ok_or_else(|| Error::NotFound("Contact not found".to_string()))?;

    Ok(Json(updated.into()))
}
