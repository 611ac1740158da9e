//! Booking API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use retiro_common::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::middleware::BookingsState;
use crate::domain::entities::{Booking, BookingStatus};

/// Booking response DTO
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub service_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            contact_id: b.contact_id,
            service_name: b.service_name,
            scheduled_at: b.scheduled_at,
            status: b.status,
            notes: b.notes,
            payment_id: b.payment_id,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Query parameters for listing bookings
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub status: Option<BookingStatus>,
}

/// List bookings for a contact, ascending by scheduled date
pub async fn list_contact_bookings(
    State(state): State<BookingsState>,
    Path(contact_id): Path<Uuid>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>> {
    let bookings = state
        .bookings
        .list_by_contact(contact_id, query.status)
        .await?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
