//! Domain entities for the Bookings domain
//!
//! A Booking is a reservation request extracted from dialogue. It is created
//! through the `createBooking` action only, and its status moves exclusively
//! through the state machine in `state.rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use retiro_common::{Error, Result};

/// Booking status — matches the `booking_status` DB enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl BookingStatus {
    /// A booking still counted as an open opportunity for the contact
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::NoShow => write!(f, "no_show"),
        }
    }
}

/// Maximum service name length (varchar(200))
const MAX_SERVICE_NAME_LENGTH: usize = 200;

/// Booking entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
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

impl Booking {
    /// Create a new pending booking
    pub fn new(
        contact_id: Uuid,
        service_name: String,
        scheduled_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Self> {
        if service_name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Service name cannot be empty".to_string(),
            ));
        }
        if service_name.len() > MAX_SERVICE_NAME_LENGTH {
            return Err(Error::InvalidArgument(format!(
                "Service name must be at most {} characters",
                MAX_SERVICE_NAME_LENGTH
            )));
        }

        let now = Utc::now();
        Ok(Booking {
            id: Uuid::new_v4(),
            contact_id,
            service_name,
            scheduled_at,
            status: BookingStatus::default(),
            notes,
            payment_id: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_display() {
        assert_eq!(BookingStatus::Pending.to_string(), "pending");
        assert_eq!(BookingStatus::Confirmed.to_string(), "confirmed");
        assert_eq!(BookingStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(BookingStatus::Completed.to_string(), "completed");
        assert_eq!(BookingStatus::NoShow.to_string(), "no_show");
    }

    #[test]
    fn test_booking_status_serialization_snake_case() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::NoShow).unwrap(),
            "\"no_show\""
        );
        let parsed: BookingStatus = serde_json::from_str("\"confirmed\"").unwrap();
        assert_eq!(parsed, BookingStatus::Confirmed);
    }

    #[test]
    fn test_booking_status_default_is_pending() {
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
    }

    #[test]
    fn test_open_statuses() {
        assert!(BookingStatus::Pending.is_open());
        assert!(BookingStatus::Confirmed.is_open());
        assert!(!BookingStatus::Cancelled.is_open());
        assert!(!BookingStatus::Completed.is_open());
        assert!(!BookingStatus::NoShow.is_open());
    }

    #[test]
    fn test_new_booking_defaults() {
        let contact_id = Uuid::new_v4();
        let booking = Booking::new(
            contact_id,
            "Boda espiritual".to_string(),
            Utc::now(),
            Some("26 de julio".to_string()),
        )
        .unwrap();

        assert_eq!(booking.contact_id, contact_id);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.payment_id.is_none());
        assert_eq!(booking.notes.as_deref(), Some("26 de julio"));
    }

    #[test]
    fn test_new_booking_rejects_blank_service() {
        let result = Booking::new(Uuid::new_v4(), "  ".to_string(), Utc::now(), None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_new_booking_rejects_oversized_service() {
        let result = Booking::new(Uuid::new_v4(), "x".repeat(201), Utc::now(), None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_booking_serialization_roundtrip() {
        let booking =
            Booking::new(Uuid::new_v4(), "Temazcal".to_string(), Utc::now(), None).unwrap();
        let json = serde_json::to_string(&booking).unwrap();
        let deserialized: Booking = serde_json::from_str(&json).unwrap();
        assert_eq!(booking, deserialized);
    }
}
