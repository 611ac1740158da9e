//! Booking repository

use crate::domain::entities::{Booking, BookingStatus};
use retiro_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find booking by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, contact_id, service_name, scheduled_at, status,
                   notes, payment_id, created_at, updated_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    /// Create a new booking
    pub async fn create(&self, booking: &Booking) -> Result<Booking> {
        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, contact_id, service_name, scheduled_at, status,
                notes, payment_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, contact_id, service_name, scheduled_at, status,
                      notes, payment_id, created_at, updated_at
            "#,
        )
        .bind(booking.id)
        .bind(booking.contact_id)
        .bind(&booking.service_name)
        .bind(booking.scheduled_at)
        .bind(booking.status)
        .bind(&booking.notes)
        .bind(&booking.payment_id)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// List bookings for a contact, ascending by scheduled date,
    /// optionally filtering by status
    pub async fn list_by_contact(
        &self,
        contact_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>> {
        let bookings = match status {
            Some(s) => {
                sqlx::query_as::<_, Booking>(
                    r#"
                    SELECT id, contact_id, service_name, scheduled_at, status,
                           notes, payment_id, created_at, updated_at
                    FROM bookings
                    WHERE contact_id = $1 AND status = $2
                    ORDER BY scheduled_at ASC
                    "#,
                )
                .bind(contact_id)
                .bind(s)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Booking>(
                    r#"
                    SELECT id, contact_id, service_name, scheduled_at, status,
                           notes, payment_id, created_at, updated_at
                    FROM bookings
                    WHERE contact_id = $1
                    ORDER BY scheduled_at ASC
                    "#,
                )
                .bind(contact_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(bookings)
    }

    /// Update booking status, appending to the notes log when given
    pub async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        notes: Option<&str>,
    ) -> Result<Option<Booking>> {
        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET
                status = $2,
                notes = CASE
                    WHEN $3::text IS NULL THEN notes
                    WHEN notes IS NULL THEN $3
                    ELSE notes || E'\n' || $3
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, contact_id, service_name, scheduled_at, status,
                      notes, payment_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Count a contact's open (pending or confirmed) bookings
    pub async fn count_open(&self, contact_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE contact_id = $1 AND status IN ('pending', 'confirmed')
            "#,
        )
        .bind(contact_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
