//! Contact repository

use crate::domain::entities::{Contact, ContactStatus};
use retiro_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find contact by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, phone_number, name, email, status, lead_score,
                   interested_in, notes, opted_in, is_active,
                   first_seen_at, last_seen_at
            FROM contacts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Find contact by phone number (the unique business key)
    pub async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, phone_number, name, email, status, lead_score,
                   interested_in, notes, opted_in, is_active,
                   first_seen_at, last_seen_at
            FROM contacts
            WHERE phone_number = $1
            "#,
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Create a new contact
    pub async fn create(&self, contact: &Contact) -> Result<Contact> {
        let created = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (
                id, phone_number, name, email, status, lead_score,
                interested_in, notes, opted_in, is_active,
                first_seen_at, last_seen_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, phone_number, name, email, status, lead_score,
                      interested_in, notes, opted_in, is_active,
                      first_seen_at, last_seen_at
            "#,
        )
        .bind(contact.id)
        .bind(&contact.phone_number)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(contact.status)
        .bind(contact.lead_score)
        .bind(&contact.interested_in)
        .bind(&contact.notes)
        .bind(contact.opted_in)
        .bind(contact.is_active)
        .bind(contact.first_seen_at)
        .bind(contact.last_seen_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Refresh the last-seen timestamp
    pub async fn touch_last_seen(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE contacts SET last_seen_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Persist the mutable profile fields of an already-merged contact
    pub async fn save_profile(&self, contact: &Contact) -> Result<Option<Contact>> {
        let updated = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts SET
                name = $2,
                email = $3,
                status = $4,
                lead_score = $5,
                interested_in = $6,
                opted_in = $7,
                is_active = $8,
                last_seen_at = NOW()
            WHERE id = $1
            RETURNING id, phone_number, name, email, status, lead_score,
                      interested_in, notes, opted_in, is_active,
                      first_seen_at, last_seen_at
            "#,
        )
        .bind(contact.id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(contact.status)
        .bind(contact.lead_score)
        .bind(&contact.interested_in)
        .bind(contact.opted_in)
        .bind(contact.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Append one line to the append-only notes log
    pub async fn append_notes(&self, id: Uuid, line: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE contacts SET
                notes = CASE WHEN notes IS NULL THEN $2
                        ELSE notes || E'\n' || $2 END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(line)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List contacts, optionally filtering by status, newest activity first
    pub async fn list(
        &self,
        status: Option<ContactStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Contact>> {
        let contacts = match status {
            Some(s) => {
                sqlx::query_as::<_, Contact>(
                    r#"
                    SELECT id, phone_number, name, email, status, lead_score,
                           interested_in, notes, opted_in, is_active,
                           first_seen_at, last_seen_at
                    FROM contacts
                    WHERE status = $1
                    ORDER BY last_seen_at DESC
                    OFFSET $2 LIMIT $3
                    "#,
                )
                .bind(s)
                .bind(offset)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Contact>(
                    r#"
                    SELECT id, phone_number, name, email, status, lead_score,
                           interested_in, notes, opted_in, is_active,
                           first_seen_at, last_seen_at
                    FROM contacts
                    ORDER BY last_seen_at DESC
                    OFFSET $1 LIMIT $2
                    "#,
                )
                .bind(offset)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(contacts)
    }
}

/// Whether a sqlx error is a unique-constraint violation (a concurrent
/// writer inserted the same key first).
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db) if db.is_unique_violation()
    )
}
