//! Route definitions for the Bookings domain API

use axum::{routing::get, Router};

use super::handlers::bookings;
use super::middleware::BookingsState;

/// Create all Bookings domain API routes
pub fn routes() -> Router<BookingsState> {
    Router::new().route(
        "/v1/contacts/{contact_id}/bookings",
        get(bookings::list_contact_bookings),
    )
}
