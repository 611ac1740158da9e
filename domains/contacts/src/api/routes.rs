//! Route definitions for the Contacts domain API

use axum::{routing::get, Router};

use super::handlers::contacts;
use super::middleware::ContactsState;

/// Create all Contacts domain API routes
pub fn routes() -> Router<ContactsState> {
    Router::new()
        .route("/v1/contacts", get(contacts::list_contacts))
        .route(
            "/v1/contacts/{contact_id}",
            get(contacts::get_contact).patch(contacts::update_contact),
        )
}
