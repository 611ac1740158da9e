//! API layer for the Contacts domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ContactsState;
pub use routes::routes;
