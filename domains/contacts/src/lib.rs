//! Contacts domain: customer directory, lifecycle state machine

pub mod api;
pub mod directory;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{note_line, Contact, ContactStatus, ContactUpdate};
pub use domain::state::{ContactEvent, ContactLifecycle, StateError};

// Re-export repository types
pub use repository::ContactRepository;

// Re-export the directory
pub use directory::ContactDirectory;

// Re-export API types
pub use api::routes;
pub use api::ContactsState;
