//! Bookings domain: reservations, status state machine, schedule parsing

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Booking, BookingStatus};
pub use domain::schedule::parse_scheduled_at;
pub use domain::state::{BookingEvent, BookingStateMachine, StateError};

// Re-export repository types
pub use repository::BookingRepository;

// Re-export API types
pub use api::routes;
pub use api::BookingsState;
