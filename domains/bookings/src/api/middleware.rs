//! Bookings domain state

use crate::repository::BookingRepository;

/// Application state for the Bookings domain
#[derive(Clone)]
pub struct BookingsState {
    pub bookings: BookingRepository,
}
