//! Repository implementations for the Bookings domain

pub mod bookings;

pub use bookings::BookingRepository;
