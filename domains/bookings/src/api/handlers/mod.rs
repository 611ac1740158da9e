//! HTTP handlers for the Bookings domain

pub mod bookings;
