//! State machine for booking status transitions
//!
//! pending → confirmed → completed, with cancelled/no-show exits.
//! completed, cancelled, and no_show are terminal.

pub use retiro_common::StateError;

use crate::domain::entities::BookingStatus;

impl BookingStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [BookingStatus] {
        match self {
            Self::Pending => &[
                Self::Confirmed,
                Self::Cancelled,
                Self::Completed,
                Self::NoShow,
            ],
            Self::Confirmed => &[Self::Completed, Self::Cancelled, Self::NoShow],
            Self::Completed => &[],
            Self::Cancelled => &[],
            Self::NoShow => &[],
        }
    }
}

/// Events that trigger booking state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookingEvent {
    /// The customer or staff confirmed the reservation
    Confirm,
    /// The reservation was called off
    Cancel,
    /// The service was delivered
    Complete,
    /// The customer did not show up
    MarkNoShow,
}

impl BookingEvent {
    /// The event that drives a booking to `target`
    pub fn for_target(target: BookingStatus) -> Option<BookingEvent> {
        match target {
            BookingStatus::Confirmed => Some(Self::Confirm),
            BookingStatus::Cancelled => Some(Self::Cancel),
            BookingStatus::Completed => Some(Self::Complete),
            BookingStatus::NoShow => Some(Self::MarkNoShow),
            BookingStatus::Pending => None,
        }
    }
}

impl std::fmt::Display for BookingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirm => write!(f, "confirm"),
            Self::Cancel => write!(f, "cancel"),
            Self::Complete => write!(f, "complete"),
            Self::MarkNoShow => write!(f, "mark_no_show"),
        }
    }
}

/// Booking state machine
pub struct BookingStateMachine;

impl BookingStateMachine {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(
        current: BookingStatus,
        event: BookingEvent,
    ) -> Result<BookingStatus, StateError> {
        // Check for terminal state
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            // From Pending
            (BookingStatus::Pending, BookingEvent::Confirm) => BookingStatus::Confirmed,
            (BookingStatus::Pending, BookingEvent::Cancel) => BookingStatus::Cancelled,
            (BookingStatus::Pending, BookingEvent::Complete) => BookingStatus::Completed,
            (BookingStatus::Pending, BookingEvent::MarkNoShow) => BookingStatus::NoShow,

            // From Confirmed
            (BookingStatus::Confirmed, BookingEvent::Complete) => BookingStatus::Completed,
            (BookingStatus::Confirmed, BookingEvent::Cancel) => BookingStatus::Cancelled,
            (BookingStatus::Confirmed, BookingEvent::MarkNoShow) => BookingStatus::NoShow,

            // Invalid transitions
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: "unknown".to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: BookingStatus, event: BookingEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
