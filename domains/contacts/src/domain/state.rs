//! State machine for the contact lifecycle
//!
//! Funnel: prospect → lead → opportunity → customer, with side states
//! inactive/disqualified. A cancelled or no-show booking can revert an
//! opportunity back to lead, and a returning customer opens a fresh
//! opportunity.

pub use retiro_common::StateError;

use crate::domain::entities::ContactStatus;

impl ContactStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Inactive | Self::Disqualified)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [ContactStatus] {
        match self {
            Self::Prospect => &[
                Self::Lead,
                Self::Opportunity,
                Self::Customer,
                Self::Inactive,
                Self::Disqualified,
            ],
            Self::Lead => &[
                Self::Opportunity,
                Self::Customer,
                Self::Inactive,
                Self::Disqualified,
            ],
            Self::Opportunity => &[
                Self::Lead,
                Self::Customer,
                Self::Inactive,
                Self::Disqualified,
            ],
            Self::Customer => &[Self::Opportunity, Self::Inactive],
            Self::Inactive => &[],
            Self::Disqualified => &[],
        }
    }

    /// Check whether a direct move to `target` is allowed
    pub fn can_transition_to(&self, target: ContactStatus) -> bool {
        self.valid_transitions().contains(&target)
    }
}

/// Events that trigger contact lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactEvent {
    /// Intent analysis qualified the prospect
    Qualify,
    /// A booking was created
    OpenOpportunity,
    /// A booking was completed
    ConvertToCustomer,
    /// The last open booking was cancelled or no-showed
    RevertToLead,
    /// The contact went dormant
    Deactivate,
    /// The contact is not a fit
    Disqualify,
}

impl std::fmt::Display for ContactEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Qualify => write!(f, "qualify"),
            Self::OpenOpportunity => write!(f, "open_opportunity"),
            Self::ConvertToCustomer => write!(f, "convert_to_customer"),
            Self::RevertToLead => write!(f, "revert_to_lead"),
            Self::Deactivate => write!(f, "deactivate"),
            Self::Disqualify => write!(f, "disqualify"),
        }
    }
}

/// Contact lifecycle state machine
pub struct ContactLifecycle;

impl ContactLifecycle {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(
        current: ContactStatus,
        event: ContactEvent,
    ) -> Result<ContactStatus, StateError> {
        // Check for terminal state
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            // From Prospect
            (ContactStatus::Prospect, ContactEvent::Qualify) => ContactStatus::Lead,
            (ContactStatus::Prospect, ContactEvent::OpenOpportunity) => ContactStatus::Opportunity,
            (ContactStatus::Prospect, ContactEvent::ConvertToCustomer) => ContactStatus::Customer,

            // From Lead
            (ContactStatus::Lead, ContactEvent::OpenOpportunity) => ContactStatus::Opportunity,
            (ContactStatus::Lead, ContactEvent::ConvertToCustomer) => ContactStatus::Customer,

            // From Opportunity
            (ContactStatus::Opportunity, ContactEvent::ConvertToCustomer) => {
                ContactStatus::Customer
            }
            (ContactStatus::Opportunity, ContactEvent::RevertToLead) => ContactStatus::Lead,

            // A returning customer opens a new sales cycle
            (ContactStatus::Customer, ContactEvent::OpenOpportunity) => ContactStatus::Opportunity,

            // Side states reachable from any non-terminal state
            (_, ContactEvent::Deactivate) => ContactStatus::Inactive,
            (ContactStatus::Customer, ContactEvent::Disqualify) => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: ContactStatus::Disqualified.to_string(),
                    event: event.to_string(),
                });
            }
            (_, ContactEvent::Disqualify) => ContactStatus::Disqualified,

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
    pub fn can_transition(current: ContactStatus, event: ContactEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prospect_qualifies_to_lead() {
        let result = ContactLifecycle::transition(ContactStatus::Prospect, ContactEvent::Qualify);
        assert_eq!(result, Ok(ContactStatus::Lead));
    }

    #[test]
    fn test_booking_opens_opportunity_from_prospect_and_lead() {
        assert_eq!(
            ContactLifecycle::transition(ContactStatus::Prospect, ContactEvent::OpenOpportunity),
            Ok(ContactStatus::Opportunity)
        );
        assert_eq!(
            ContactLifecycle::transition(ContactStatus::Lead, ContactEvent::OpenOpportunity),
            Ok(ContactStatus::Opportunity)
        );
    }

    #[test]
    fn test_completed_booking_converts_to_customer() {
        assert_eq!(
            ContactLifecycle::transition(
                ContactStatus::Opportunity,
                ContactEvent::ConvertToCustomer
            ),
            Ok(ContactStatus::Customer)
        );
        assert_eq!(
            ContactLifecycle::transition(ContactStatus::Lead, ContactEvent::ConvertToCustomer),
            Ok(ContactStatus::Customer)
        );
    }

    #[test]
    fn test_cancelled_last_booking_reverts_to_lead() {
        assert_eq!(
            ContactLifecycle::transition(ContactStatus::Opportunity, ContactEvent::RevertToLead),
            Ok(ContactStatus::Lead)
        );
    }

    #[test]
    fn test_returning_customer_opens_new_opportunity() {
        assert_eq!(
            ContactLifecycle::transition(ContactStatus::Customer, ContactEvent::OpenOpportunity),
            Ok(ContactStatus::Opportunity)
        );
    }

    #[test]
    fn test_customer_cannot_revert_to_lead() {
        let result =
            ContactLifecycle::transition(ContactStatus::Customer, ContactEvent::RevertToLead);
        assert!(matches!(result, Err(StateError::InvalidTransition { .. })));
    }

    #[test]
    fn test_customer_cannot_be_disqualified() {
        let result =
            ContactLifecycle::transition(ContactStatus::Customer, ContactEvent::Disqualify);
        assert!(matches!(result, Err(StateError::InvalidTransition { .. })));
    }

    #[test]
    fn test_terminal_states_reject_all_events() {
        for status in [ContactStatus::Inactive, ContactStatus::Disqualified] {
            let result = ContactLifecycle::transition(status, ContactEvent::OpenOpportunity);
            assert!(matches!(result, Err(StateError::TerminalState(_))));
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(ContactStatus::Inactive.is_terminal());
        assert!(ContactStatus::Disqualified.is_terminal());
        assert!(!ContactStatus::Prospect.is_terminal());
        assert!(!ContactStatus::Customer.is_terminal());
    }

    #[test]
    fn test_valid_transitions_match_transition_table() {
        // Every target listed by valid_transitions is reachable via some event
        let events = [
            ContactEvent::Qualify,
            ContactEvent::OpenOpportunity,
            ContactEvent::ConvertToCustomer,
            ContactEvent::RevertToLead,
            ContactEvent::Deactivate,
            ContactEvent::Disqualify,
        ];
        for from in [
            ContactStatus::Prospect,
            ContactStatus::Lead,
            ContactStatus::Opportunity,
            ContactStatus::Customer,
        ] {
            for target in from.valid_transitions() {
                let reachable = events
                    .iter()
                    .any(|e| ContactLifecycle::transition(from, *e) == Ok(*target));
                assert!(reachable, "{from} -> {target} has no event");
            }
        }
    }

    #[test]
    fn test_can_transition_to() {
        assert!(ContactStatus::Prospect.can_transition_to(ContactStatus::Lead));
        assert!(!ContactStatus::Customer.can_transition_to(ContactStatus::Prospect));
        assert!(!ContactStatus::Inactive.can_transition_to(ContactStatus::Prospect));
    }
}
