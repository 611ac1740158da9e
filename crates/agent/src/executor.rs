//! Deterministic server-side execution of agent actions
//!
//! Every action is independently transactional against the store and safely
//! re-invocable: merges are idempotent, same-status booking updates are
//! no-ops, and only the notes logs are append-only by design.
//!
//! `NotFound`/`InvalidArgument`/`Conflict` never abort the pipeline: they
//! become `ActionOutcome::Rejected`, which the follow-up model pass narrates
//! to the customer. Store and infrastructure errors propagate.

use chrono::{FixedOffset, Utc};
use serde_json::{json, Value};

use retiro_bookings::domain::schedule::parse_scheduled_at;
use retiro_bookings::{Booking, BookingEvent, BookingRepository, BookingStateMachine, BookingStatus};
use retiro_common::{Error, Result};
use retiro_contacts::{note_line, ContactEvent, ContactLifecycle, ContactRepository, ContactStatus, ContactUpdate};
use retiro_conversations::ConversationStore;

use crate::actions::{
    AddContactNotesArgs, AgentAction, AnalyzeCustomerIntentArgs, CreateBookingArgs,
    GetContactBookingsArgs, UpdateBookingStatusArgs, UpdateContactInfoArgs,
};

/// Result of one action execution
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The action ran; the payload is returned to the model verbatim
    Applied(Value),
    /// The action was refused for a narratable reason
    Rejected(String),
}

impl ActionOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

#[derive(Clone)]
pub struct ActionExecutor {
    contacts: ContactRepository,
    store: ConversationStore,
    bookings: BookingRepository,
    business_tz: FixedOffset,
}

impl ActionExecutor {
    pub fn new(
        contacts: ContactRepository,
        store: ConversationStore,
        bookings: BookingRepository,
        business_tz: FixedOffset,
    ) -> Self {
        Self {
            contacts,
            store,
            bookings,
            business_tz,
        }
    }

    /// Execute one action, folding recoverable failures into a rejection.
    pub async fn execute(&self, action: &AgentAction) -> Result<ActionOutcome> {
        match self.try_execute(action).await {
            Ok(value) => Ok(ActionOutcome::Applied(value)),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(action = action.name(), error = %e, "Action rejected");
                Ok(ActionOutcome::Rejected(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn try_execute(&self, action: &AgentAction) -> Result<Value> {
        match action {
            AgentAction::AnalyzeCustomerIntent(args) => self.analyze_customer_intent(args).await,
            AgentAction::CreateBooking(args) => self.create_booking(args).await,
            AgentAction::UpdateBookingStatus(args) => self.update_booking_status(args).await,
            AgentAction::UpdateContactInfo(args) => self.update_contact_info(args).await,
            AgentAction::GetContactBookings(args) => self.get_contact_bookings(args).await,
            AgentAction::AddContactNotes(args) => self.add_contact_notes(args).await,
        }
    }

    async fn analyze_customer_intent(&self, args: &AnalyzeCustomerIntentArgs) -> Result<Value> {
        let mut contact = self
            .contacts
            .find(args.contact_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Contact {} not found", args.contact_id)))?;

        let extracted = args.extracted_info.clone().unwrap_or_default();
        contact.apply_update(&ContactUpdate {
            name: extracted.name.clone(),
            email: extracted.email.clone(),
            status: args.suggested_status,
            lead_score: args.lead_score,
            interested_in: args.interested_in.clone(),
            opted_in: None,
        })?;
        self.contacts.save_profile(&contact).await?;

        let conversation = self
            .store
            .find_active(contact.id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No active conversation for contact {}",
                    contact.id
                ))
            })?;

        let mut context = conversation.context.0.clone();
        context.last_intent = Some(args.intent);
        context.needs_human_agent = args.needs_human_agent;
        if extracted.name.is_some() {
            context.extracted_name = extracted.name;
        }
        if extracted.email.is_some() {
            context.extracted_email = extracted.email;
        }
        for interest in &args.interested_in {
            let interest = interest.trim();
            if !interest.is_empty() && !context.interested_in.iter().any(|i| i == interest) {
                context.interested_in.push(interest.to_string());
            }
        }
        self.store.update_context(conversation.id, &context).await?;

        Ok(json!({
            "contactId": contact.id,
            "status": contact.status,
            "leadScore": contact.lead_score,
            "intent": args.intent,
            "needsHumanAgent": args.needs_human_agent,
        }))
    }

    async fn create_booking(&self, args: &CreateBookingArgs) -> Result<Value> {
        let contact = self
            .contacts
            .find(args.contact_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Contact {} not found", args.contact_id)))?;

        let scheduled_at = parse_scheduled_at(&args.date_time, self.business_tz)?;

        let booking = Booking::new(
            contact.id,
            args.service_name.clone(),
            scheduled_at,
            args.notes.clone(),
        )?;
        let created = self.bookings.create(&booking).await?;

        // Cascade: a new booking opens an opportunity for the contact.
        let contact_status =
            self.advance_contact(&contact.id, contact.status, ContactEvent::OpenOpportunity)
                .await?;

        tracing::info!(
            booking_id = %created.id,
            contact_id = %contact.id,
            service = %created.service_name,
            "Created booking"
        );

        Ok(json!({
            "bookingId": created.id,
            "serviceName": created.service_name,
            "scheduledAt": created.scheduled_at,
            "status": created.status,
            "contactStatus": contact_status,
        }))
    }

    async fn update_booking_status(&self, args: &UpdateBookingStatusArgs) -> Result<Value> {
        let booking = self
            .bookings
            .find(args.booking_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Booking {} not found", args.booking_id)))?;

        if booking.contact_id != args.contact_id {
            return Err(Error::Conflict(format!(
                "Booking {} does not belong to contact {}",
                args.booking_id, args.contact_id
            )));
        }

        // Re-invocation with the same target is a no-op, not a corruption.
        if booking.status == args.status {
            return Ok(json!({
                "bookingId": booking.id,
                "status": booking.status,
                "changed": false,
            }));
        }

        let event = BookingEvent::for_target(args.status).ok_or_else(|| {
            Error::InvalidArgument("A booking cannot move back to pending".to_string())
        })?;
        let next = BookingStateMachine::transition(booking.status, event).map_err(|e| {
            Error::Conflict(format!("Booking {}: {}", booking.id, e))
        })?;

        let updated = self
            .bookings
            .update_status(booking.id, next, args.notes.as_deref())
            .await?
            .ok_or_else(|| Error::NotFound(format!("Booking {} not found", booking.id)))?;

        let contact = self
            .contacts
            .find(args.contact_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Contact {} not found", args.contact_id)))?;

        // Cascade onto the owning contact, as two sequential idempotent writes.
        let contact_status = match next {
            BookingStatus::Completed => {
                self.advance_contact(&contact.id, contact.status, ContactEvent::ConvertToCustomer)
                    .await?
            }
            BookingStatus::Cancelled | BookingStatus::NoShow => {
                let open = self.bookings.count_open(contact.id).await?;
                if open == 0 {
                    self.advance_contact(&contact.id, contact.status, ContactEvent::RevertToLead)
                        .await?
                } else {
                    contact.status
                }
            }
            _ => contact.status,
        };

        tracing::info!(
            booking_id = %updated.id,
            from = %booking.status,
            to = %updated.status,
            "Updated booking status"
        );

        Ok(json!({
            "bookingId": updated.id,
            "previousStatus": booking.status,
            "status": updated.status,
            "contactStatus": contact_status,
            "changed": true,
        }))
    }

    async fn update_contact_info(&self, args: &UpdateContactInfoArgs) -> Result<Value> {
        let mut contact = self
            .contacts
            .find(args.contact_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Contact {} not found", args.contact_id)))?;

        contact.apply_update(&ContactUpdate {
            name: args.name.clone(),
            email: args.email.clone(),
            status: None,
            lead_score: None,
            interested_in: args.interested_in.clone(),
            opted_in: args.opted_in,
        })?;
        self.contacts.save_profile(&contact).await?;

        Ok(json!({
            "contactId": contact.id,
            "name": contact.name,
            "email": contact.email,
            "interestedIn": contact.interested_in,
        }))
    }

    async fn get_contact_bookings(&self, args: &GetContactBookingsArgs) -> Result<Value> {
        self.contacts
            .find(args.contact_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Contact {} not found", args.contact_id)))?;

        let bookings = self
            .bookings
            .list_by_contact(args.contact_id, args.status)
            .await?;

        let listed: Vec<Value> = bookings
            .iter()
            .map(|b| {
                json!({
                    "bookingId": b.id,
                    "serviceName": b.service_name,
                    "scheduledAt": b.scheduled_at,
                    "status": b.status,
                    "notes": b.notes,
                })
            })
            .collect();

        Ok(json!({ "bookings": listed }))
    }

    async fn add_contact_notes(&self, args: &AddContactNotesArgs) -> Result<Value> {
        let appended = self
            .contacts
            .append_notes(args.contact_id, &note_line(Utc::now(), &args.notes))
            .await?;
        if !appended {
            return Err(Error::NotFound(format!(
                "Contact {} not found",
                args.contact_id
            )));
        }

        Ok(json!({ "contactId": args.contact_id, "notesAdded": true }))
    }

    /// Drive the contact lifecycle with `event`, treating already-there and
    /// disallowed moves as no-ops so cascades stay idempotent.
    async fn advance_contact(
        &self,
        contact_id: &uuid::Uuid,
        current: ContactStatus,
        event: ContactEvent,
    ) -> Result<ContactStatus> {
        let target = match event {
            ContactEvent::Qualify | ContactEvent::RevertToLead => ContactStatus::Lead,
            ContactEvent::OpenOpportunity => ContactStatus::Opportunity,
            ContactEvent::ConvertToCustomer => ContactStatus::Customer,
            ContactEvent::Deactivate => ContactStatus::Inactive,
            ContactEvent::Disqualify => ContactStatus::Disqualified,
        };
        if current == target {
            return Ok(current);
        }

        match ContactLifecycle::transition(current, event) {
            Ok(next) => {
                let mut contact = self
                    .contacts
                    .find(*contact_id)
                    .await?
                    .ok_or_else(|| Error::NotFound(format!("Contact {} not found", contact_id)))?;
                contact.status = next;
                self.contacts.save_profile(&contact).await?;
                Ok(next)
            }
            Err(e) => {
                tracing::warn!(
                    contact_id = %contact_id,
                    status = %current,
                    event = %event,
                    error = %e,
                    "Skipping contact lifecycle cascade"
                );
                Ok(current)
            }
        }
    }
}
