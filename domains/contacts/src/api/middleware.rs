//! Contacts domain state

use crate::repository::ContactRepository;

/// Application state for the Contacts domain
#[derive(Clone)]
pub struct ContactsState {
    pub contacts: ContactRepository,
}
