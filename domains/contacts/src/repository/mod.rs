//! Repository implementations for the Contacts domain

pub mod contacts;

pub use contacts::ContactRepository;
