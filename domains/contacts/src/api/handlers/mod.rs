//! HTTP handlers for the Contacts domain

pub mod contacts;
