//! Core types for the ministry site.
//!
//! This module provides type-safe wrappers and the records exchanged with the
//! hosted backend.

pub mod email;
pub mod event;
pub mod fetched;
pub mod id;
pub mod profile;
pub mod registration;
pub mod status;
pub mod validation;

pub use email::{Email, EmailError};
pub use event::{Event, EventDraft, EventSummary};
pub use fetched::Fetched;
pub use id::*;
pub use profile::{Profile, ProfileSummary, ProfileUpdate};
pub use registration::{
    Affiliation, ExportRow, NewRegistration, Registrant, Registration, RegistrationRecord,
};
pub use status::*;
pub use validation::{FieldErrors, is_valid_phone};
