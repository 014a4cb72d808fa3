//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Session restore, password auth and profile provisioning
//! - `notifications` - Per-session notification queue
//! - `registration` - Event registration form and submission
//! - `event_authoring` - Admin event form

pub mod auth;
pub mod event_authoring;
pub mod notifications;
pub mod registration;
