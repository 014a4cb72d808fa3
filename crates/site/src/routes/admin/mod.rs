//! Admin pages, gated by [`RequireAdmin`](crate::middleware::RequireAdmin).

pub mod dashboard;
pub mod events;
pub mod registrations;
