//! Sabo Teens Core - Shared domain types.
//!
//! This crate provides the types used by the ministry site:
//! - events, registrations and profiles as stored in the hosted backend
//! - the tagged [`Fetched`] result that separates live data from degraded data
//! - field-level validation errors for the site's forms
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no HTTP clients,
//! no session handling. CSV export writes into an in-memory buffer.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, statuses and the domain records
//! - [`listing`] - In-memory filtering of event and registration lists
//! - [`stats`] - Admin dashboard aggregates
//! - [`export`] - Registration CSV export

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod export;
pub mod listing;
pub mod stats;
pub mod types;

pub use types::*;
