//! Remote data gateway over the `events`, `registrations` and `profiles`
//! tables.
//!
//! Reads and writes return [`Fetched::Live`] when the backend answered. When
//! the call failed, or the backend is not configured, the
//! [`FallbackPolicy`] decides: `Degrade` returns mock or optimistic data as
//! [`Fetched::Degraded`], `Strict` returns the error. A genuine
//! [`GatewayError::NotFound`] is never degraded, and profile operations
//! never degrade at all.

mod events;
mod mock;
mod profiles;
mod registrations;

pub use events::EventsGateway;
pub use mock::{mock_event, optimistic_millis};
pub use profiles::ProfilesGateway;
pub use registrations::{RegistrationFilter, RegistrationsGateway};

use sabo_teens_core::Fetched;
use thiserror::Error;

use crate::config::FallbackPolicy;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Errors returned by the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend is not configured (mock mode).
    #[error("backend not configured")]
    NotConfigured,

    /// The requested row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend call failed.
    #[error("backend error: {0}")]
    Backend(SupabaseError),
}

impl GatewayError {
    /// Classify a backend error, splitting out "no rows".
    #[must_use]
    pub fn from_backend(err: SupabaseError, what: impl Into<String>) -> Self {
        if err.is_not_found() {
            Self::NotFound(what.into())
        } else {
            Self::Backend(err)
        }
    }
}

/// Entry point for table operations.
#[derive(Debug, Clone)]
pub struct Gateway {
    backend: Option<SupabaseClient>,
    policy: FallbackPolicy,
}

impl Gateway {
    /// Create a gateway; `backend = None` is mock mode.
    #[must_use]
    pub const fn new(backend: Option<SupabaseClient>, policy: FallbackPolicy) -> Self {
        Self { backend, policy }
    }

    /// Event operations.
    #[must_use]
    pub const fn events(&self) -> EventsGateway<'_> {
        EventsGateway::new(self)
    }

    /// Registration operations.
    #[must_use]
    pub const fn registrations(&self) -> RegistrationsGateway<'_> {
        RegistrationsGateway::new(self)
    }

    /// Profile operations.
    #[must_use]
    pub const fn profiles(&self) -> ProfilesGateway<'_> {
        ProfilesGateway::new(self)
    }

    /// The configured fallback policy.
    #[must_use]
    pub const fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Whether the backend is configured.
    #[must_use]
    pub const fn is_mock_mode(&self) -> bool {
        self.backend.is_none()
    }

    /// The backend client, if configured.
    #[must_use]
    pub const fn client(&self) -> Option<&SupabaseClient> {
        self.backend.as_ref()
    }

    fn backend(&self) -> Result<&SupabaseClient, GatewayError> {
        self.backend.as_ref().ok_or(GatewayError::NotConfigured)
    }

    /// Apply the fallback policy to the outcome of `operation`.
    fn settle<T>(
        &self,
        operation: &'static str,
        result: Result<T, GatewayError>,
        fallback: impl FnOnce() -> T,
    ) -> Result<Fetched<T>, GatewayError> {
        match result {
            Ok(data) => Ok(Fetched::Live(data)),
            Err(err @ GatewayError::NotFound(_)) => Err(err),
            Err(err) => match self.policy {
                FallbackPolicy::Strict => {
                    tracing::error!(operation, error = %err, "Backend call failed");
                    Err(err)
                }
                FallbackPolicy::Degrade => {
                    tracing::warn!(operation, error = %err, "Backend call failed, degrading");
                    Ok(Fetched::degraded(fallback(), err.to_string()))
                }
            },
        }
    }
}
