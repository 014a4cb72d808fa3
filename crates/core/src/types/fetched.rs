//! Tagged result of a backend call that may have fallen back to local data.

/// Data returned by the gateway, tagged with where it came from.
///
/// Callers that only need the data use [`Fetched::into_inner`]; pages that
/// must tell the visitor they are looking at sample data check
/// [`Fetched::is_degraded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The backend answered.
    Live(T),
    /// The backend failed or is not configured; `data` is mock or optimistic.
    Degraded {
        /// Fallback data.
        data: T,
        /// Why the backend could not be used.
        reason: String,
    },
}

impl<T> Fetched<T> {
    /// Wrap fallback data with the failure that caused it.
    pub fn degraded(data: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            data,
            reason: reason.into(),
        }
    }

    /// Whether the data came from a fallback.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Borrow the data regardless of origin.
    #[must_use]
    pub const fn data(&self) -> &T {
        match self {
            Self::Live(data) | Self::Degraded { data, .. } => data,
        }
    }

    /// Take the data regardless of origin.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Live(data) | Self::Degraded { data, .. } => data,
        }
    }

    /// Failure reason for degraded data.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Live(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Transform the data, keeping the tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Live(data) => Fetched::Live(f(data)),
            Self::Degraded { data, reason } => Fetched::Degraded {
                data: f(data),
                reason,
            },
        }
    }
}
