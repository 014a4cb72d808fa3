//! Application state shared across handlers.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::config::SiteConfig;
use crate::gateway::Gateway;
use crate::services::auth::{AuthEvents, ProfileDirectory, spawn_profile_listener};
use crate::supabase::SupabaseClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Owns the gateway, the auth event hub and the
/// profile listener task.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    gateway: Gateway,
    auth_events: AuthEvents,
    profiles: ProfileDirectory,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    /// Create the application state and start the profile listener.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        let backend = config.supabase.as_ref().map(SupabaseClient::new);
        if backend.is_none() {
            tracing::warn!("Backend not configured, running in mock mode");
        }
        let gateway = Gateway::new(backend, config.fallback);
        let auth_events = AuthEvents::new();
        let profiles = ProfileDirectory::new();
        let listener = spawn_profile_listener(&auth_events, profiles.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                auth_events,
                profiles,
                listener: Mutex::new(Some(listener)),
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the data gateway.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.inner.gateway
    }

    /// Get a reference to the auth event hub.
    #[must_use]
    pub fn auth_events(&self) -> &AuthEvents {
        &self.inner.auth_events
    }

    /// Get a reference to the profile version directory.
    #[must_use]
    pub fn profiles(&self) -> &ProfileDirectory {
        &self.inner.profiles
    }

    /// Whether the backend is unconfigured.
    #[must_use]
    pub fn is_mock_mode(&self) -> bool {
        self.inner.gateway.is_mock_mode()
    }

    /// Stop the profile listener. Safe to call more than once.
    pub fn shutdown(&self) {
        let handle = match self.inner.listener.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!("Profile listener stopped");
        }
    }
}
