//! Authentication service.
//!
//! Password authentication against the hosted auth endpoints, with the
//! session and its profile kept together in the server-side session. Without
//! a configured backend, sign-in and sign-up mint local demo sessions.

mod error;
mod events;

pub use error::AuthError;
pub use events::{AuthEvent, AuthEvents, AuthSubscription, ProfileDirectory, spawn_profile_listener};

use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use sabo_teens_core::{Email, Profile, ProfileUpdate, UserId};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::gateway::{Gateway, GatewayError};
use crate::models::{AuthSession, CurrentUser, StoredAuth, session_keys};
use crate::state::AppState;
use crate::supabase::{SignUpResponse, SupabaseClient, TokenGrant};

/// Result of a sign-up.
#[derive(Debug)]
pub enum SignUpOutcome {
    /// The account is active and the browser is signed in.
    SignedIn(Box<CurrentUser>),
    /// The backend sent a confirmation email; nobody is signed in yet.
    ConfirmationRequired,
}

/// Authentication service bound to one browser session.
///
/// Owns the sign-in state in [`Session`] and publishes every change on the
/// application's [`AuthEvents`].
#[derive(Clone)]
pub struct SessionManager {
    session: Session,
    gateway: Gateway,
    events: AuthEvents,
    directory: ProfileDirectory,
}

impl SessionManager {
    /// Bind the service to a browser session.
    #[must_use]
    pub fn new(session: Session, state: &AppState) -> Self {
        Self {
            session,
            gateway: state.gateway().clone(),
            events: state.auth_events().clone(),
            directory: state.profiles().clone(),
        }
    }

    /// The underlying browser session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn backend(&self) -> Option<&SupabaseClient> {
        self.gateway.client()
    }

    // =========================================================================
    // Session Restore
    // =========================================================================

    /// The signed-in user, if any.
    ///
    /// Refreshes an expiring access token and re-resolves the profile when it
    /// was updated from another session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` when the refresh grant fails (the
    /// session is cleared first), and `AuthError::ProfileLookup` when the
    /// profile cannot be re-resolved. Refreshed tokens are kept either way.
    pub async fn current(&self) -> Result<Option<CurrentUser>, AuthError> {
        let Some(mut stored) = self.session.get::<StoredAuth>(session_keys::AUTH).await? else {
            return Ok(None);
        };
        let mut stale = false;

        if stored.session.needs_refresh() {
            match self.refresh(&stored.session).await {
                Ok(session) => {
                    stored.session = session;
                    // The old refresh token is spent; store the rotated pair
                    // before the profile lookup can fail.
                    self.session.insert(session_keys::AUTH, &stored).await?;
                    stale = true;
                    self.events
                        .publish(AuthEvent::TokenRefreshed(stored.session.user_id.clone()));
                }
                Err(err) => {
                    tracing::warn!(error = %err, user_id = %stored.session.user_id, "Token refresh failed, clearing session");
                    self.session.remove::<StoredAuth>(session_keys::AUTH).await?;
                    clear_sentry_user();
                    return Err(AuthError::SessionExpired);
                }
            }
        }

        let latest = self.directory.version(&stored.session.user_id).await;
        if (stale || latest > stored.profile_version) && !stored.session.demo {
            stored.profile = self.resolve_profile(&stored.session).await?;
            stored.profile_version = latest;
            self.session.insert(session_keys::AUTH, &stored).await?;
        }

        set_sentry_user(&stored.session.user_id, Some(stored.session.email.as_str()));
        Ok(Some(stored.into()))
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, AuthError> {
        let backend = self.backend().ok_or(AuthError::SessionExpired)?;
        let grant = backend
            .refresh_session(&session.refresh_token)
            .await
            .map_err(AuthError::from_backend)?;
        let mut refreshed = session_from_grant(grant, &session.email)?;
        if refreshed.full_name.is_none() {
            refreshed.full_name.clone_from(&session.full_name);
        }
        Ok(refreshed)
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::ProfileLookup` if the profile cannot be resolved.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email)?;

        let Some(backend) = self.backend() else {
            return self.start_demo(email, None).await;
        };

        let grant = backend
            .sign_in_with_password(email.as_str(), password)
            .await
            .map_err(AuthError::from_backend)?;
        let session = session_from_grant(grant, &email)?;
        let profile = self.resolve_profile(&session).await?;

        self.store(session, profile).await
    }

    /// Create an account.
    ///
    /// When the backend returns a session, the profile row is inserted with
    /// role `user` and the browser is signed in. A failed insert is logged and
    /// the synthesized profile is used for this session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    /// Returns `AuthError::WeakPassword` if the backend rejects the password.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let email = Email::parse(email)?;
        let full_name = full_name.trim();

        let Some(backend) = self.backend() else {
            let user = self.start_demo(email, Some(full_name)).await?;
            return Ok(SignUpOutcome::SignedIn(Box::new(user)));
        };

        let response = backend
            .sign_up(email.as_str(), password, full_name)
            .await
            .map_err(AuthError::from_backend)?;

        match response {
            SignUpResponse::Session(grant) => {
                let mut session = session_from_grant(grant, &email)?;
                session.full_name = Some(full_name.to_string());
                let profile = self.provision(&session).await;
                let user = self.store(session, profile).await?;
                Ok(SignUpOutcome::SignedIn(Box::new(user)))
            }
            SignUpResponse::ConfirmationSent(user) => {
                tracing::info!(user_id = %user.id, "Sign-up awaiting email confirmation");
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    /// Sign out.
    ///
    /// The local session and profile are cleared before the remote logout is
    /// attempted; a failed remote logout is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let stored = self.session.remove::<StoredAuth>(session_keys::AUTH).await?;
        clear_sentry_user();

        let Some(stored) = stored else {
            return Ok(());
        };
        self.events
            .publish(AuthEvent::SignedOut(stored.session.user_id.clone()));

        if stored.session.demo {
            return Ok(());
        }
        if let Some(backend) = self.backend()
            && let Err(err) = backend.sign_out(&stored.session.access_token).await
        {
            tracing::warn!(error = %err, user_id = %stored.session.user_id, "Remote sign-out failed");
        }
        Ok(())
    }

    /// Send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid, and
    /// `AuthError::Backend` if the request fails.
    #[instrument(skip(self))]
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        match self.backend() {
            Some(backend) => backend
                .reset_password_for_email(email.as_str())
                .await
                .map_err(AuthError::from_backend),
            None => {
                tracing::info!("Mock mode, skipping password reset email");
                Ok(())
            }
        }
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Update the signed-in user's profile and notify other sessions.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` without a session, and
    /// `AuthError::Gateway` when the update fails.
    #[instrument(skip(self))]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile, AuthError> {
        let Some(mut stored) = self.session.get::<StoredAuth>(session_keys::AUTH).await? else {
            return Err(AuthError::NotSignedIn);
        };

        let profile = if stored.session.demo {
            let mut profile = stored.profile.clone();
            profile.apply(&update);
            profile
        } else {
            self.gateway
                .profiles()
                .update(&stored.session.user_id, &update, &stored.session.access_token)
                .await?
        };

        let user_id = stored.session.user_id.clone();
        let version = self.directory.version(&user_id).await + 1;
        stored.profile = profile.clone();
        stored.profile_version = version;
        self.session.insert(session_keys::AUTH, &stored).await?;
        self.events.publish(AuthEvent::ProfileUpdated(user_id));

        Ok(profile)
    }

    /// Fetch the profile row, provisioning it when it does not exist.
    async fn resolve_profile(&self, session: &AuthSession) -> Result<Profile, AuthError> {
        match self
            .gateway
            .profiles()
            .get(&session.user_id, &session.access_token)
            .await
        {
            Ok(profile) => Ok(profile),
            Err(GatewayError::NotFound(_)) => Ok(self.provision(session).await),
            Err(err) => {
                tracing::error!(error = %err, user_id = %session.user_id, "Profile lookup failed");
                Err(AuthError::ProfileLookup(err))
            }
        }
    }

    /// Synthesize a `user` profile and try to persist it.
    async fn provision(&self, session: &AuthSession) -> Profile {
        let profile = Profile::synthesize(
            session.user_id.clone(),
            session.email.clone(),
            session.full_name.as_deref(),
        );
        match self
            .gateway
            .profiles()
            .insert(&profile, &session.access_token)
            .await
        {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, user_id = %session.user_id, "Failed to persist new profile, using synthesized copy");
                profile
            }
        }
    }

    async fn start_demo(
        &self,
        email: Email,
        full_name: Option<&str>,
    ) -> Result<CurrentUser, AuthError> {
        tracing::warn!("Backend not configured, issuing demo session");
        let session = AuthSession::demo(email, full_name);
        let profile = Profile::synthesize(
            session.user_id.clone(),
            session.email.clone(),
            full_name,
        );
        self.store(session, profile).await
    }

    async fn store(&self, session: AuthSession, profile: Profile) -> Result<CurrentUser, AuthError> {
        self.session.cycle_id().await?;

        let stored = StoredAuth {
            profile_version: self.directory.version(&session.user_id).await,
            session,
            profile,
        };
        self.session.insert(session_keys::AUTH, &stored).await?;

        let user_id: UserId = stored.session.user_id.clone();
        set_sentry_user(&user_id, Some(stored.session.email.as_str()));
        self.events.publish(AuthEvent::SignedIn(user_id));

        Ok(stored.into())
    }
}

fn session_from_grant(grant: TokenGrant, fallback_email: &Email) -> Result<AuthSession, AuthError> {
    let expires_at = grant.expires_at_or(Utc::now().timestamp());
    let email = match grant.user.email.as_deref() {
        Some(email) => Email::parse(email)?,
        None => fallback_email.clone(),
    };
    Ok(AuthSession {
        access_token: grant.access_token,
        refresh_token: grant.refresh_token,
        expires_at,
        user_id: UserId::new(grant.user.id),
        email,
        full_name: grant.user.user_metadata.full_name,
        demo: false,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tower_sessions::MemoryStore;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::SiteConfig;
    use crate::gateway::test_support::ANON_KEY;

    fn state(uri: Option<&str>) -> AppState {
        let uri = uri.map(str::to_string);
        let config = SiteConfig::from_lookup(|key| match key {
            "SUPABASE_URL" => uri.clone(),
            "SUPABASE_ANON_KEY" => uri.as_ref().map(|_| ANON_KEY.to_string()),
            _ => None,
        })
        .unwrap();
        AppState::new(config)
    }

    fn manager(state: &AppState) -> SessionManager {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        SessionManager::new(session, state)
    }

    fn grant(expires_in: i64) -> serde_json::Value {
        json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": expires_in,
            "user": {
                "id": "u1",
                "email": "tolu@example.com",
                "user_metadata": {"full_name": "Tolu Bakare"}
            }
        })
    }

    fn profile_row(role: &str) -> serde_json::Value {
        json!({"id": "u1", "email": "tolu@example.com", "full_name": "Tolu Bakare", "role": role})
    }

    async fn mount_password_grant(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant(3600)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_sign_in_loads_existing_profile() {
        let server = MockServer::start().await;
        mount_password_grant(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_row("admin")))
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let auth = manager(&state);
        let mut events = state.auth_events().subscribe();

        let user = auth.sign_in("tolu@example.com", "pw").await.unwrap();
        assert!(user.is_admin());
        assert_eq!(events.recv().await, Some(AuthEvent::SignedIn(UserId::new("u1"))));

        let current = auth.current().await.unwrap().unwrap();
        assert_eq!(current.id().as_str(), "u1");
        assert_eq!(current.access_token(), "access-1");
    }

    #[tokio::test]
    async fn test_missing_profile_is_provisioned_as_user() {
        let server = MockServer::start().await;
        mount_password_grant(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({"code": "PGRST116", "message": "no rows"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/profiles"))
            .and(body_partial_json(json!({"id": "u1", "role": "user", "full_name": "Tolu Bakare"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(profile_row("user")))
            .expect(1)
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let user = manager(&state).sign_in("tolu@example.com", "pw").await.unwrap();
        assert!(!user.is_admin());
        assert_eq!(user.profile.display_name(), "Tolu Bakare");
    }

    #[tokio::test]
    async fn test_profile_lookup_error_is_not_provisioned() {
        let server = MockServer::start().await;
        mount_password_grant(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"code": "XX000", "message": "down"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let auth = manager(&state);
        let result = auth.sign_in("tolu@example.com", "pw").await;
        assert!(matches!(result, Err(AuthError::ProfileLookup(_))));
        assert!(auth.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let result = manager(&state).sign_in("tolu@example.com", "wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_sign_up_keeps_session_when_profile_insert_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_partial_json(json!({"data": {"full_name": "Tolu Bakare"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant(3600)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"code": "23505", "message": "duplicate"})))
            .expect(1)
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let auth = manager(&state);
        let outcome = auth
            .sign_up("tolu@example.com", "secret1", " Tolu Bakare ")
            .await
            .unwrap();
        let SignUpOutcome::SignedIn(user) = outcome else {
            panic!("expected a signed-in outcome");
        };
        assert_eq!(user.profile.display_name(), "Tolu Bakare");
        assert!(!user.is_admin());
        assert!(auth.current().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_up_awaiting_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1",
                "email": "tolu@example.com"
            })))
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let auth = manager(&state);
        let outcome = auth.sign_up("tolu@example.com", "secret1", "Tolu").await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::ConfirmationRequired));
        assert!(auth.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_when_remote_fails() {
        let server = MockServer::start().await;
        mount_password_grant(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_row("admin")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let auth = manager(&state);
        auth.sign_in("tolu@example.com", "pw").await.unwrap();

        auth.sign_out().await.unwrap();
        assert!(auth.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant(0)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_partial_json(json!({"refresh_token": "refresh-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-2",
                "refresh_token": "refresh-2",
                "expires_in": 3600,
                "user": {"id": "u1", "email": "tolu@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_row("user")))
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let auth = manager(&state);
        auth.sign_in("tolu@example.com", "pw").await.unwrap();
        let mut events = state.auth_events().subscribe();

        let user = auth.current().await.unwrap().unwrap();
        assert_eq!(user.access_token(), "access-2");
        assert_eq!(events.recv().await, Some(AuthEvent::TokenRefreshed(UserId::new("u1"))));
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant(0)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_row("user")))
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let auth = manager(&state);
        auth.sign_in("tolu@example.com", "pw").await.unwrap();

        assert!(matches!(auth.current().await, Err(AuthError::SessionExpired)));
        assert!(auth.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refreshed_tokens_survive_profile_outage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant(0)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_partial_json(json!({"refresh_token": "refresh-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-2",
                "refresh_token": "refresh-2",
                "expires_in": 3600,
                "user": {"id": "u1", "email": "tolu@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_row("user")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "unavailable"})))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let auth = manager(&state);
        auth.sign_in("tolu@example.com", "pw").await.unwrap();

        assert!(matches!(auth.current().await, Err(AuthError::ProfileLookup(_))));

        let user = auth.current().await.unwrap().unwrap();
        assert_eq!(user.access_token(), "access-2");
        assert_eq!(user.profile.display_name(), "Tolu Bakare");
    }

    #[tokio::test]
    async fn test_profile_update_reaches_other_sessions() {
        let server = MockServer::start().await;
        mount_password_grant(&server).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_row("user")))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.u1"))
            .and(body_partial_json(json!({"full_name": "Tolu B."})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1", "email": "tolu@example.com", "full_name": "Tolu B.", "role": "user"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1", "email": "tolu@example.com", "full_name": "Tolu B.", "role": "user"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = state(Some(&server.uri()));
        let laptop = manager(&state);
        let phone = manager(&state);
        laptop.sign_in("tolu@example.com", "pw").await.unwrap();
        phone.sign_in("tolu@example.com", "pw").await.unwrap();

        let updated = laptop
            .update_profile(ProfileUpdate {
                full_name: Some("Tolu B.".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(updated.display_name(), "Tolu B.");

        let user_id = UserId::new("u1");
        for _ in 0..100 {
            if state.profiles().version(&user_id).await >= 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(state.profiles().version(&user_id).await, 1);

        let on_laptop = laptop.current().await.unwrap().unwrap();
        assert_eq!(on_laptop.profile.display_name(), "Tolu B.");

        let on_phone = phone.current().await.unwrap().unwrap();
        assert_eq!(on_phone.profile.display_name(), "Tolu B.");

        // Re-resolved once; later requests use the cached copy.
        phone.current().await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_mock_mode_issues_demo_session() {
        let state = state(None);
        let auth = manager(&state);

        let user = auth.sign_in("ada@example.com", "anything").await.unwrap();
        assert!(user.session.demo);
        assert!(!user.is_admin());
        assert_eq!(user.id().as_str(), "demo-ada");

        let profile = auth
            .update_profile(ProfileUpdate {
                full_name: Some("Ada L.".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(profile.display_name(), "Ada L.");

        auth.sign_out().await.unwrap();
        assert!(auth.current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_requires_sign_in() {
        let state = state(None);
        let result = manager(&state).update_profile(ProfileUpdate::default()).await;
        assert!(matches!(result, Err(AuthError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_invalid_email_rejected_before_backend() {
        let state = state(None);
        let result = manager(&state).sign_in("not-an-email", "pw").await;
        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
    }
}
