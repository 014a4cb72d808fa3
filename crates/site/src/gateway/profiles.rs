//! `profiles` table operations. These never degrade.

use sabo_teens_core::{Profile, ProfileUpdate, UserId};
use tracing::instrument;

use super::{Gateway, GatewayError};

/// Profile reads and writes, always as the profile's own user.
#[derive(Debug, Clone, Copy)]
pub struct ProfilesGateway<'a> {
    gateway: &'a Gateway,
}

impl<'a> ProfilesGateway<'a> {
    pub(super) const fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// The profile row for `id`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` when no row exists yet, and any other
    /// variant for a failed lookup.
    #[instrument(skip(self, access_token), fields(user_id = %id))]
    pub async fn get(&self, id: &UserId, access_token: &str) -> Result<Profile, GatewayError> {
        self.gateway
            .backend()?
            .table("profiles")
            .select("*")
            .eq("id", id)
            .single()
            .bearer(access_token)
            .fetch()
            .await
            .map_err(|e| GatewayError::from_backend(e, format!("profile {id}")))
    }

    /// Insert a profile row.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the insert fails.
    #[instrument(skip(self, profile, access_token), fields(user_id = %profile.id))]
    pub async fn insert(&self, profile: &Profile, access_token: &str) -> Result<Profile, GatewayError> {
        self.gateway
            .backend()?
            .table("profiles")
            .single()
            .bearer(access_token)
            .insert(profile)
            .await
            .map_err(GatewayError::Backend)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` when the row is missing, and any
    /// other variant when the update fails.
    #[instrument(skip(self, access_token), fields(user_id = %id))]
    pub async fn update(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        access_token: &str,
    ) -> Result<Profile, GatewayError> {
        self.gateway
            .backend()?
            .table("profiles")
            .eq("id", id)
            .single()
            .bearer(access_token)
            .update(update)
            .await
            .map_err(|e| GatewayError::from_backend(e, format!("profile {id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::FallbackPolicy;
    use crate::gateway::test_support::gateway;

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.u1"))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({"code": "PGRST116", "message": "no rows"})))
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        let result = gateway.profiles().get(&UserId::new("u1"), "token").await;
        assert!(matches!(result, Err(GatewayError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_database_error_is_not_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"code": "XX000", "message": "internal"})))
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        let result = gateway.profiles().get(&UserId::new("u1"), "token").await;
        assert!(matches!(result, Err(GatewayError::Backend(_))));
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.u1"))
            .and(body_json(json!({"full_name": "Tolu B."})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1",
                "email": "tolu@example.com",
                "full_name": "Tolu B.",
                "role": "user"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        let profile = gateway
            .profiles()
            .update(
                &UserId::new("u1"),
                &ProfileUpdate {
                    full_name: Some("Tolu B.".to_string()),
                },
                "token",
            )
            .await
            .unwrap();
        assert_eq!(profile.display_name(), "Tolu B.");
    }

    #[tokio::test]
    async fn test_mock_mode_never_degrades() {
        let gateway = Gateway::new(None, FallbackPolicy::Degrade);
        let result = gateway.profiles().get(&UserId::new("u1"), "token").await;
        assert!(matches!(result, Err(GatewayError::NotConfigured)));
    }
}
