//! `registrations` table operations.

use chrono::Utc;
use sabo_teens_core::{
    EventId, ExportRow, Fetched, NewRegistration, Registration, RegistrationId, RegistrationRecord,
    UserId,
};
use tracing::instrument;

use super::mock::optimistic_millis;
use super::{Gateway, GatewayError};

const LIST_COLUMNS: &str = "*, events(title, event_date), profiles(full_name, email)";
const EXPORT_COLUMNS: &str = "full_name, residential_address, phone_number, school_class, \
                              industry, church, parent_full_name, parent_phone_number, \
                              parent_church, parent_occupation, registration_date, \
                              events(title, event_date)";

/// Optional narrowing for registration listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationFilter {
    pub event_id: Option<EventId>,
    pub user_id: Option<UserId>,
}

impl RegistrationFilter {
    /// Registrations for one event.
    #[must_use]
    pub const fn for_event(event_id: EventId) -> Self {
        Self {
            event_id: Some(event_id),
            user_id: None,
        }
    }

    /// Registrations made by one user.
    #[must_use]
    pub const fn for_user(user_id: UserId) -> Self {
        Self {
            event_id: None,
            user_id: Some(user_id),
        }
    }
}

/// Registration writes and listings.
///
/// The table is not public, so every call runs as the signed-in user.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationsGateway<'a> {
    gateway: &'a Gateway,
}

impl<'a> RegistrationsGateway<'a> {
    pub(super) const fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Store a registration.
    ///
    /// Degrades to an optimistic echo with a time-derived id.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` under the strict policy.
    #[instrument(skip_all, fields(event_id = %new.event_id, user_id = %new.user_id))]
    pub async fn create(
        &self,
        new: &NewRegistration,
        access_token: &str,
    ) -> Result<Fetched<Registration>, GatewayError> {
        let result: Result<Registration, GatewayError> = async {
            self.gateway
                .backend()?
                .table("registrations")
                .single()
                .bearer(access_token)
                .insert(new)
                .await
                .map_err(GatewayError::Backend)
        }
        .await;
        self.gateway.settle("registrations.create", result, || {
            Registration::from_new(
                RegistrationId::from_millis(optimistic_millis()),
                new,
                Utc::now(),
            )
        })
    }

    /// Registrations with their event and profile embedded, newest first.
    ///
    /// Degrades to an empty list.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` under the strict policy.
    #[instrument(skip(self, access_token))]
    pub async fn list(
        &self,
        filter: &RegistrationFilter,
        access_token: &str,
    ) -> Result<Fetched<Vec<RegistrationRecord>>, GatewayError> {
        let result: Result<Vec<RegistrationRecord>, GatewayError> = async {
            let mut query = self
                .gateway
                .backend()?
                .table("registrations")
                .select(LIST_COLUMNS)
                .order("registration_date", false)
                .bearer(access_token);
            if let Some(event_id) = &filter.event_id {
                query = query.eq("event_id", event_id);
            }
            if let Some(user_id) = &filter.user_id {
                query = query.eq("user_id", user_id);
            }
            query.fetch().await.map_err(GatewayError::Backend)
        }
        .await;
        self.gateway
            .settle("registrations.list", result, Vec::new)
    }

    /// Flat rows for CSV export, optionally for one event.
    ///
    /// Degrades to an empty list.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` under the strict policy.
    #[instrument(skip(self, access_token))]
    pub async fn export(
        &self,
        event_id: Option<&EventId>,
        access_token: &str,
    ) -> Result<Fetched<Vec<ExportRow>>, GatewayError> {
        let result: Result<Vec<ExportRow>, GatewayError> = async {
            let mut query = self
                .gateway
                .backend()?
                .table("registrations")
                .select(EXPORT_COLUMNS)
                .order("registration_date", false)
                .bearer(access_token);
            if let Some(event_id) = event_id {
                query = query.eq("event_id", event_id);
            }
            query.fetch().await.map_err(GatewayError::Backend)
        }
        .await;
        self.gateway
            .settle("registrations.export", result, Vec::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::FallbackPolicy;
    use crate::gateway::test_support::gateway;
    use sabo_teens_core::{Affiliation, Registrant};

    fn new_registration() -> NewRegistration {
        NewRegistration {
            event_id: EventId::new("e1"),
            user_id: UserId::new("u1"),
            registrant: Registrant {
                full_name: "Ada Okafor".to_string(),
                residential_address: "12 Herbert Macaulay Way".to_string(),
                phone_number: "0803 000 1111".to_string(),
                church: "FGC Sabo".to_string(),
                parent_full_name: "Ngozi Okafor".to_string(),
                parent_phone_number: "0803 222 3333".to_string(),
                parent_church: "FGC Sabo".to_string(),
                parent_occupation: "Nurse".to_string(),
            },
            affiliation: Affiliation::Student {
                school_class: "Community High, SS2".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_create_student_stores_null_industry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/registrations"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(|req: &wiremock::Request| {
                // Echo the payload back as the stored row.
                let mut row: Value = serde_json::from_slice(&req.body).unwrap();
                row["id"] = json!("r1");
                row["registration_date"] = json!("2025-11-20T14:05:00+00:00");
                ResponseTemplate::new(201).set_body_json(row)
            })
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        let fetched = gateway
            .registrations()
            .create(&new_registration(), "user-token")
            .await
            .unwrap();

        assert!(!fetched.is_degraded());
        let stored = fetched.into_inner();
        assert_eq!(stored.school_class.as_deref(), Some("Community High, SS2"));
        assert_eq!(stored.industry, None);

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body["industry"].is_null());
    }

    #[tokio::test]
    async fn test_create_failure_is_optimistic_echo() {
        let gateway = Gateway::new(None, FallbackPolicy::Degrade);
        let fetched = gateway
            .registrations()
            .create(&new_registration(), "token")
            .await
            .unwrap();

        assert!(fetched.is_degraded());
        let echoed = fetched.into_inner();
        assert_eq!(echoed.registrant.full_name, "Ada Okafor");
        assert!(echoed.id.as_str().parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_list_filters_by_event_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/registrations"))
            .and(query_param("event_id", "eq.e1"))
            .and(query_param("order", "registration_date.desc"))
            .and(query_param(
                "select",
                "*,events(title,event_date),profiles(full_name,email)",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        let fetched = gateway
            .registrations()
            .list(&RegistrationFilter::for_event(EventId::new("e1")), "token")
            .await
            .unwrap();
        assert!(!fetched.is_degraded());
        assert!(fetched.data().is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        let fetched = gateway
            .registrations()
            .list(&RegistrationFilter::default(), "token")
            .await
            .unwrap();
        assert!(fetched.is_degraded());
        assert!(fetched.data().is_empty());
    }

    #[tokio::test]
    async fn test_export_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/registrations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "full_name": "Ada Okafor",
                "residential_address": "12 Herbert Macaulay Way",
                "phone_number": "0803",
                "school_class": null,
                "industry": "Catering",
                "church": "FGC Sabo",
                "parent_full_name": "Ngozi Okafor",
                "parent_phone_number": "0805",
                "parent_church": "FGC Sabo",
                "parent_occupation": "Nurse",
                "registration_date": "2025-11-20T14:05:00+00:00",
                "events": {"title": "Youth Retreat", "event_date": "2026-04-03"}
            }])))
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Strict);
        let rows = gateway
            .registrations()
            .export(None, "token")
            .await
            .unwrap()
            .into_inner();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].industry.as_deref(), Some("Catering"));
        assert_eq!(rows[0].event.as_ref().unwrap().title, "Youth Retreat");
    }
}
