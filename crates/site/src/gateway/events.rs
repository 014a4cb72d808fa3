//! `events` table operations.

use sabo_teens_core::{Event, EventDraft, EventId, EventStatus, Fetched};
use tracing::instrument;

use super::mock::{mock_event, optimistic_millis};
use super::{Gateway, GatewayError};

/// Event reads and admin writes.
#[derive(Debug, Clone, Copy)]
pub struct EventsGateway<'a> {
    gateway: &'a Gateway,
}

impl<'a> EventsGateway<'a> {
    pub(super) const fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Events ordered by date ascending, optionally filtered by status.
    ///
    /// Degrades to the sample event, filtered by `status`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` under the strict policy.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        status: Option<EventStatus>,
    ) -> Result<Fetched<Vec<Event>>, GatewayError> {
        let result = self.fetch_list(status).await;
        self.gateway.settle("events.list", result, || {
            let mock = mock_event(EventId::new("1"));
            if status.is_none_or(|s| s == mock.status) {
                vec![mock]
            } else {
                Vec::new()
            }
        })
    }

    async fn fetch_list(&self, status: Option<EventStatus>) -> Result<Vec<Event>, GatewayError> {
        let mut query = self
            .gateway
            .backend()?
            .table("events")
            .select("*")
            .order("event_date", true);
        if let Some(status) = status {
            query = query.eq("status", status);
        }
        query
            .fetch()
            .await
            .map_err(|e| GatewayError::from_backend(e, "events"))
    }

    /// One event by id.
    ///
    /// Degrades to the sample event carrying the requested id.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` when no such event exists, or any
    /// error under the strict policy.
    #[instrument(skip(self), fields(event_id = %id))]
    pub async fn get(&self, id: &EventId) -> Result<Fetched<Event>, GatewayError> {
        let result = self.fetch_one(id).await;
        self.gateway
            .settle("events.get", result, || mock_event(id.clone()))
    }

    async fn fetch_one(&self, id: &EventId) -> Result<Event, GatewayError> {
        self.gateway
            .backend()?
            .table("events")
            .select("*")
            .eq("id", id)
            .single()
            .fetch()
            .await
            .map_err(|e| GatewayError::from_backend(e, format!("event {id}")))
    }

    /// Insert an event as the signed-in admin.
    ///
    /// Degrades to an optimistic echo with a time-derived id.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` under the strict policy.
    #[instrument(skip(self, draft, access_token), fields(title = %draft.title))]
    pub async fn create(
        &self,
        draft: &EventDraft,
        access_token: &str,
    ) -> Result<Fetched<Event>, GatewayError> {
        let result: Result<Event, GatewayError> = async {
            self.gateway
                .backend()?
                .table("events")
                .single()
                .bearer(access_token)
                .insert(draft)
                .await
                .map_err(|e| GatewayError::from_backend(e, "event"))
        }
        .await;
        self.gateway.settle("events.create", result, || {
            Event::from_draft(EventId::from_millis(optimistic_millis()), draft)
        })
    }

    /// Replace an event's fields as the signed-in admin.
    ///
    /// Degrades to an optimistic echo under the same id.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` when no such event exists, or any
    /// error under the strict policy.
    #[instrument(skip(self, draft, access_token), fields(event_id = %id))]
    pub async fn update(
        &self,
        id: &EventId,
        draft: &EventDraft,
        access_token: &str,
    ) -> Result<Fetched<Event>, GatewayError> {
        let result: Result<Event, GatewayError> = async {
            self.gateway
                .backend()?
                .table("events")
                .eq("id", id)
                .single()
                .bearer(access_token)
                .update(draft)
                .await
                .map_err(|e| GatewayError::from_backend(e, format!("event {id}")))
        }
        .await;
        self.gateway
            .settle("events.update", result, || Event::from_draft(id.clone(), draft))
    }

    /// Delete an event as the signed-in admin.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` under the strict policy.
    #[instrument(skip(self, access_token), fields(event_id = %id))]
    pub async fn delete(
        &self,
        id: &EventId,
        access_token: &str,
    ) -> Result<Fetched<()>, GatewayError> {
        let result: Result<(), GatewayError> = async {
            self.gateway
                .backend()?
                .table("events")
                .eq("id", id)
                .bearer(access_token)
                .delete()
                .await
                .map_err(GatewayError::Backend)
        }
        .await;
        self.gateway.settle("events.delete", result, || ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::FallbackPolicy;
    use crate::gateway::test_support::gateway;

    fn row(id: &str, date: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Event {id}"),
            "theme": "Arise",
            "event_date": date,
            "start_time": "09:00:00",
            "end_time": "12:00:00",
            "bible_text": "Isaiah 60:1",
            "objective": "Fellowship",
            "venue": "FGC Sabo",
            "max_participants": null,
            "status": status
        })
    }

    #[tokio::test]
    async fn test_list_upcoming_is_live_and_ordered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("status", "eq.upcoming"))
            .and(query_param("order", "event_date.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                row("a", "2026-01-10", "upcoming"),
                row("b", "2026-02-14", "upcoming"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        let fetched = gateway
            .events()
            .list(Some(EventStatus::Upcoming))
            .await
            .unwrap();

        assert!(!fetched.is_degraded());
        let events = fetched.into_inner();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.status == EventStatus::Upcoming));
        assert!(events[0].event_date < events[1].event_date);
    }

    #[tokio::test]
    async fn test_list_failure_degrades_to_mock_event() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        let fetched = gateway.events().list(None).await.unwrap();

        assert!(fetched.is_degraded());
        let events = fetched.into_inner();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Teenagers Prayer Conference");
        assert_eq!(events[0].status, EventStatus::Upcoming);

        let completed = gateway
            .events()
            .list(Some(EventStatus::Completed))
            .await
            .unwrap();
        assert!(completed.data().is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_is_error_when_strict() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Strict);
        assert!(matches!(
            gateway.events().list(None).await,
            Err(GatewayError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_event_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("id", "eq.404"))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({
                "code": "PGRST116",
                "message": "JSON object requested, multiple (or no) rows returned"
            })))
            .mount(&server)
            .await;

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        assert!(matches!(
            gateway.events().get(&EventId::new("404")).await,
            Err(GatewayError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_sends_user_token_and_degrades_optimistically() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/events"))
            .and(header("authorization", "Bearer admin-token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "JWT expired"})))
            .expect(1)
            .mount(&server)
            .await;

        let draft = EventDraft {
            title: "Youth Retreat".to_string(),
            theme: "Arise".to_string(),
            event_date: chrono::NaiveDate::from_ymd_opt(2026, 4, 3).unwrap(),
            start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            bible_text: "Isaiah 60:1".to_string(),
            objective: "Fellowship".to_string(),
            venue: String::new(),
            max_participants: None,
            status: EventStatus::Upcoming,
            description: None,
            created_by: None,
        };

        let gateway = gateway(&server.uri(), FallbackPolicy::Degrade);
        let fetched = gateway.events().create(&draft, "admin-token").await.unwrap();

        assert!(fetched.is_degraded());
        let event = fetched.into_inner();
        assert_eq!(event.title, "Youth Retreat");
        assert!(event.id.as_str().parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_mock_mode_degrades_without_network() {
        let gateway = Gateway::new(None, FallbackPolicy::Degrade);
        let fetched = gateway.events().get(&EventId::new("42")).await.unwrap();
        assert_eq!(fetched.reason(), Some("backend not configured"));
        assert_eq!(fetched.data().id.as_str(), "42");

        let deleted = gateway
            .events()
            .delete(&EventId::new("42"), "token")
            .await
            .unwrap();
        assert!(deleted.is_degraded());
    }
}
