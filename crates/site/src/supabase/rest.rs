//! `PostgREST` query builder.

use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{SupabaseClient, SupabaseError, read_json, read_text};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// A query against one table.
///
/// Filters are encoded as `PostgREST` query parameters
/// (`column=eq.value`, `order=column.asc`).
#[must_use]
pub struct TableQuery<'a> {
    client: &'a SupabaseClient,
    table: &'static str,
    params: Vec<(String, String)>,
    bearer: Option<&'a str>,
    single: bool,
}

impl<'a> TableQuery<'a> {
    pub(super) const fn new(client: &'a SupabaseClient, table: &'static str) -> Self {
        Self {
            client,
            table,
            params: Vec::new(),
            bearer: None,
            single: false,
        }
    }

    /// Columns to return, including embedded resources (`*, events(title)`).
    pub fn select(mut self, columns: &str) -> Self {
        let columns: String = columns.split_whitespace().collect();
        self.params.push(("select".to_string(), columns));
        self
    }

    /// Filter `column = value`.
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// Sort by `column`.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{column}.{direction}")));
        self
    }

    /// Expect exactly one row; zero rows is a `PGRST116` error.
    pub const fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Run as the signed-in user so row-level security applies.
    pub const fn bearer(mut self, access_token: &'a str) -> Self {
        self.bearer = Some(access_token);
        self
    }

    fn request(&self, method: Method) -> reqwest::RequestBuilder {
        let url = self.client.rest_url(self.table);
        let mut request = self
            .client
            .request(method, &url, self.bearer)
            .query(&self.params);
        if self.single {
            request = request.header("Accept", SINGLE_OBJECT);
        }
        request
    }

    /// `GET` the rows.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` on transport failure, a non-success status, or
    /// an unparseable body.
    #[instrument(skip_all, fields(table = self.table))]
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<T, SupabaseError> {
        debug!(params = ?self.params, "select");
        let response = self.request(Method::GET).send().await?;
        read_json(response).await
    }

    /// `POST` a new row and return the stored representation.
    ///
    /// # Errors
    ///
    /// See [`TableQuery::fetch`].
    #[instrument(skip_all, fields(table = self.table))]
    pub async fn insert<B, T>(self, body: &B) -> Result<T, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("insert");
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    /// `PATCH` the filtered rows and return the stored representation.
    ///
    /// # Errors
    ///
    /// See [`TableQuery::fetch`].
    #[instrument(skip_all, fields(table = self.table))]
    pub async fn update<B, T>(self, body: &B) -> Result<T, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(params = ?self.params, "update");
        let response = self
            .request(Method::PATCH)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    /// `DELETE` the filtered rows.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` on transport failure or a non-success status.
    #[instrument(skip_all, fields(table = self.table))]
    pub async fn delete(self) -> Result<(), SupabaseError> {
        debug!(params = ?self.params, "delete");
        let response = self.request(Method::DELETE).send().await?;
        read_text(response).await.map(drop)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::SupabaseConfig;

    const KEY: &str = "eyJhbGciOiJIUzI1NiJ9.test-anon-aB3xY9mK2nL5pQ7rT0uW4zC6";

    async fn client() -> (MockServer, SupabaseClient) {
        let server = MockServer::start().await;
        let config = SupabaseConfig::new(&server.uri(), KEY.to_string()).unwrap();
        (server, SupabaseClient::new(&config))
    }

    #[tokio::test]
    async fn test_select_encodes_filters_and_headers() {
        let (server, client) = client().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("select", "*"))
            .and(query_param("status", "eq.upcoming"))
            .and(query_param("order", "event_date.asc"))
            .and(header("apikey", KEY))
            .and(header("authorization", format!("Bearer {KEY}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<Value> = client
            .table("events")
            .select("*")
            .eq("status", "upcoming")
            .order("event_date", true)
            .fetch()
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_single_read_not_found() {
        let (server, client) = client().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(header("accept", SINGLE_OBJECT))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({
                "code": "PGRST116",
                "details": "The result contains 0 rows",
                "hint": null,
                "message": "JSON object requested, multiple (or no) rows returned"
            })))
            .mount(&server)
            .await;

        let err = client
            .table("profiles")
            .select("*")
            .eq("id", "u1")
            .single()
            .bearer("user-token")
            .fetch::<Value>()
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_insert_asks_for_representation() {
        let (server, client) = client().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/profiles"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({"id": "u1"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "u1"})))
            .expect(1)
            .mount(&server)
            .await;

        let row: Value = client
            .table("profiles")
            .single()
            .insert(&json!({"id": "u1"}))
            .await
            .unwrap();
        assert_eq!(row["id"], "u1");
    }

    #[tokio::test]
    async fn test_delete_maps_errors() {
        let (server, client) = client().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/events"))
            .and(query_param("id", "eq.7"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "permission denied for table events"
            })))
            .mount(&server)
            .await;

        let err = client.table("events").eq("id", 7).delete().await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.code(), Some("42501"));
    }
}
