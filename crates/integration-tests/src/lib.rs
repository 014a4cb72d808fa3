//! In-process test harness for the site.
//!
//! Requests go straight to the router through `tower::ServiceExt::oneshot`,
//! so no port is bound. The backend is either absent (mock mode) or a
//! `wiremock` server standing in for PostgREST and GoTrue.
//!
//! ```rust,ignore
//! let app = TestApp::mock();
//! let page = app.get("/events").await;
//! assert_eq!(page.status, StatusCode::OK);
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Mutex;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sabo_teens_site::{build_router, config::SiteConfig, middleware::session::SESSION_COOKIE_NAME, state::AppState};

/// Anon key handed to the site under test.
pub const ANON_KEY: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.aB3xY9mK2nL5pQ7rT0uW4zC6";

/// Largest response body the harness reads.
const BODY_LIMIT: usize = 4 * 1024 * 1024;

/// A response with its body read into memory.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// A header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The router plus a one-cookie jar for the session.
pub struct TestApp {
    router: Router,
    state: AppState,
    session_cookie: Mutex<Option<String>>,
}

impl TestApp {
    /// An app with no backend configured.
    #[must_use]
    pub fn mock() -> Self {
        Self::from_lookup(|_| None)
    }

    /// An app whose backend is `server`, with the given fallback policy.
    #[must_use]
    pub fn with_backend(server: &MockServer, fallback: &str) -> Self {
        let uri = server.uri();
        let fallback = fallback.to_string();
        Self::from_lookup(move |key| match key {
            "SUPABASE_URL" => Some(uri.clone()),
            "SUPABASE_ANON_KEY" => Some(ANON_KEY.to_string()),
            "SITE_BACKEND_FALLBACK" => Some(fallback.clone()),
            _ => None,
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = SiteConfig::from_lookup(lookup).unwrap();
        let state = AppState::new(config);
        Self {
            router: build_router(state.clone()),
            state,
            session_cookie: Mutex::new(None),
        }
    }

    /// Shared application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// `GET path`.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::get(path);
        self.send(request.body(Body::empty()).unwrap()).await
    }

    /// `POST path` with an urlencoded form.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = self.session_cookie.lock().unwrap().clone() {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            let Some(pair) = value.split(';').next() else {
                continue;
            };
            if pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")) {
                *self.session_cookie.lock().unwrap() = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Sign in through the login form.
    pub async fn sign_in(&self, email: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", "secret1")])
            .await
    }
}

fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// =============================================================================
// Backend fixtures
// =============================================================================

/// A stored event row.
#[must_use]
pub fn event_row(id: &str, title: &str, status: &str, date: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "theme": "Arise and Shine",
        "event_date": date,
        "start_time": "10:00:00",
        "end_time": "14:00:00",
        "bible_text": "Isaiah 60:1",
        "objective": "To gather teenagers in prayer",
        "venue": "Foursquare Gospel Church, Sabo",
        "max_participants": 200,
        "status": status,
        "description": null
    })
}

/// A stored registration row with its embedded event and profile.
#[must_use]
pub fn registration_row(id: &str, event_id: &str, full_name: &str, church: &str) -> Value {
    json!({
        "id": id,
        "event_id": event_id,
        "user_id": "u1",
        "full_name": full_name,
        "residential_address": "12 Herbert Macaulay Way, Yaba",
        "phone_number": "0803 000 1111",
        "school_class": "Community High, SS2",
        "industry": null,
        "church": church,
        "parent_full_name": "Ngozi Okafor",
        "parent_phone_number": "0803 222 3333",
        "parent_church": church,
        "parent_occupation": "Nurse",
        "registration_date": "2025-11-02T09:30:00Z",
        "events": {"title": "Youth Camp", "event_date": "2025-12-06"},
        "profiles": {"full_name": full_name, "email": "tolu@example.com"}
    })
}

/// Mount a password grant for user `u1` and a profile with `role`.
pub async fn mount_signed_in_user(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 3600,
            "user": {
                "id": "u1",
                "email": "tolu@example.com",
                "user_metadata": {"full_name": "Tolu Bakare"}
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "email": "tolu@example.com",
            "full_name": "Tolu Bakare",
            "role": role
        })))
        .mount(server)
        .await;
}

/// Mount the event list.
pub async fn mount_events(server: &MockServer, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}
