//! FAQ page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use super::{Layout, Nav, events::Tab};
use crate::content::{FaqEntry, FaqFilter, search_faq};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::notifications::Notifications;
use crate::state::AppState;

/// Query parameters for the FAQ.
#[derive(Debug, Deserialize)]
pub struct FaqQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// FAQ page template.
#[derive(Template, WebTemplate)]
#[template(path = "faq.html")]
pub struct FaqTemplate {
    pub layout: Layout,
    pub tabs: Vec<Tab>,
    pub category: &'static str,
    pub search: String,
    pub entries: Vec<&'static FaqEntry>,
}

/// Display the FAQ filtered by `?category=` and `?search=`.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    notifications: Notifications,
    Query(query): Query<FaqQuery>,
) -> impl IntoResponse {
    let filter = FaqFilter::from_query(query.category.as_deref());
    let search = query.search.unwrap_or_default();

    let tabs = FaqFilter::TABS
        .iter()
        .map(|tab| Tab {
            key: tab.key(),
            label: tab.label(),
            active: *tab == filter,
        })
        .collect();

    FaqTemplate {
        layout: Layout::new(&state, user.as_ref(), &notifications, Nav::Faq).await,
        tabs,
        category: filter.key(),
        entries: search_faq(filter, &search),
        search,
    }
}
