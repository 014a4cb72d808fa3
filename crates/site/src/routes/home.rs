//! Home and about pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use sabo_teens_core::{Event, EventStatus, listing::sort_by_date};

use super::{Layout, Nav};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::notifications::Notifications;
use crate::state::AppState;

/// Number of upcoming events featured on the home page.
pub const FEATURED_LIMIT: usize = 3;

/// A headline figure in the stats band.
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

pub const STATS: [Stat; 3] = [
    Stat {
        value: "500+",
        label: "Active Members",
    },
    Stat {
        value: "24+",
        label: "Events Yearly",
    },
    Stat {
        value: "52+",
        label: "Bible Studies",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub featured: Vec<Event>,
    pub stats: &'static [Stat],
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    notifications: Notifications,
) -> Result<impl IntoResponse> {
    let fetched = state
        .gateway()
        .events()
        .list(Some(EventStatus::Upcoming))
        .await?;

    let mut layout = Layout::new(&state, user.as_ref(), &notifications, Nav::Home).await;
    layout.note_degraded(&fetched);

    let mut featured = fetched.into_inner();
    sort_by_date(&mut featured);
    featured.truncate(FEATURED_LIMIT);

    Ok(HomeTemplate {
        layout,
        featured,
        stats: &STATS,
    })
}

/// Display the about page.
pub async fn about(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    notifications: Notifications,
) -> impl IntoResponse {
    AboutTemplate {
        layout: Layout::new(&state, user.as_ref(), &notifications, Nav::About).await,
    }
}
