//! Per-session notification queue.
//!
//! Notifications pushed during a request are rendered on the next page the
//! browser loads, then discarded.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Visual style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    /// CSS modifier class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A transient message for the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Notification queue stored in the browser session.
#[derive(Clone)]
pub struct Notifications {
    session: Session,
}

impl Notifications {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Queue a notification.
    ///
    /// A failing session store only loses the message, so the error is logged
    /// instead of returned.
    pub async fn push(&self, kind: NotificationKind, message: impl Into<String>) {
        let notification = Notification {
            kind,
            message: message.into(),
        };
        let mut queue = self.pending().await;
        queue.push(notification);
        if let Err(e) = self.session.insert(session_keys::NOTIFICATIONS, &queue).await {
            tracing::warn!(error = %e, "Failed to queue notification");
        }
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.push(NotificationKind::Error, message).await;
    }

    pub async fn warning(&self, message: impl Into<String>) {
        self.push(NotificationKind::Warning, message).await;
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.push(NotificationKind::Info, message).await;
    }

    /// Remove and return every queued notification.
    pub async fn take(&self) -> Vec<Notification> {
        match self
            .session
            .remove::<Vec<Notification>>(session_keys::NOTIFICATIONS)
            .await
        {
            Ok(queue) => queue.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read notifications");
                Vec::new()
            }
        }
    }

    async fn pending(&self) -> Vec<Notification> {
        self.session
            .get::<Vec<Notification>>(session_keys::NOTIFICATIONS)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn notifications() -> Notifications {
        Notifications::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    #[tokio::test]
    async fn test_take_drains_in_order() {
        let notifications = notifications();
        notifications.success("Registration submitted successfully!").await;
        notifications.warning("Showing sample data").await;

        let taken = notifications.take().await;
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].kind, NotificationKind::Success);
        assert_eq!(taken[1].message, "Showing sample data");

        assert!(notifications.take().await.is_empty());
    }

    #[test]
    fn test_kind_css_class() {
        assert_eq!(NotificationKind::Error.as_str(), "error");
        assert_eq!(NotificationKind::Info.as_str(), "info");
    }
}
