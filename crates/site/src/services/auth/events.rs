//! Application-wide auth events and the profile version directory.
//!
//! Sign-in, sign-out, token refresh and profile updates are published on
//! [`AuthEvents`]. A listener task keeps [`ProfileDirectory`] current, so a
//! session whose cached profile is older than the latest version re-resolves
//! it on its next request.

use std::time::Duration;

use moka::future::Cache;
use sabo_teens_core::UserId;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const CHANNEL_CAPACITY: usize = 256;

/// Something that changed a user's auth state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(UserId),
    SignedOut(UserId),
    TokenRefreshed(UserId),
    ProfileUpdated(UserId),
}

impl AuthEvent {
    /// The user the event is about.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        match self {
            Self::SignedIn(id)
            | Self::SignedOut(id)
            | Self::TokenRefreshed(id)
            | Self::ProfileUpdated(id) => id,
        }
    }
}

/// Broadcast hub for [`AuthEvent`]s.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    /// Create a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish to every current subscriber.
    pub fn publish(&self, event: AuthEvent) {
        tracing::debug!(event = ?event, "auth event");
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }

    /// Subscribe. Dropping the returned handle unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription to [`AuthEvents`].
#[derive(Debug)]
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Next event, or `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Latest profile version per user.
#[derive(Debug, Clone)]
pub struct ProfileDirectory {
    versions: Cache<UserId, u64>,
}

impl Default for ProfileDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileDirectory {
    /// Create an empty directory. Entries idle for a week are dropped.
    #[must_use]
    pub fn new() -> Self {
        Self {
            versions: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(Duration::from_secs(7 * 24 * 60 * 60))
                .build(),
        }
    }

    /// Latest version for `user_id`; 0 when never updated.
    pub async fn version(&self, user_id: &UserId) -> u64 {
        self.versions.get(user_id).await.unwrap_or(0)
    }

    async fn bump(&self, user_id: &UserId) -> u64 {
        let next = self.version(user_id).await + 1;
        self.versions.insert(user_id.clone(), next).await;
        next
    }
}

/// Spawn the task that applies profile updates to `directory`.
///
/// The task ends when the hub is dropped; abort the handle to stop it early.
#[must_use]
pub fn spawn_profile_listener(events: &AuthEvents, directory: ProfileDirectory) -> JoinHandle<()> {
    let mut subscription = events.subscribe();
    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            if let AuthEvent::ProfileUpdated(user_id) = &event {
                let version = directory.bump(user_id).await;
                tracing::debug!(user_id = %user_id, version, "profile version bumped");
            }
        }
        tracing::debug!("auth event hub closed, profile listener stopping");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dropping_subscription_unsubscribes() {
        let events = AuthEvents::new();
        assert_eq!(events.subscriber_count(), 0);

        let subscription = events.subscribe();
        assert_eq!(events.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_events() {
        let events = AuthEvents::new();
        let mut subscription = events.subscribe();

        events.publish(AuthEvent::SignedIn(UserId::new("u1")));
        events.publish(AuthEvent::SignedOut(UserId::new("u1")));

        assert_eq!(
            subscription.recv().await,
            Some(AuthEvent::SignedIn(UserId::new("u1")))
        );
        assert_eq!(
            subscription.recv().await.map(|e| e.user_id().clone()),
            Some(UserId::new("u1"))
        );
    }

    #[tokio::test]
    async fn test_listener_bumps_profile_version() {
        let events = AuthEvents::new();
        let directory = ProfileDirectory::new();
        let handle = spawn_profile_listener(&events, directory.clone());
        let user = UserId::new("u1");

        events.publish(AuthEvent::TokenRefreshed(user.clone()));
        events.publish(AuthEvent::ProfileUpdated(user.clone()));

        let mut version = 0;
        for _ in 0..50 {
            version = directory.version(&user).await;
            if version > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(version, 1);

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert_eq!(events.subscriber_count(), 0);
    }
}
