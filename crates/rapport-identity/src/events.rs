//! Session change notifications.
//!
//! Providers push a [`SessionEvent`] whenever their session changes: a
//! sign-in, a sign-out, a token refresh. The reconciler subscribes once at
//! bootstrap and feeds every event into the same routine that handles the
//! one-shot session read.
//!
//! Under the hood this is a `tokio::sync::broadcast` channel: one sender
//! (the provider), any number of receivers (subscriptions). A broadcast
//! receiver that falls too far behind loses the oldest events; we surface
//! that as [`SessionChange::Lagged`] so the subscriber can resynchronize by
//! re-reading the current session.

use rapport_model::Session;
use tokio::sync::broadcast;

/// Default number of buffered events per subscription.
const DEFAULT_CAPACITY: usize = 32;

/// What kind of change happened at the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeKind {
    /// Initial session replayed to a new subscriber.
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// One change notification: what happened and the session afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub kind: AuthChangeKind,
    pub session: Option<Session>,
}

impl SessionEvent {
    pub fn signed_in(session: Session) -> Self {
        Self {
            kind: AuthChangeKind::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            kind: AuthChangeKind::SignedOut,
            session: None,
        }
    }
}

/// What a subscriber receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// A change notification.
    Event(SessionEvent),
    /// This many notifications were dropped because the subscriber fell
    /// behind. The current session must be re-read.
    Lagged(u64),
}

/// A live subscription to session changes.
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionSubscription {
    pub fn new(rx: broadcast::Receiver<SessionEvent>) -> Self {
        Self { rx }
    }

    /// Waits for the next change.
    ///
    /// Returns `None` once the provider has gone away and every buffered
    /// event has been delivered.
    pub async fn next(&mut self) -> Option<SessionChange> {
        match self.rx.recv().await {
            Ok(event) => Some(SessionChange::Event(event)),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "session subscription lagged");
                Some(SessionChange::Lagged(skipped))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Ends the subscription. Equivalent to dropping it.
    pub fn unsubscribe(self) {}
}

/// Sending half, for identity client implementations.
///
/// Cheap to clone; all clones publish to the same subscribers.
#[derive(Debug, Clone)]
pub struct SessionBroadcaster {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionBroadcaster {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// # Panics
    /// Panics if `capacity` is 0 (a `broadcast` channel needs room for at
    /// least one event).
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription::new(self.tx.subscribe())
    }

    /// Publishes an event to every live subscription.
    ///
    /// Having no subscribers is not an error: the event is just dropped.
    pub fn publish(&self, event: SessionEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        tracing::trace!(delivered, "session event published");
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rapport_model::{Identity, IdentityId};

    use super::*;

    fn session() -> Session {
        Session {
            subject: Identity {
                id: IdentityId::new("u-1"),
                email: "a@x.com".into(),
                email_confirmed: true,
            },
            access_token: "t".into(),
            refresh_token: None,
            issued_at: 0,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_subscription_receives_published_events_in_order() {
        let broadcaster = SessionBroadcaster::new();
        let mut sub = broadcaster.subscribe();

        broadcaster.publish(SessionEvent::signed_in(session()));
        broadcaster.publish(SessionEvent::signed_out());

        assert_eq!(
            sub.next().await,
            Some(SessionChange::Event(SessionEvent::signed_in(session())))
        );
        assert_eq!(
            sub.next().await,
            Some(SessionChange::Event(SessionEvent::signed_out()))
        );
    }

    #[tokio::test]
    async fn test_subscription_reports_lag_when_buffer_overflows() {
        let broadcaster = SessionBroadcaster::with_capacity(1);
        let mut sub = broadcaster.subscribe();

        broadcaster.publish(SessionEvent::signed_in(session()));
        broadcaster.publish(SessionEvent::signed_out());

        assert_eq!(sub.next().await, Some(SessionChange::Lagged(1)));
        assert_eq!(
            sub.next().await,
            Some(SessionChange::Event(SessionEvent::signed_out()))
        );
    }

    #[tokio::test]
    async fn test_subscription_ends_when_broadcaster_dropped() {
        let broadcaster = SessionBroadcaster::new();
        let mut sub = broadcaster.subscribe();
        drop(broadcaster);

        assert_eq!(sub.next().await, None);
    }

    #[test]
    fn test_unsubscribe_releases_receiver() {
        let broadcaster = SessionBroadcaster::new();
        let sub = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        sub.unsubscribe();

        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers_is_not_an_error() {
        let broadcaster = SessionBroadcaster::new();
        broadcaster.publish(SessionEvent::signed_out());
    }
}
