//! In-process fan-out of identity-provider auth events
//!
//! Provider implementations back [`IdentityProvider::subscribe`] with an
//! [`AuthEventBus`]: every subscriber gets its own unbounded channel, so
//! events arrive strictly in emission order and are never dropped while the
//! subscription is alive. Dropping the [`AuthEvents`] handle unregisters the
//! subscriber; dropping the last bus handle closes every remaining
//! subscription.
//!
//! [`IdentityProvider::subscribe`]: crate::provider::IdentityProvider::subscribe

use crate::models::AuthSession;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;

/// Auth state change pushed by the identity provider.
///
/// The attached session payloads are informational; consumers that need the
/// authoritative state re-query the provider instead of patching from them.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A principal signed in and the attached session became current
    SignedIn(AuthSession),
    /// The current session was replaced through a token refresh
    TokenRefreshed(AuthSession),
    /// The current session ended
    SignedOut,
}

#[derive(Default)]
struct BusInner {
    subscribers: Mutex<Vec<(u64, mpsc::UnboundedSender<AuthEvent>)>>,
    next_id: AtomicU64,
}

impl BusInner {
    fn unregister(&self, id: u64) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|(sub_id, _)| *sub_id != id);
    }
}

/// Fan-out point provider implementations emit auth events through.
#[derive(Clone, Default)]
pub struct AuthEventBus {
    inner: Arc<BusInner>,
}

impl AuthEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and hand back its receiving end.
    pub fn subscribe(&self) -> AuthEvents {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().unwrap().push((id, tx));

        // The handle holds the bus weakly: its sender lives in the bus, so
        // dropping the last bus handle closes the channel.
        AuthEvents {
            id,
            rx,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every live subscriber, removing closed channels.
    pub fn emit(&self, event: AuthEvent) {
        self.inner
            .subscribers
            .lock()
            .unwrap()
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    /// Number of currently registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().unwrap().len()
    }
}

/// Receiving end of an auth-event subscription.
///
/// Events queue while the handle is alive; dropping it cancels the
/// subscription, and anything emitted afterwards is never seen.
pub struct AuthEvents {
    id: u64,
    rx: mpsc::UnboundedReceiver<AuthEvent>,
    bus: Weak<BusInner>,
}

impl AuthEvents {
    /// Receive the next event, or `None` once every bus handle has been
    /// dropped and the queued events are drained.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        self.rx.recv().await
    }
}

impl Drop for AuthEvents {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unregister(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, UserRole};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_session() -> AuthSession {
        AuthSession {
            access_token: "token".to_string(),
            token_type: "bearer".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
            identity: Identity {
                id: Uuid::new_v4(),
                email: "maria@example.com".to_string(),
                first_name: None,
                last_name: None,
                role: UserRole::Patient,
                created_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = AuthEventBus::new();
        let mut events = bus.subscribe();

        bus.emit(AuthEvent::SignedIn(sample_session()));
        bus.emit(AuthEvent::TokenRefreshed(sample_session()));
        bus.emit(AuthEvent::SignedOut);

        assert!(matches!(events.recv().await, Some(AuthEvent::SignedIn(_))));
        assert!(matches!(
            events.recv().await,
            Some(AuthEvent::TokenRefreshed(_))
        ));
        assert!(matches!(events.recv().await, Some(AuthEvent::SignedOut)));
    }

    #[tokio::test]
    async fn test_each_subscriber_gets_every_event() {
        let bus = AuthEventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.emit(AuthEvent::SignedOut);

        assert!(matches!(first.recv().await, Some(AuthEvent::SignedOut)));
        assert!(matches!(second.recv().await, Some(AuthEvent::SignedOut)));
    }

    #[tokio::test]
    async fn test_drop_unregisters_subscriber() {
        let bus = AuthEventBus::new();
        let events = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        drop(events);
        assert_eq!(bus.subscriber_count(), 0);

        // Emitting with no subscribers is a no-op.
        bus.emit(AuthEvent::SignedOut);
    }

    #[tokio::test]
    async fn test_dropping_the_bus_closes_subscriptions() {
        let bus = AuthEventBus::new();
        let mut events = bus.subscribe();

        bus.emit(AuthEvent::SignedIn(sample_session()));
        drop(bus);

        // Queued events drain before the closed channel shows through.
        assert!(matches!(events.recv().await, Some(AuthEvent::SignedIn(_))));
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let bus = AuthEventBus::new();
        bus.emit(AuthEvent::SignedOut);

        let mut events = bus.subscribe();
        bus.emit(AuthEvent::SignedIn(sample_session()));

        // Only the event emitted after subscription is queued.
        assert!(matches!(events.recv().await, Some(AuthEvent::SignedIn(_))));
        let nothing = tokio::time::timeout(std::time::Duration::from_millis(50), events.recv());
        assert!(nothing.await.is_err());
    }
}
