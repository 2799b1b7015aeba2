//! Session store: single source of truth for the current auth state
//!
//! Holds the `(identity, session, loading, initialized)` tuple behind a
//! watch channel. Every mutation is applied inside one channel update, so
//! subscribers never observe a half-written tuple, and every pair change is
//! mirrored to the advisory cache when one is attached.

use crate::cache::{CachedAuth, SessionCache};
use crate::models::{AuthSession, Identity};
use crate::provider::IdentityProvider;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Observable auth state: who is signed in, with what session, and whether
/// that answer is ready yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub session: Option<AuthSession>,
    /// True while an initialization round-trip is outstanding
    pub loading: bool,
    /// True once the pair reflects a settled provider answer
    pub initialized: bool,
}

impl SessionState {
    fn boot(pair: Option<CachedAuth>) -> Self {
        let (identity, session) = match pair {
            Some(cached) => (Some(cached.identity), Some(cached.session)),
            None => (None, None),
        };

        Self {
            identity,
            session,
            loading: true,
            initialized: false,
        }
    }

    /// Whether a principal is currently signed in
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

fn apply_pair(state: &mut SessionState, session: Option<AuthSession>) {
    state.identity = session.as_ref().map(|session| session.identity.clone());
    state.session = session;
}

/// Single source of truth for the current auth state.
///
/// Created once at application-shell start and shared by `Arc`; mutated only
/// through its own operations, read freely through [`snapshot`] and
/// [`subscribe`].
///
/// [`snapshot`]: Self::snapshot
/// [`subscribe`]: Self::subscribe
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    cache: Option<Arc<dyn SessionCache>>,
    state: watch::Sender<SessionState>,
    seq: AtomicU64,
}

impl SessionStore {
    /// Create a store with no advisory cache.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::build(provider, None)
    }

    /// Create a store that pre-seeds from, and writes through to, `cache`.
    pub fn with_cache(provider: Arc<dyn IdentityProvider>, cache: Arc<dyn SessionCache>) -> Self {
        Self::build(provider, Some(cache))
    }

    fn build(provider: Arc<dyn IdentityProvider>, cache: Option<Arc<dyn SessionCache>>) -> Self {
        let seeded = cache.as_ref().and_then(|cache| match cache.load() {
            Ok(pair) => pair,
            Err(err) => {
                warn!(error = %err, "failed to read auth cache, starting signed out");
                None
            }
        });
        if seeded.is_some() {
            debug!("pre-seeded auth state from advisory cache");
        }

        let (state, _) = watch::channel(SessionState::boot(seeded));

        Self {
            provider,
            cache,
            state,
            seq: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state tuple.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Read-only change stream over the state tuple.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Handle to the configured identity provider.
    pub fn provider(&self) -> Arc<dyn IdentityProvider> {
        Arc::clone(&self.provider)
    }

    /// Overwrite the identity half of the pair.
    ///
    /// Incremental escape hatch (e.g. a profile edit); keeping it paired
    /// with the session is the caller's responsibility. Provider-driven
    /// paths go through [`set_authenticated`](Self::set_authenticated)
    /// instead.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.state.send_modify(|state| state.identity = identity);
        self.persist();
    }

    /// Overwrite the session half of the pair. Same contract as
    /// [`set_identity`](Self::set_identity).
    pub fn set_session(&self, session: Option<AuthSession>) {
        self.state.send_modify(|state| state.session = session);
        self.persist();
    }

    /// Replace the whole pair from one provider answer.
    ///
    /// The identity is derived from the session itself, so this path can
    /// never leave one half of the pair behind.
    pub fn set_authenticated(&self, session: Option<AuthSession>) {
        self.state.send_modify(|state| apply_pair(state, session));
        self.persist();
    }

    /// Drop identity and session; the readiness flags are untouched.
    pub fn clear(&self) {
        self.state.send_modify(|state| {
            state.identity = None;
            state.session = None;
        });
        self.persist();
    }

    /// Query the identity provider and settle the state tuple.
    ///
    /// Always settles the flags (`initialized = true, loading = false`)
    /// unless a newer call was issued while this one was in flight; then the
    /// whole result, pair and flags alike, is discarded and the newer call
    /// settles the state instead. A provider failure keeps the previously
    /// held pair, so a transient outage never signs anyone out.
    pub async fn initialize(&self) {
        // The ticket is issued inside the same update that raises the flag,
        // so a settle can never observe one without the other.
        let mut ticket = 0;
        self.state.send_modify(|state| {
            ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
        });
        debug!(request = ticket, "querying identity provider for current session");

        let result = self.provider.current_session().await;

        let applied = self.state.send_if_modified(|state| {
            // A newer request owns the state now, flags included.
            if self.seq.load(Ordering::SeqCst) != ticket {
                return false;
            }
            if let Ok(session) = &result {
                apply_pair(state, session.clone());
            }
            state.initialized = true;
            state.loading = false;
            true
        });

        if !applied {
            debug!(request = ticket, "discarding stale session query result");
            return;
        }
        if let Err(err) = &result {
            warn!(error = %err, "identity provider query failed, keeping previous session state");
        }
        self.persist();
    }

    // Mirror the pair to the advisory cache; a present pair is stored, an
    // incomplete or absent one deletes the entry. Failures are logged only.
    fn persist(&self) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };

        let pair = {
            let state = self.state.borrow();
            match (&state.identity, &state.session) {
                (Some(identity), Some(session)) => Some(CachedAuth {
                    identity: identity.clone(),
                    session: session.clone(),
                }),
                _ => None,
            }
        };

        let result = match &pair {
            Some(cached) => cache.store(cached),
            None => cache.delete(),
        };
        if let Err(err) = result {
            warn!(error = %err, "failed to update auth cache");
        }
    }
}
