//! Common test utilities for psicov-session integration tests.
//!
//! Provides a scripted identity provider whose per-call settlement can be
//! gated (for deterministic interleavings), a navigator that records
//! navigation commands, and session fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use psicov_session::{
    AuthEvent, AuthEventBus, AuthEvents, AuthSession, Identity, IdentityProvider, Navigator,
    ProviderError, SessionState, UserRole,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Build a principal with the given email and role.
pub fn identity(email: &str, role: UserRole) -> Identity {
    Identity {
        id: Uuid::new_v4(),
        email: email.to_string(),
        first_name: None,
        last_name: None,
        role,
        created_at: Utc::now(),
    }
}

/// Build a live session for the given principal.
pub fn session_for(email: &str, role: UserRole) -> AuthSession {
    AuthSession {
        access_token: format!("access-{email}"),
        token_type: "bearer".to_string(),
        refresh_token: format!("refresh-{email}"),
        expires_at: Utc::now() + chrono::Duration::hours(1),
        identity: identity(email, role),
    }
}

// ---------------------------------------------------------------------------
// ScriptedProvider - scripted session queries with optional gates
// ---------------------------------------------------------------------------

type SessionAnswer = Result<Option<AuthSession>, ProviderError>;

struct ScriptedCall {
    gate: Option<oneshot::Receiver<()>>,
    answer: SessionAnswer,
}

/// Identity provider whose `current_session` answers come from a script.
///
/// Each scripted answer may carry a gate; a gated call does not settle until
/// the test releases the gate, which makes overlapping-query interleavings
/// deterministic.
pub struct ScriptedProvider {
    calls: Mutex<VecDeque<ScriptedCall>>,
    bus: AuthEventBus,
    query_count: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(VecDeque::new()),
            bus: AuthEventBus::new(),
            query_count: AtomicUsize::new(0),
        })
    }

    /// Script an immediate answer of a live session.
    pub fn answer_session(&self, session: AuthSession) {
        self.push(None, Ok(Some(session)));
    }

    /// Script an immediate answer of "no live session".
    pub fn answer_none(&self) {
        self.push(None, Ok(None));
    }

    /// Script an immediate failure.
    pub fn answer_error(&self, err: ProviderError) {
        self.push(None, Err(err));
    }

    /// Script a live-session answer that settles only when the returned
    /// sender is triggered.
    pub fn answer_session_gated(&self, session: AuthSession) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(Some(rx), Ok(Some(session)));
        tx
    }

    /// Script a "no live session" answer behind a gate.
    pub fn answer_none_gated(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(Some(rx), Ok(None));
        tx
    }

    /// Push an auth event to every subscriber.
    pub fn emit(&self, event: AuthEvent) {
        self.bus.emit(event);
    }

    /// Number of `current_session` calls issued so far (counted at call
    /// start, before any gate).
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    /// Number of live event subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    fn push(&self, gate: Option<oneshot::Receiver<()>>, answer: SessionAnswer) {
        self.calls
            .lock()
            .unwrap()
            .push_back(ScriptedCall { gate, answer });
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn current_session(&self) -> SessionAnswer {
        let call = self
            .calls
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted answer left for current_session");
        self.query_count.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = call.gate {
            // A dropped gate releases the call, so teardown never hangs.
            let _ = gate.await;
        }
        call.answer
    }

    fn subscribe(&self) -> AuthEvents {
        self.bus.subscribe()
    }
}

// ---------------------------------------------------------------------------
// RecordingNavigator - captures navigation commands
// ---------------------------------------------------------------------------

/// Navigator that records every navigation command it receives.
#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All recorded target paths, in order.
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    /// Number of navigation commands received.
    pub fn navigation_count(&self) -> usize {
        self.paths.lock().unwrap().len()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Wait until the watched session state satisfies `pred`, with a safety
/// timeout, and return a snapshot of it.
pub async fn wait_for_state(
    rx: &mut watch::Receiver<SessionState>,
    pred: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timed out waiting for session state")
        .expect("session store dropped")
        .clone()
}

/// Poll `cond` until it holds, with a safety timeout.
pub async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let poll = async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    };
    if tokio::time::timeout(Duration::from_secs(2), poll).await.is_err() {
        panic!("timed out waiting until {what}");
    }
}

/// Install a test subscriber once so RUST_LOG shows store activity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
