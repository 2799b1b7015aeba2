//! Auth synchronizer: bridges provider-pushed auth events into the store
//!
//! Mounting spawns a background task that runs one initialization and then
//! applies every provider event in arrival order: sign-in and token-refresh
//! events trigger a full provider round-trip (never a patch from the event
//! payload), a sign-out clears the store and navigates to the login entry
//! point. Unmounting cancels the subscription; a refresh in flight when the
//! cancellation lands is discarded without touching the store.

use crate::events::AuthEvent;
use crate::navigator::{Navigator, LOGIN_PATH};
use crate::store::SessionStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Bridges the identity provider's auth-event stream into a [`SessionStore`].
pub struct AuthSynchronizer;

impl AuthSynchronizer {
    /// Subscribe to the store's provider and spawn the event loop.
    ///
    /// The subscription is registered before the initial query settles, so
    /// no event emitted during the first round-trip is missed.
    pub fn mount(store: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> SyncHandle {
        let mut events = store.provider().subscribe();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            info!("auth synchronizer mounted");

            // Initial refresh, raced against unmount so a late answer
            // cannot land in a store nobody is watching anymore.
            tokio::select! {
                biased;
                () = token.cancelled() => return,
                () = store.initialize() => {}
            }

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    event = events.recv() => match event {
                        Some(AuthEvent::SignedIn(_)) | Some(AuthEvent::TokenRefreshed(_)) => {
                            debug!("auth event received, refreshing session state");
                            tokio::select! {
                                biased;
                                () = token.cancelled() => break,
                                () = store.initialize() => {}
                            }
                        }
                        Some(AuthEvent::SignedOut) => {
                            info!("signed out by provider, navigating to login");
                            store.clear();
                            navigator.navigate(LOGIN_PATH);
                        }
                        None => break,
                    }
                }
            }

            info!("auth synchronizer unmounted");
        });

        SyncHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Scoped handle to a mounted synchronizer.
///
/// [`unmount`](Self::unmount) cancels the subscription and waits for the
/// event loop to wind down; once it returns, no further store mutation can
/// occur. Dropping the handle cancels the loop without waiting.
pub struct SyncHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Cancel the subscription and wait for the event loop to finish.
    pub async fn unmount(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
