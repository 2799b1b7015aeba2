//! # psicov-session
//!
//! Client-side session core for the PsicoVirtuale dashboard: a session
//! store holding the current identity/session pair plus readiness flags,
//! and an auth synchronizer that keeps the store consistent with the
//! identity provider's pushed events.
//!
//! ## Components
//!
//! - **Session store** ([`SessionStore`]): single source of truth for "who
//!   is signed in, with what session, and is that answer ready yet";
//!   observable through a watch channel, optionally persisted across
//!   restarts via an advisory cache.
//! - **Auth synchronizer** ([`AuthSynchronizer`]): background task that
//!   turns provider-pushed auth events into full state refreshes and forces
//!   navigation to the login entry point on sign-out.
//! - **Ports**: [`IdentityProvider`] (session query + event stream),
//!   [`SessionCache`] (advisory persistence), [`Navigator`] (navigation
//!   capability of the hosting application).
//!
//! ## Example
//!
//! ```rust,ignore
//! use psicov_session::{AuthSynchronizer, ConfigPaths, FileSessionCache, SessionStore};
//! use std::sync::Arc;
//!
//! let paths = ConfigPaths::new()?;
//! let cache = Arc::new(FileSessionCache::new(&paths)?);
//! let store = Arc::new(SessionStore::with_cache(provider, cache));
//!
//! let sync = AuthSynchronizer::mount(Arc::clone(&store), navigator);
//! // ... application shell runs, consumers watch store.subscribe() ...
//! sync.unmount().await;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod navigator;
pub mod provider;
pub mod store;
pub mod sync;

pub use cache::{CachedAuth, FileSessionCache, MemorySessionCache, SessionCache};
pub use config::ConfigPaths;
pub use error::{SessionError, SessionResult};
pub use events::{AuthEvent, AuthEventBus, AuthEvents};
pub use models::{AuthSession, Identity, UserRole};
pub use navigator::{Navigator, LOGIN_PATH};
pub use provider::{IdentityProvider, ProviderError};
pub use store::{SessionState, SessionStore};
pub use sync::{AuthSynchronizer, SyncHandle};
