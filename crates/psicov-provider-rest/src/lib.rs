//! # REST Identity Provider
//!
//! HTTP implementation of the `psicov-session` identity-provider port.
//!
//! Talks to the hosted auth service's REST endpoints: password grant for
//! sign-in, refresh grant for token renewal, and logout for revocation. The
//! provider holds the current session in memory, refreshes it ahead of
//! expiry, and announces sign-ins, refreshes, and sign-outs on its event
//! bus so the session store can react.
//!
//! ## Example
//!
//! ```ignore
//! use psicov_provider_rest::{RestIdentityProvider, RestProviderConfig};
//! use psicov_session::SessionStore;
//! use std::sync::Arc;
//!
//! let config = RestProviderConfig::from_env()?;
//! let provider = Arc::new(RestIdentityProvider::new(config)?);
//!
//! let session = provider.sign_in_with_password("maria@example.com", "secret").await?;
//! let store = SessionStore::new(provider);
//! store.initialize().await;
//! ```

pub mod client;
pub mod models;

// Re-exports
pub use client::{RestIdentityProvider, RestProviderConfig};
pub use models::{ErrorPayload, SessionPayload, UserMetadata, UserPayload};
