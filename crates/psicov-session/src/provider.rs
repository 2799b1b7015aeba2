//! Identity-provider port

use crate::events::AuthEvents;
use crate::models::AuthSession;
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by identity-provider implementations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Could not reach the provider
    #[error("connection failed: {0}")]
    Connection(String),

    /// The provider did not answer in time
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The provider rejected the presented credentials
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The provider answered with an error status
    #[error("provider error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider's response could not be decoded
    #[error("malformed provider response: {0}")]
    Decode(String),
}

/// External authority issuing and validating sessions.
///
/// The session core consumes exactly two capabilities: a query for the
/// current session and a subscription to pushed auth events. Sign-in
/// mechanics and token formats stay inside the implementation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Query the provider for the currently valid session, if any.
    ///
    /// Implementations may refresh an almost-expired session as part of the
    /// query; whatever comes back is the session to treat as current.
    async fn current_session(&self) -> Result<Option<AuthSession>, ProviderError>;

    /// Open a subscription to the provider's auth-event stream.
    fn subscribe(&self) -> AuthEvents;
}
