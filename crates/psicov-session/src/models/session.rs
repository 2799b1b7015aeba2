//! Credential grant tied to an identity

use crate::models::Identity;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A live credential grant issued by the identity provider.
///
/// Token material and refresh metadata are owned by the provider and opaque
/// to this crate; the session is replaced wholesale on refresh, never
/// patched. At most one session is current per process context.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Opaque access token presented as a bearer credential
    pub access_token: String,

    /// Token type (always "bearer")
    pub token_type: String,

    /// Opaque token used to obtain a replacement session
    pub refresh_token: String,

    /// Instant the access token stops being accepted
    pub expires_at: DateTime<Utc>,

    /// Principal this grant was issued to
    pub identity: Identity,
}

impl AuthSession {
    /// Check if the access token has already expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if the access token expires within the given window
    pub fn expires_within(&self, window: Duration) -> bool {
        Utc::now() + window >= self.expires_at
    }
}

// Token material stays out of logs and debug output.
impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("identity", &self.identity)
            .finish()
    }
}
