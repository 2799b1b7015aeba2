//! Wire types for the auth service's REST endpoints

use chrono::{DateTime, Duration, Utc};
use psicov_session::{AuthSession, Identity, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response from the token endpoint (password grant or refresh)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    /// JWT access token
    pub access_token: String,

    /// Token type (always "bearer")
    pub token_type: String,

    /// Seconds until the access token expires
    pub expires_in: i64,

    /// Refresh token for obtaining a replacement session
    pub refresh_token: String,

    /// The principal the tokens were issued to
    pub user: UserPayload,
}

impl SessionPayload {
    /// Convert the wire payload into a session, anchoring the relative
    /// expiry to the local clock.
    pub fn into_session(self) -> AuthSession {
        // The expiry is provider-controlled; an out-of-range value
        // saturates instead of panicking.
        let expires_at = match Duration::try_seconds(self.expires_in)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        {
            Some(at) => at,
            None if self.expires_in >= 0 => DateTime::<Utc>::MAX_UTC,
            None => DateTime::<Utc>::MIN_UTC,
        };

        AuthSession {
            access_token: self.access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token,
            expires_at,
            identity: self.user.into_identity(),
        }
    }
}

/// User record as the auth endpoints return it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    /// Stable user id
    pub id: Uuid,

    /// Sign-in email address
    pub email: String,

    /// Profile attributes captured at sign-up
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,

    /// Account creation time
    pub created_at: DateTime<Utc>,
}

impl UserPayload {
    /// Flatten the nested metadata into an identity.
    ///
    /// Accounts created before roles existed carry no role attribute; they
    /// are treated as patients.
    pub fn into_identity(self) -> Identity {
        let metadata = self.user_metadata.unwrap_or_default();

        Identity {
            id: self.id,
            email: self.email,
            first_name: metadata.first_name,
            last_name: metadata.last_name,
            role: metadata.role.unwrap_or(UserRole::Patient),
            created_at: self.created_at,
        }
    }
}

/// Profile attributes nested under `user_metadata`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Given name
    #[serde(default)]
    pub first_name: Option<String>,

    /// Family name
    #[serde(default)]
    pub last_name: Option<String>,

    /// Product role; absent on accounts predating role capture
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Error body the auth endpoints return
///
/// The field carrying the human-readable text varies by endpoint, so every
/// known spelling is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Machine-readable error code
    #[serde(default)]
    pub error: Option<String>,

    /// Human-readable error description
    #[serde(default)]
    pub error_description: Option<String>,

    /// Alternate message field used by some endpoints
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorPayload {
    /// Pick the most descriptive message available.
    pub fn message(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}
