//! HTTP identity provider

use crate::models::{ErrorPayload, SessionPayload};
use async_trait::async_trait;
use psicov_session::{
    AuthEvent, AuthEventBus, AuthEvents, AuthSession, IdentityProvider, ProviderError,
    SessionError, SessionResult,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Window before expiry inside which a session is refreshed ahead of use
const REFRESH_AHEAD_MINUTES: i64 = 5;

/// Timeout for auth requests
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the auth service.
#[derive(Debug, Clone)]
pub struct RestProviderConfig {
    /// Base URL of the auth endpoints, without a trailing slash
    pub base_url: String,

    /// Project API key sent with every request
    pub anon_key: String,
}

impl RestProviderConfig {
    /// Create connection settings with explicit values
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            base_url,
            anon_key: anon_key.into(),
        }
    }

    /// Read connection settings from `PSICOV_AUTH_URL` and
    /// `PSICOV_AUTH_ANON_KEY`
    pub fn from_env() -> SessionResult<Self> {
        let base_url = std::env::var("PSICOV_AUTH_URL")
            .map_err(|_| SessionError::Config("PSICOV_AUTH_URL is not set".to_string()))?;
        let anon_key = std::env::var("PSICOV_AUTH_ANON_KEY")
            .map_err(|_| SessionError::Config("PSICOV_AUTH_ANON_KEY is not set".to_string()))?;

        Ok(Self::new(base_url, anon_key))
    }
}

/// Identity provider backed by the auth service's REST endpoints.
///
/// Holds the current session in memory and refreshes it ahead of expiry, so
/// `current_session` always answers with a token that is still usable.
/// Sign-ins, refreshes, and sign-outs are announced on the event bus.
pub struct RestIdentityProvider {
    http: Client,
    config: RestProviderConfig,
    bus: AuthEventBus,
    session: Mutex<Option<AuthSession>>,
}

impl RestIdentityProvider {
    /// Create a provider for the given auth service.
    pub fn new(config: RestProviderConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Connection(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            bus: AuthEventBus::new(),
            session: Mutex::new(None),
        })
    }

    /// Get a reference to the connection settings
    pub fn config(&self) -> &RestProviderConfig {
        &self.config
    }

    /// Seed the held session, typically from a persisted copy at startup.
    ///
    /// The session is not validated here; the next `current_session` call
    /// refreshes it if it turns out to be stale.
    pub async fn restore_session(&self, session: AuthSession) {
        *self.session.lock().await = Some(session);
    }

    /// Exchange an email/password pair for a session.
    ///
    /// On success the session becomes the held one and `SignedIn` is
    /// announced on the event bus.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ProviderError> {
        let response = self
            .http
            .post(format!("{}/token", self.config.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        let payload: SessionPayload = response.json().await.map_err(request_error)?;
        let session = payload.into_session();

        *self.session.lock().await = Some(session.clone());
        info!(user = %session.identity.id, "signed in");
        self.bus.emit(AuthEvent::SignedIn(session.clone()));

        Ok(session)
    }

    /// End the current session.
    ///
    /// The revocation call is best-effort: the held session is dropped and
    /// `SignedOut` announced even when the service cannot be reached.
    pub async fn sign_out(&self) {
        let session = self.session.lock().await.take();

        if let Some(session) = &session {
            let result = self
                .http
                .post(format!("{}/logout", self.config.base_url))
                .header("apikey", &self.config.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;

            match result {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "logout rejected by auth service");
                }
                Err(err) => {
                    warn!(error = %err, "could not reach auth service for logout");
                }
                Ok(_) => {}
            }
        }

        self.bus.emit(AuthEvent::SignedOut);
    }

    /// Exchange the refresh token for a replacement session.
    ///
    /// `Ok(None)` means the service definitively rejected the refresh token;
    /// transport and server failures come back as errors so the caller can
    /// keep the session it has.
    async fn refresh(&self, refresh_token: &str) -> Result<Option<AuthSession>, ProviderError> {
        let response = self
            .http
            .post(format!("{}/token", self.config.base_url))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let reason = decode_error_body(response).await;
            info!(%status, reason = %reason, "refresh token rejected, session is over");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        let payload: SessionPayload = response.json().await.map_err(request_error)?;
        Ok(Some(payload.into_session()))
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn current_session(&self) -> Result<Option<AuthSession>, ProviderError> {
        let mut held = self.session.lock().await;

        let Some(session) = held.as_ref() else {
            return Ok(None);
        };

        if !session.expires_within(chrono::Duration::minutes(REFRESH_AHEAD_MINUTES)) {
            return Ok(Some(session.clone()));
        }

        debug!("access token inside the refresh window, refreshing");
        let refresh_token = session.refresh_token.clone();
        match self.refresh(&refresh_token).await {
            Ok(Some(renewed)) => {
                *held = Some(renewed.clone());
                self.bus.emit(AuthEvent::TokenRefreshed(renewed.clone()));
                Ok(Some(renewed))
            }
            Ok(None) => {
                *held = None;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn subscribe(&self) -> AuthEvents {
        self.bus.subscribe()
    }
}

/// Map a transport-level failure onto the provider error taxonomy.
fn request_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else if err.is_decode() {
        ProviderError::Decode(err.to_string())
    } else {
        ProviderError::Connection(err.to_string())
    }
}

/// Build an `Api` error from a non-success response, salvaging the error
/// body when one is readable.
async fn api_error(status: StatusCode, response: reqwest::Response) -> ProviderError {
    ProviderError::Api {
        status: status.as_u16(),
        message: decode_error_body(response).await,
    }
}

async fn decode_error_body(response: reqwest::Response) -> String {
    match response.json::<ErrorPayload>().await {
        Ok(payload) => payload.message(),
        Err(_) => "unreadable error body".to_string(),
    }
}
