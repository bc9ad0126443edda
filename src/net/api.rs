//! Remote auth API: token validation, refresh, and logout.
//!
//! The session layer only sees the [`AuthApi`] trait, so tests drive it with
//! scripted fakes and the browser build uses [`HttpAuthApi`] over `reqwest`.
//!
//! ERROR HANDLING
//! ==============
//! HTTP 401/403 map to [`AuthError::Unauthorized`] (or
//! [`AuthError::RefreshFailed`] on the refresh endpoint). Transport failures
//! and timeouts map to [`AuthError::Network`]. Nothing here retries.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::codec::{PayloadCodec, PlainCodec};
use super::types::{AuthError, RefreshGrant, UserData};
use crate::config::SessionConfig;

const ME_PATH: &str = "/auth/me";
const REFRESH_PATH: &str = "/auth/refresh";
const LOGOUT_PATH: &str = "/auth/logout";

// =============================================================================
// TRAIT
// =============================================================================

/// Backend operations the session lifecycle depends on.
///
/// Futures are not required to be `Send`: the browser event loop is
/// single-threaded and `reqwest` futures on wasm are `!Send`.
#[async_trait::async_trait(?Send)]
pub trait AuthApi {
    /// Validate an access token and return the user it belongs to.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthorized`] if the token is rejected, or a transport error.
    async fn validate(&self, access_token: &str) -> Result<UserData, AuthError>;

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// [`AuthError::RefreshFailed`] if the refresh token is rejected, or a transport error.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshGrant, AuthError>;

    /// Invalidate the session server-side.
    ///
    /// # Errors
    ///
    /// Any transport or status error; callers treat logout as best-effort.
    async fn logout(&self, access_token: &str) -> Result<(), AuthError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// `reqwest`-backed [`AuthApi`] speaking JSON with bearer authorization.
pub struct HttpAuthApi {
    http: reqwest::Client,
    base_url: String,
    codec: Box<dyn PayloadCodec>,
}

impl HttpAuthApi {
    /// Build a client from session config, using the plain JSON codec.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &SessionConfig) -> Result<Self, AuthError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs));
        let http = builder
            .build()
            .map_err(|e| AuthError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: resolve_base_url(&config.api_base_url), codec: Box::new(PlainCodec) })
    }

    /// Replace the payload codec applied to credential bodies.
    #[must_use]
    pub fn with_codec(mut self, codec: impl PayloadCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }
}

#[async_trait::async_trait(?Send)]
impl AuthApi for HttpAuthApi {
    async fn validate(&self, access_token: &str) -> Result<UserData, AuthError> {
        let response = self
            .http
            .get(self.endpoint(ME_PATH))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| AuthError::Network(e.to_string()))?;
        check_status(status, &text)?;
        parse_user(&self.codec.decode(&text)?)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshGrant, AuthError> {
        let payload = serde_json::json!({ "refresh_token": refresh_token }).to_string();
        let response = self
            .http
            .post(self.endpoint(REFRESH_PATH))
            .header("content-type", "application/json")
            .body(self.codec.encode(&payload)?)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| AuthError::Network(e.to_string()))?;
        check_refresh_status(status, &text)?;
        parse_refresh_grant(&self.codec.decode(&text)?)
    }

    async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.endpoint(LOGOUT_PATH))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        check_status(status, &text)
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{base_url}{path}")
}

/// Resolve a root-relative base URL against the page origin in the browser.
fn resolve_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    #[cfg(feature = "hydrate")]
    {
        if trimmed.starts_with('/') {
            if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
                return format!("{origin}{trimmed}");
            }
        }
    }
    trimmed.to_owned()
}

fn check_status(status: u16, body: &str) -> Result<(), AuthError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(AuthError::Unauthorized { status }),
        _ => Err(AuthError::Api { status, body: body.to_owned() }),
    }
}

/// The refresh endpoint reports a dead refresh token as 400, 401, or 403.
fn check_refresh_status(status: u16, body: &str) -> Result<(), AuthError> {
    match status {
        400 | 401 | 403 => Err(AuthError::RefreshFailed),
        _ => check_status(status, body),
    }
}

fn parse_user(json: &str) -> Result<UserData, AuthError> {
    serde_json::from_str(json).map_err(|e| AuthError::Parse(e.to_string()))
}

fn parse_refresh_grant(json: &str) -> Result<RefreshGrant, AuthError> {
    let grant: RefreshGrant = serde_json::from_str(json).map_err(|e| AuthError::Parse(e.to_string()))?;
    if grant.access_token.is_empty() {
        return Err(AuthError::Parse("empty access_token".to_owned()));
    }
    Ok(grant)
}
