//! Session DTOs and the error taxonomy shared by the auth layers.
//!
//! DESIGN
//! ======
//! Wire shapes mirror the backend's JSON so stored user records and `/auth/me`
//! responses deserialize through the same types.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Access/refresh credential pair issued at login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

// Token values stay out of logs and panic messages.
impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Which dashboard a user belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    /// Delivery agent with access to the captain dashboard.
    Captain,
}

/// Cached profile of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Backend user identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email, if the account has one.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number, if the account has one.
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

/// Result of a successful refresh exchange.
///
/// `refresh_token` is present only when the backend rotates refresh tokens.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for RefreshGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshGrant")
            .field("access_token", &"<redacted>")
            .field("rotated", &self.refresh_token.is_some())
            .finish()
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failure taxonomy for storage, refresh, and backend calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No session is stored. This is the normal logged-out state.
    #[error("no session tokens stored")]
    NoTokens,

    /// The backend rejected the presented credential (401/403).
    #[error("unauthorized: status {status}")]
    Unauthorized { status: u16 },

    /// The refresh token is invalid, expired, or revoked.
    #[error("token refresh failed")]
    RefreshFailed,

    /// Transport-level failure, including timeouts.
    #[error("network request failed: {0}")]
    Network(String),

    /// The backend returned a non-success status other than an auth failure.
    #[error("API response error: status {status}")]
    Api { status: u16, body: String },

    /// A response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The storage medium could not be read or written.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// A stored session record exists but cannot be decoded.
    #[error("malformed stored session data: {0}")]
    MalformedStoredData(String),

    /// The payload codec rejected a body.
    #[error("payload codec failed: {0}")]
    Codec(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl AuthError {
    /// Stable machine-readable code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoTokens => "E_NO_TOKENS",
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::RefreshFailed => "E_REFRESH_FAILED",
            Self::Network(_) => "E_NETWORK",
            Self::Api { .. } => "E_API_RESPONSE",
            Self::Parse(_) => "E_API_PARSE",
            Self::Storage(_) => "E_STORAGE",
            Self::MalformedStoredData(_) => "E_MALFORMED_STORED_DATA",
            Self::Codec(_) => "E_CODEC",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// True when the only remedy is a refresh or a fresh login.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::RefreshFailed | Self::MalformedStoredData(_))
    }
}
