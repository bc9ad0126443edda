//! Session configuration parsed from environment variables.

use std::time::Duration;

use crate::util::auth::{GuardOptions, RedirectPolicy};

pub const DEFAULT_API_BASE_URL: &str = "/api";
pub const DEFAULT_STORAGE_PREFIX: &str = "tiffin.session.";
pub const DEFAULT_SIGN_IN_PATH: &str = "/signin";
pub const DEFAULT_FORBIDDEN_PATH: &str = "/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// How a stored session is treated when the app starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartupPolicy {
    /// Confirm the stored access token with the backend before authenticating.
    #[default]
    VerifyThenTrust,
    /// Authenticate from the cached user immediately; validate later via `verify()`.
    TrustThenVerify,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub api_base_url: String,
    pub storage_prefix: String,
    pub sign_in_path: String,
    pub forbidden_path: String,
    /// Grace delay before redirecting an unauthenticated visitor; `0` redirects immediately.
    pub redirect_grace_ms: u64,
    pub startup_policy: StartupPolicy,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_owned(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_owned(),
            forbidden_path: DEFAULT_FORBIDDEN_PATH.to_owned(),
            redirect_grace_ms: 0,
            startup_policy: StartupPolicy::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl SessionConfig {
    /// Build typed session config from environment variables.
    ///
    /// All optional:
    /// - `TIFFIN_API_BASE_URL`: default `/api`
    /// - `TIFFIN_STORAGE_PREFIX`: default `tiffin.session.`
    /// - `TIFFIN_SIGN_IN_PATH`: default `/signin`
    /// - `TIFFIN_FORBIDDEN_PATH`: default `/`
    /// - `TIFFIN_REDIRECT_GRACE_MS`: default 0 (immediate redirect)
    /// - `TIFFIN_STARTUP_POLICY`: `verify` (default) or `trust`
    /// - `TIFFIN_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TIFFIN_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for an unknown startup policy.
    pub fn from_env() -> Result<Self, ConfigError> {
        let startup_policy = parse_startup_policy(std::env::var("TIFFIN_STARTUP_POLICY").ok().as_deref())?;
        let api_base_url = std::env::var("TIFFIN_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        Ok(Self {
            api_base_url,
            storage_prefix: env_or("TIFFIN_STORAGE_PREFIX", DEFAULT_STORAGE_PREFIX),
            sign_in_path: env_or("TIFFIN_SIGN_IN_PATH", DEFAULT_SIGN_IN_PATH),
            forbidden_path: env_or("TIFFIN_FORBIDDEN_PATH", DEFAULT_FORBIDDEN_PATH),
            redirect_grace_ms: env_parse_u64("TIFFIN_REDIRECT_GRACE_MS", 0),
            startup_policy,
            request_timeout_secs: env_parse_u64("TIFFIN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse_u64("TIFFIN_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }

    pub fn redirect_policy(&self) -> RedirectPolicy {
        match self.redirect_grace_ms {
            0 => RedirectPolicy::Immediate,
            ms => RedirectPolicy::AfterGrace(Duration::from_millis(ms)),
        }
    }

    /// Guard options for a view open to any signed-in user.
    pub fn guard_options(&self) -> GuardOptions {
        GuardOptions {
            sign_in_path: self.sign_in_path.clone(),
            forbidden_path: self.forbidden_path.clone(),
            policy: self.redirect_policy(),
            required_role: None,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_startup_policy(raw: Option<&str>) -> Result<StartupPolicy, ConfigError> {
    match raw.unwrap_or("verify") {
        "verify" => Ok(StartupPolicy::VerifyThenTrust),
        "trust" => Ok(StartupPolicy::TrustThenVerify),
        other => Err(ConfigError::Parse(format!(
            "unknown TIFFIN_STARTUP_POLICY '{other}' (expected 'verify' or 'trust')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
