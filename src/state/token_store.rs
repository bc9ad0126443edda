//! Persistent session credentials: access token, refresh token, cached user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only owner of stored credentials. `TokenRefresher` writes refreshed
//! tokens through it and `AuthSession` reads it on startup and clears it on
//! logout or an unrecoverable refresh failure.
//!
//! TRADE-OFFS
//! ==========
//! Storage is best-effort: when the medium is unavailable every read returns
//! `None`/`false` and writes log a warning and do nothing, which the session
//! treats as logged-out.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::net::types::{AuthError, SessionTokens, UserData};

const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";
const USER_KEY: &str = "user";

// =============================================================================
// STORAGE BACKENDS
// =============================================================================

/// Synchronous key-value medium the token store persists into.
pub trait StorageBackend {
    /// # Errors
    ///
    /// [`AuthError::Storage`] if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    /// # Errors
    ///
    /// [`AuthError::Storage`] if the medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;

    /// # Errors
    ///
    /// [`AuthError::Storage`] if the medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

/// In-memory backend for SSR and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Backend for a disabled medium (private browsing, blocked cookies).
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, AuthError> {
        Err(AuthError::Storage("storage unavailable".to_owned()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), AuthError> {
        Err(AuthError::Storage("storage unavailable".to_owned()))
    }

    fn remove(&self, _key: &str) -> Result<(), AuthError> {
        Err(AuthError::Storage("storage unavailable".to_owned()))
    }
}

/// `window.localStorage` backend.
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
impl BrowserStorage {
    fn storage() -> Result<web_sys::Storage, AuthError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| AuthError::Storage("localStorage unavailable".to_owned()))
    }
}

#[cfg(feature = "hydrate")]
impl StorageBackend for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| AuthError::Storage(format!("read failed: {key}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| AuthError::Storage(format!("write failed: {key}")))
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|_| AuthError::Storage(format!("remove failed: {key}")))
    }
}

// =============================================================================
// TOKEN STORE
// =============================================================================

/// Raw stored session as read at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredSession {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserData>,
}

/// Namespaced credential storage over a [`StorageBackend`].
#[derive(Clone)]
pub struct TokenStore {
    backend: Rc<dyn StorageBackend>,
    prefix: String,
}

impl TokenStore {
    pub fn new(backend: Rc<dyn StorageBackend>, prefix: impl Into<String>) -> Self {
        Self { backend, prefix: prefix.into() }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    /// Persist a full session after login.
    pub fn save(&self, tokens: &SessionTokens, user: &UserData) {
        self.write(ACCESS_TOKEN_KEY, &tokens.access_token);
        self.write(REFRESH_TOKEN_KEY, &tokens.refresh_token);
        match serde_json::to_string(user) {
            Ok(raw) => self.write(USER_KEY, &raw),
            Err(e) => tracing::warn!(error = %e, "user data not serializable; skipping cache"),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn set_access_token(&self, token: &str) {
        self.write(ACCESS_TOKEN_KEY, token);
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.write(REFRESH_TOKEN_KEY, token);
    }

    /// Replace the cached user after a successful validation.
    pub fn set_user_data(&self, user: &UserData) {
        match serde_json::to_string(user) {
            Ok(raw) => self.write(USER_KEY, &raw),
            Err(e) => tracing::warn!(error = %e, "user data not serializable; skipping cache"),
        }
    }

    /// True when either credential is stored.
    pub fn has_tokens(&self) -> bool {
        self.access_token().is_some() || self.refresh_token().is_some()
    }

    /// Cached user, or `None` if absent, malformed, or orphaned (no tokens).
    pub fn user_data(&self) -> Option<UserData> {
        if !self.has_tokens() {
            self.purge_orphaned_user();
            return None;
        }
        let raw = self.read(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Read the whole stored session, distinguishing the failure kinds the
    /// session state machine reacts to differently.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Storage`] if the medium cannot be read.
    /// - [`AuthError::NoTokens`] if no credential is stored.
    /// - [`AuthError::MalformedStoredData`] if the cached user cannot be decoded.
    pub fn load(&self) -> Result<StoredSession, AuthError> {
        let access_token = non_empty(self.backend.get(&self.key(ACCESS_TOKEN_KEY))?);
        let refresh_token = non_empty(self.backend.get(&self.key(REFRESH_TOKEN_KEY))?);
        if access_token.is_none() && refresh_token.is_none() {
            self.purge_orphaned_user();
            return Err(AuthError::NoTokens);
        }
        let user = match self.backend.get(&self.key(USER_KEY))? {
            Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| AuthError::MalformedStoredData(e.to_string()))?),
            None => None,
        };
        Ok(StoredSession { access_token, refresh_token, user })
    }

    /// Remove every stored credential and the cached user.
    pub fn clear(&self) {
        for name in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.backend.remove(&self.key(name)) {
                tracing::warn!(error = %e, key = name, "token store clear failed");
            }
        }
    }

    fn purge_orphaned_user(&self) {
        if matches!(self.backend.get(&self.key(USER_KEY)), Ok(Some(_))) {
            tracing::debug!("dropping cached user with no stored tokens");
            if let Err(e) = self.backend.remove(&self.key(USER_KEY)) {
                tracing::warn!(error = %e, key = USER_KEY, "orphaned user purge failed");
            }
        }
    }

    fn read(&self, name: &str) -> Option<String> {
        match self.backend.get(&self.key(name)) {
            Ok(value) => non_empty(value),
            Err(e) => {
                tracing::warn!(error = %e, key = name, "token store read failed; treating as logged out");
                None
            }
        }
    }

    fn write(&self, name: &str, value: &str) {
        if let Err(e) = self.backend.set(&self.key(name), value) {
            tracing::warn!(error = %e, key = name, "token store write failed");
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
