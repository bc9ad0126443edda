//! Process-wide session lifecycle: startup resolution, login, logout, and
//! recovery from rejected credentials.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `AuthSession` is built at app start and injected into views by
//! `AuthProvider`. Views observe it only through `subscribe()`; it never
//! touches the DOM.
//!
//! DESIGN
//! ======
//! `Initializing -> { Authenticated, Unauthenticated }`. Every transition goes
//! through `set_state`, which publishes on a `watch` channel and logs the
//! change. A session epoch is bumped on login, logout, and session teardown so
//! that results of requests started under an older session are dropped.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use tokio::sync::watch;

use super::auth::AuthState;
use super::refresh::TokenRefresher;
use super::token_store::{StorageBackend, TokenStore};
use crate::config::{SessionConfig, StartupPolicy};
use crate::net::api::{AuthApi, HttpAuthApi};
use crate::net::types::{AuthError, SessionTokens, UserData};

struct SessionInner {
    store: TokenStore,
    refresher: TokenRefresher,
    api: Rc<dyn AuthApi>,
    policy: StartupPolicy,
    epoch: Cell<u64>,
    state: watch::Sender<AuthState>,
}

/// Handle on the session state machine. Clones share state.
#[derive(Clone)]
pub struct AuthSession {
    inner: Rc<SessionInner>,
}

impl AuthSession {
    pub fn new(store: TokenStore, api: Rc<dyn AuthApi>, policy: StartupPolicy) -> Self {
        let refresher = TokenRefresher::new(store.clone(), Rc::clone(&api));
        let (state, _) = watch::channel(AuthState::Initializing);
        Self {
            inner: Rc::new(SessionInner { store, refresher, api, policy, epoch: Cell::new(0), state }),
        }
    }

    pub fn from_config(config: &SessionConfig, backend: Rc<dyn StorageBackend>, api: Rc<dyn AuthApi>) -> Self {
        Self::new(TokenStore::new(backend, config.storage_prefix.clone()), api, config.startup_policy)
    }

    /// Session over `backend` talking to the configured HTTP API.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn http(config: &SessionConfig, backend: Rc<dyn StorageBackend>) -> Result<Self, AuthError> {
        let api = HttpAuthApi::new(config)?;
        Ok(Self::from_config(config, backend, Rc::new(api)))
    }

    /// Session backed by `window.localStorage` and the configured HTTP API.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HttpClientBuild`] if the HTTP client cannot be built.
    #[cfg(feature = "hydrate")]
    pub fn browser(config: &SessionConfig) -> Result<Self, AuthError> {
        Self::http(config, Rc::new(super::token_store::BrowserStorage))
    }

    pub fn state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    pub fn store(&self) -> &TokenStore {
        &self.inner.store
    }

    pub fn policy(&self) -> StartupPolicy {
        self.inner.policy
    }

    // =========================================================================
    // STARTUP
    // =========================================================================

    /// Resolve the stored session into `Authenticated` or `Unauthenticated`.
    pub async fn initialize(&self) -> AuthState {
        self.set_state(AuthState::Initializing);

        let stored = match self.inner.store.load() {
            Ok(stored) => stored,
            Err(AuthError::NoTokens) => {
                tracing::debug!("no stored session");
                self.set_state(AuthState::Unauthenticated);
                return self.state();
            }
            Err(e @ AuthError::Storage(_)) => {
                tracing::warn!(error = %e, "session storage unavailable; starting logged out");
                self.set_state(AuthState::Unauthenticated);
                return self.state();
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "stored session unreadable");
                self.end_session();
                return self.state();
            }
        };

        if self.inner.policy == StartupPolicy::TrustThenVerify {
            if let (Some(_), Some(user)) = (stored.access_token.as_ref(), stored.user) {
                tracing::debug!(user_id = %user.id, "trusting cached session");
                self.set_state(AuthState::Authenticated(user));
                return self.state();
            }
        }

        self.verify().await
    }

    /// Confirm the stored access token with the backend, refreshing once if it
    /// is rejected.
    ///
    /// A network failure leaves the stored tokens in place: an unresolved
    /// session becomes `Unauthenticated`, an already authenticated one stays.
    pub async fn verify(&self) -> AuthState {
        let epoch = self.epoch();

        let access_token = match self.inner.store.access_token() {
            Some(token) => token,
            None => match self.inner.refresher.refresh_access_token().await {
                Some(token) => token,
                None => return self.fail_if_current(epoch),
            },
        };

        let result = match self.inner.api.validate(&access_token).await {
            Err(e) if e.is_auth_failure() => {
                tracing::info!(code = e.error_code(), "stored access token rejected; refreshing");
                match self.inner.refresher.refresh_access_token().await {
                    Some(token) => self.inner.api.validate(&token).await,
                    None => return self.fail_if_current(epoch),
                }
            }
            other => other,
        };

        if !self.is_current(epoch) {
            return self.state();
        }
        match result {
            Ok(user) => self.accept(user),
            Err(e) if e.is_auth_failure() => self.end_session(),
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "session verification unavailable");
                if self.state().is_loading() {
                    self.set_state(AuthState::Unauthenticated);
                }
            }
        }
        self.state()
    }

    // =========================================================================
    // RECOVERY
    // =========================================================================

    /// React to a protected call rejected with an auth error.
    ///
    /// Returns `true` if a refreshed token is now stored and the session is
    /// authenticated; on refresh failure the session is cleared.
    pub async fn handle_auth_failure(&self) -> bool {
        self.recover().await.is_ok() && self.state().is_authenticated()
    }

    /// Refresh after an auth rejection and hand back the new access token.
    ///
    /// The token is returned even when the follow-up profile load fails on
    /// the network, leaving the state unresolved for the caller's retry.
    async fn recover(&self) -> Result<String, AuthError> {
        let epoch = self.epoch();
        let Some(token) = self.inner.refresher.refresh_access_token().await else {
            self.fail_if_current(epoch);
            return Err(AuthError::RefreshFailed);
        };
        if !self.is_current(epoch) {
            return Err(AuthError::RefreshFailed);
        }

        let known_user = self.state().user().cloned().or_else(|| self.inner.store.user_data());
        if let Some(user) = known_user {
            self.set_state(AuthState::Authenticated(user));
            return Ok(token);
        }

        let validated = self.inner.api.validate(&token).await;
        if !self.is_current(epoch) {
            return Err(AuthError::RefreshFailed);
        }
        match validated {
            Ok(user) => {
                self.accept(user);
                Ok(token)
            }
            Err(e) if e.is_auth_failure() => {
                self.end_session();
                Err(AuthError::RefreshFailed)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not load user after refresh");
                Ok(token)
            }
        }
    }

    /// Run a protected call with the current access token, refreshing and
    /// retrying once if the backend rejects it.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NoTokens`] if no session is stored.
    /// - [`AuthError::RefreshFailed`] if the token was missing or rejected and
    ///   could not be refreshed.
    /// - Any error from `call` other than the first auth rejection.
    pub async fn authorized<T, F, Fut>(&self, call: F) -> Result<T, AuthError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, AuthError>>,
    {
        let token = match self.inner.store.access_token() {
            Some(token) => token,
            None if !self.inner.store.has_tokens() => return Err(AuthError::NoTokens),
            None => self.recover().await?,
        };

        match call(token).await {
            Err(AuthError::Unauthorized { status }) => {
                tracing::info!(status, "protected call rejected; refreshing session");
                let token = self.recover().await?;
                call(token).await
            }
            other => other,
        }
    }

    /// Refresh the access token without changing session state.
    pub async fn refresh_access_token(&self) -> Option<String> {
        self.inner.refresher.refresh_access_token().await
    }

    // =========================================================================
    // LOGIN / LOGOUT
    // =========================================================================

    /// Record a completed credential exchange: persist and authenticate.
    pub fn login(&self, tokens: &SessionTokens, user: UserData) {
        self.next_epoch();
        self.inner.refresher.invalidate();
        self.inner.store.save(tokens, &user);
        tracing::info!(user_id = %user.id, role = ?user.role, "logged in");
        self.set_state(AuthState::Authenticated(user));
    }

    /// End the session locally, optionally notifying the backend.
    ///
    /// Local state is cleared before the backend is contacted, so logout takes
    /// effect even if the backend call fails or never returns.
    pub async fn logout(&self, call_backend: bool) {
        let access_token = self.inner.store.access_token();
        self.end_session();
        tracing::info!(call_backend, "logged out");

        if !call_backend {
            return;
        }
        let Some(token) = access_token else {
            return;
        };
        if let Err(e) = self.inner.api.logout(&token).await {
            tracing::warn!(error = %e, code = e.error_code(), "backend logout failed; local session already cleared");
        }
    }

    /// Abandon in-flight work without touching storage. Late results from
    /// requests already started are ignored.
    pub fn teardown(&self) {
        self.next_epoch();
        self.inner.refresher.invalidate();
        tracing::debug!("session torn down");
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn accept(&self, user: UserData) {
        self.inner.store.set_user_data(&user);
        self.set_state(AuthState::Authenticated(user));
    }

    fn end_session(&self) {
        self.next_epoch();
        self.inner.refresher.invalidate();
        self.inner.store.clear();
        self.set_state(AuthState::Unauthenticated);
    }

    fn fail_if_current(&self, epoch: u64) -> AuthState {
        if self.is_current(epoch) {
            tracing::info!("session could not be refreshed; clearing");
            self.end_session();
        }
        self.state()
    }

    fn epoch(&self) -> u64 {
        self.inner.epoch.get()
    }

    fn next_epoch(&self) {
        self.inner.epoch.set(self.inner.epoch.get() + 1);
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.inner.epoch.get() == epoch
    }

    fn set_state(&self, next: AuthState) {
        self.inner.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            tracing::info!(from = current.label(), to = next.label(), "auth state changed");
            *current = next;
            true
        });
    }
}
