//! Shared fixtures and scripted fakes for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use tokio::sync::oneshot;

use crate::net::api::AuthApi;
use crate::net::types::{AuthError, RefreshGrant, SessionTokens, UserData, UserRole};
use crate::state::token_store::{MemoryStorage, TokenStore};

pub const PREFIX: &str = "test.";

pub fn customer() -> UserData {
    UserData {
        id: "u1".to_owned(),
        name: "Asha".to_owned(),
        email: Some("asha@example.com".to_owned()),
        phone: None,
        role: UserRole::Customer,
    }
}

pub fn captain() -> UserData {
    UserData {
        id: "c1".to_owned(),
        name: "Ravi".to_owned(),
        email: None,
        phone: Some("+91 98000 00000".to_owned()),
        role: UserRole::Captain,
    }
}

pub fn tokens() -> SessionTokens {
    SessionTokens::new("access-1", "refresh-1")
}

pub fn grant(access: &str) -> RefreshGrant {
    RefreshGrant { access_token: access.to_owned(), refresh_token: None }
}

/// Empty memory-backed store plus a handle on the raw backend.
pub fn memory_store() -> (TokenStore, Rc<MemoryStorage>) {
    let backend = Rc::new(MemoryStorage::new());
    (TokenStore::new(backend.clone(), PREFIX), backend)
}

/// Memory-backed store already holding `tokens()` and `user`.
pub fn seeded_store(user: &UserData) -> (TokenStore, Rc<MemoryStorage>) {
    let (store, backend) = memory_store();
    store.save(&tokens(), user);
    (store, backend)
}

// =============================================================================
// FakeApi
// =============================================================================

/// Scripted [`AuthApi`].
///
/// `validate` accepts any access token registered via `accept_access` (and
/// any token a scripted refresh hands out). `refresh` pops scripted results,
/// defaulting to `RefreshFailed`.
#[derive(Default)]
pub struct FakeApi {
    user: RefCell<Option<UserData>>,
    valid_access: RefCell<HashSet<String>>,
    refresh_results: RefCell<VecDeque<Result<RefreshGrant, AuthError>>>,
    logout_result: RefCell<Option<AuthError>>,
    network_down: Cell<bool>,
    validate_network_down: Cell<bool>,
    refresh_gate: RefCell<Option<oneshot::Receiver<()>>>,
    pub validate_calls: Cell<usize>,
    pub refresh_calls: Cell<usize>,
    pub logout_calls: Cell<usize>,
    pub seen_refresh_tokens: RefCell<Vec<String>>,
}

impl FakeApi {
    pub fn new(user: UserData) -> Rc<Self> {
        let api = Self::default();
        *api.user.borrow_mut() = Some(user);
        Rc::new(api)
    }

    pub fn accept_access(&self, token: &str) {
        self.valid_access.borrow_mut().insert(token.to_owned());
    }

    pub fn push_refresh(&self, result: Result<RefreshGrant, AuthError>) {
        self.refresh_results.borrow_mut().push_back(result);
    }

    pub fn fail_logout(&self, err: AuthError) {
        *self.logout_result.borrow_mut() = Some(err);
    }

    pub fn set_network_down(&self, down: bool) {
        self.network_down.set(down);
    }

    /// Fail only `validate` on the network; refresh keeps working.
    pub fn set_validate_network_down(&self, down: bool) {
        self.validate_network_down.set(down);
    }

    /// Park the next refresh until the returned sender fires.
    pub fn hold_refresh(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.refresh_gate.borrow_mut() = Some(rx);
        tx
    }
}

#[async_trait::async_trait(?Send)]
impl AuthApi for FakeApi {
    async fn validate(&self, access_token: &str) -> Result<UserData, AuthError> {
        self.validate_calls.set(self.validate_calls.get() + 1);
        if self.network_down.get() || self.validate_network_down.get() {
            return Err(AuthError::Network("connection refused".to_owned()));
        }
        if !self.valid_access.borrow().contains(access_token) {
            return Err(AuthError::Unauthorized { status: 401 });
        }
        self.user.borrow().clone().ok_or(AuthError::Unauthorized { status: 401 })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshGrant, AuthError> {
        self.refresh_calls.set(self.refresh_calls.get() + 1);
        self.seen_refresh_tokens.borrow_mut().push(refresh_token.to_owned());
        let gate = self.refresh_gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.network_down.get() {
            return Err(AuthError::Network("timed out".to_owned()));
        }
        let result = self.refresh_results.borrow_mut().pop_front().unwrap_or(Err(AuthError::RefreshFailed));
        if let Ok(grant) = &result {
            self.accept_access(&grant.access_token);
        }
        result
    }

    async fn logout(&self, _access_token: &str) -> Result<(), AuthError> {
        self.logout_calls.set(self.logout_calls.get() + 1);
        match self.logout_result.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
