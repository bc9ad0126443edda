//! Access-token refresh with in-flight coalescing.
//!
//! ARCHITECTURE
//! ============
//! At most one refresh exchange is in flight. A caller arriving while an
//! exchange is pending awaits the same shared future, so overlapping callers
//! always observe one network round-trip and the same resulting token. This
//! keeps a rotating backend from seeing the same refresh token twice.
//!
//! TRADE-OFFS
//! ==========
//! Failures are not retried and do not clear the store; the session decides
//! what an unrecoverable failure means. A session epoch guards against a late
//! exchange re-populating the store after logout.

#[cfg(test)]
#[path = "refresh_test.rs"]
mod refresh_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use super::token_store::TokenStore;
use crate::net::api::AuthApi;

type RefreshFuture = Shared<LocalBoxFuture<'static, Option<String>>>;

struct InFlight {
    id: u64,
    future: RefreshFuture,
}

struct RefresherInner {
    store: TokenStore,
    api: Rc<dyn AuthApi>,
    epoch: Cell<u64>,
    next_id: Cell<u64>,
    in_flight: RefCell<Option<InFlight>>,
}

/// Exchanges the stored refresh token for a new access token.
///
/// Cheap to clone; clones share the in-flight slot.
#[derive(Clone)]
pub struct TokenRefresher {
    inner: Rc<RefresherInner>,
}

impl TokenRefresher {
    pub fn new(store: TokenStore, api: Rc<dyn AuthApi>) -> Self {
        Self {
            inner: Rc::new(RefresherInner {
                store,
                api,
                epoch: Cell::new(0),
                next_id: Cell::new(0),
                in_flight: RefCell::new(None),
            }),
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.inner.store
    }

    /// Refresh the access token, joining an in-flight exchange if one exists.
    ///
    /// Returns `None` without touching the network when no refresh token is
    /// stored, and `None` when the exchange fails for any reason.
    pub async fn refresh_access_token(&self) -> Option<String> {
        let (id, future) = self.join_or_start()?;
        let result = future.await;
        let mut slot = self.inner.in_flight.borrow_mut();
        if slot.as_ref().is_some_and(|flight| flight.id == id) {
            *slot = None;
        }
        result
    }

    /// True while an exchange is pending.
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.borrow().is_some()
    }

    /// Start a new session epoch: results of exchanges already in flight are
    /// discarded instead of persisted.
    pub fn invalidate(&self) {
        self.inner.epoch.set(self.inner.epoch.get() + 1);
        self.inner.in_flight.borrow_mut().take();
    }

    fn join_or_start(&self) -> Option<(u64, RefreshFuture)> {
        let mut slot = self.inner.in_flight.borrow_mut();
        if let Some(flight) = slot.as_ref() {
            tracing::debug!(refresh_id = flight.id, "joining in-flight token refresh");
            return Some((flight.id, flight.future.clone()));
        }

        let Some(refresh_token) = self.inner.store.refresh_token() else {
            tracing::debug!("no refresh token stored; skipping refresh");
            return None;
        };

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let future = exchange(Rc::clone(&self.inner), refresh_token).boxed_local().shared();
        *slot = Some(InFlight { id, future: future.clone() });
        Some((id, future))
    }
}

async fn exchange(inner: Rc<RefresherInner>, refresh_token: String) -> Option<String> {
    let epoch = inner.epoch.get();
    match inner.api.refresh(&refresh_token).await {
        Ok(grant) => {
            if inner.epoch.get() != epoch {
                tracing::warn!("session ended during token refresh; discarding result");
                return None;
            }
            inner.store.set_access_token(&grant.access_token);
            if let Some(rotated) = grant.refresh_token.as_deref() {
                inner.store.set_refresh_token(rotated);
            }
            tracing::info!(rotated = grant.refresh_token.is_some(), "access token refreshed");
            Some(grant.access_token)
        }
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), "token refresh failed");
            None
        }
    }
}
