//! Session context provider.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps the app root. Provides the session handle and an
//! `RwSignal<AuthState>` mirror of `AuthSession::subscribe()` so guards and
//! user-aware components read auth state the same way they read any other
//! reactive context.

use leptos::prelude::*;

use crate::state::auth::AuthState;
use crate::state::session::AuthSession;
use crate::util::auth::GuardOptions;

/// Context handle for the session. The session is single-threaded, so it is
/// kept in local arena storage.
pub type SessionHandle = StoredValue<AuthSession, LocalStorage>;

/// Provide session contexts and resolve the stored session in the browser.
#[component]
pub fn AuthProvider(
    session: AuthSession,
    /// Default guard settings for every `AuthGuard` below this provider.
    #[prop(optional)]
    guard: Option<GuardOptions>,
    children: Children,
) -> impl IntoView {
    let auth = RwSignal::new(session.state());
    provide_context(auth);
    provide_context::<SessionHandle>(StoredValue::new_local(session.clone()));
    if let Some(guard) = guard {
        provide_context(guard);
    }

    #[cfg(feature = "hydrate")]
    {
        let alive = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
        let alive_task = alive.clone();
        let mut rx = session.subscribe();
        leptos::task::spawn_local(async move {
            while rx.changed().await.is_ok() {
                if !alive_task.load(std::sync::atomic::Ordering::Relaxed) {
                    break;
                }
                let next = rx.borrow_and_update().clone();
                auth.set(next);
            }
        });

        let startup = session.clone();
        leptos::task::spawn_local(async move {
            startup.initialize().await;
        });
        on_cleanup(move || alive.store(false, std::sync::atomic::Ordering::Relaxed));
    }

    children()
}

/// The session provided by the nearest `AuthProvider`.
///
/// # Panics
///
/// Panics if called outside an `AuthProvider`.
pub fn use_auth_session() -> AuthSession {
    expect_context::<SessionHandle>().get_value()
}
