//! Route guard for protected views (user and captain dashboards).
//!
//! SYSTEM CONTEXT
//! ==============
//! Reads the `RwSignal<AuthState>` provided by `AuthProvider` and delegates
//! every decision to `guard_view`. Children are only built once the decision
//! is `Render`, so protected content never flashes before auth resolves.

use std::time::Duration;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::auth::AuthState;
use crate::util::auth::{GuardOptions, GuardView, guard_view};

#[cfg(feature = "hydrate")]
const GRACE_TICK_MS: u64 = 100;

/// Render `children` only for an authenticated session.
///
/// Options fall back to the provider's `GuardOptions`, then the defaults.
#[component]
pub fn AuthGuard(#[prop(optional)] options: Option<GuardOptions>, children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let options = options.or_else(use_context::<GuardOptions>).unwrap_or_default();
    let navigate = use_navigate();

    // Milliseconds spent unauthenticated; drives the grace notice.
    let elapsed_ms = RwSignal::new(0_u64);

    #[cfg(feature = "hydrate")]
    {
        if matches!(options.policy, crate::util::auth::RedirectPolicy::AfterGrace(_)) {
            let alive = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
            let alive_task = alive.clone();
            leptos::task::spawn_local(async move {
                loop {
                    gloo_timers::future::sleep(Duration::from_millis(GRACE_TICK_MS)).await;
                    if !alive_task.load(std::sync::atomic::Ordering::Relaxed) {
                        break;
                    }
                    if crate::util::auth::should_redirect_unauth(&auth.get_untracked()) {
                        elapsed_ms.update(|ms| *ms += GRACE_TICK_MS);
                    } else if elapsed_ms.get_untracked() != 0 {
                        elapsed_ms.set(0);
                    }
                }
            });
            on_cleanup(move || alive.store(false, std::sync::atomic::Ordering::Relaxed));
        }
    }

    let decision = Memo::new(move |_| {
        auth.with(|state| guard_view(state, &options, Duration::from_millis(elapsed_ms.get())))
    });

    Effect::new(move || {
        let current = decision.get();
        if let Some(to) = current.redirect_target() {
            navigate(to, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    move || match decision.get() {
        GuardView::Loading => view! {
            <div class="auth-guard auth-guard--loading" aria-busy="true">
                <span class="auth-guard__spinner"></span>
            </div>
        }
        .into_any(),
        GuardView::Notice { remaining, .. } => {
            let secs = remaining.as_millis().div_ceil(1000);
            view! {
                <div class="auth-guard auth-guard--notice" role="status">
                    <p>"Please sign in to continue."</p>
                    <p class="auth-guard__countdown">{format!("Redirecting in {secs}s...")}</p>
                </div>
            }
            .into_any()
        }
        GuardView::Redirect { .. } => view! { <div class="auth-guard auth-guard--redirect"></div> }.into_any(),
        GuardView::Render => children().into_any(),
    }
}
