//! Shared auth guard decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected routes must apply identical unauthenticated redirect behavior.
//! The decision is a pure function of `(state, elapsed)` so the grace-delay
//! policy is testable without timers; `AuthGuard` only feeds it a clock.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::time::Duration;

use crate::config::{DEFAULT_FORBIDDEN_PATH, DEFAULT_SIGN_IN_PATH};
use crate::net::types::UserRole;
use crate::state::auth::AuthState;

/// When to send an unauthenticated visitor to sign-in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RedirectPolicy {
    #[default]
    Immediate,
    /// Show a notice for the given delay, then redirect.
    AfterGrace(Duration),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardOptions {
    pub sign_in_path: String,
    /// Where an authenticated user without `required_role` is sent.
    pub forbidden_path: String,
    pub policy: RedirectPolicy,
    pub required_role: Option<UserRole>,
}

impl Default for GuardOptions {
    fn default() -> Self {
        Self {
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_owned(),
            forbidden_path: DEFAULT_FORBIDDEN_PATH.to_owned(),
            policy: RedirectPolicy::Immediate,
            required_role: None,
        }
    }
}

impl GuardOptions {
    #[must_use]
    pub fn with_policy(mut self, policy: RedirectPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn require_role(mut self, role: UserRole) -> Self {
        self.required_role = Some(role);
        self
    }
}

/// What a guarded view should show right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardView {
    /// Session unresolved: show a neutral indicator, never the children.
    Loading,
    Render,
    /// Unauthenticated during the grace delay; redirect in `remaining`.
    Notice { remaining: Duration, to: String },
    Redirect { to: String },
}

impl GuardView {
    /// Navigation target, if this view should navigate now.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect { to } => Some(to.as_str()),
            _ => None,
        }
    }
}

/// Decide what a guarded view shows.
///
/// `elapsed` is the time since the session resolved to unauthenticated; it is
/// ignored in every other state.
pub fn guard_view(state: &AuthState, options: &GuardOptions, elapsed: Duration) -> GuardView {
    match state {
        AuthState::Initializing => GuardView::Loading,
        AuthState::Authenticated(user) => match options.required_role {
            Some(role) if user.role != role => GuardView::Redirect { to: options.forbidden_path.clone() },
            _ => GuardView::Render,
        },
        AuthState::Unauthenticated => match options.policy {
            RedirectPolicy::AfterGrace(grace) if elapsed < grace => {
                GuardView::Notice { remaining: grace - elapsed, to: options.sign_in_path.clone() }
            }
            _ => GuardView::Redirect { to: options.sign_in_path.clone() },
        },
    }
}

/// True once auth has resolved and no user is present.
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    matches!(state, AuthState::Unauthenticated)
}
