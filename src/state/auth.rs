//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Published by `AuthSession` and mirrored into an `RwSignal` by the
//! provider component. Route guards and user-aware components read it to
//! coordinate sign-in redirects and identity-dependent rendering.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::{UserData, UserRole};

/// Session lifecycle state.
///
/// `Authenticated` always carries the user, so an authenticated state with
/// no user cannot be represented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Stored session not yet resolved; guards must not render protected views.
    #[default]
    Initializing,
    Authenticated(UserData),
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Initializing)
    }

    pub fn user(&self) -> Option<&UserData> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// True when the signed-in user holds `role`.
    pub fn has_role(&self, role: UserRole) -> bool {
        self.user().is_some_and(|u| u.role == role)
    }

    /// Short label for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Authenticated(_) => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}
