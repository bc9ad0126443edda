//! # tiffin-session
//!
//! Client-side authentication and session lifecycle for the tiffin
//! meal-subscription web app (marketing site, user dashboard, captain
//! dashboard).
//!
//! Leaf to root: `state::token_store` persists credentials,
//! `state::refresh` exchanges refresh tokens with coalescing,
//! `state::session` owns the `Initializing -> Authenticated/Unauthenticated`
//! lifecycle, and `components::auth_guard` gates protected views on it.
//! The remote backend is reached only through `net::api::AuthApi`.

pub mod components;
pub mod config;
pub mod net;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_helpers;

pub use config::{SessionConfig, StartupPolicy};
pub use net::types::{AuthError, SessionTokens, UserData, UserRole};
pub use state::auth::AuthState;
pub use state::session::AuthSession;
