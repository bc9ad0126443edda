//! Session-aware view wrappers.

pub mod auth_guard;
pub mod auth_provider;
