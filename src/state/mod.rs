//! Client-side session state modules.
//!
//! DESIGN
//! ======
//! Split leaf to root: `token_store` persists credentials, `refresh`
//! exchanges them, `session` owns the lifecycle, and `auth` is the state
//! value views observe.

pub mod auth;
pub mod refresh;
pub mod session;
pub mod token_store;
