//! Networking modules for the remote auth API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls, `codec` is the payload transform seam, and
//! `types` defines the shared wire schema and error taxonomy.

pub mod api;
pub mod codec;
pub mod types;
