//! Payload transform seam for sensitive request/response bodies.
//!
//! The backend may require encrypted bodies on credential endpoints. The
//! actual cipher lives outside this crate; `HttpAuthApi` only routes bodies
//! through whatever [`PayloadCodec`] it was built with.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use super::types::AuthError;

/// Opaque encrypt/decrypt collaborator applied to JSON bodies.
pub trait PayloadCodec {
    /// Transform an outgoing JSON body before it is sent.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Codec`] if the body cannot be encoded.
    fn encode(&self, body: &str) -> Result<String, AuthError>;

    /// Transform an incoming body back into JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Codec`] if the body cannot be decoded.
    fn decode(&self, body: &str) -> Result<String, AuthError>;
}

/// Identity codec used when the backend accepts plain JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainCodec;

impl PayloadCodec for PlainCodec {
    fn encode(&self, body: &str) -> Result<String, AuthError> {
        Ok(body.to_owned())
    }

    fn decode(&self, body: &str) -> Result<String, AuthError> {
        Ok(body.to_owned())
    }
}
