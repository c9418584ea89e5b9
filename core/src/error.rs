//! Error types for the JSON API client.
//!
//! # Design
//! Each failure family gets its own enum so the pipeline can classify an
//! outcome without string matching:
//! - `ConfigError` rejects bad arguments to the handle's `configure_*` methods.
//! - `TransportError` covers everything between dispatch and a fully-read body.
//! - `CodecError` covers JSON encoding of the request and decoding of the
//!   response.
//! - `ClientError` is what the `*_or_throw` entry points propagate.
//!
//! A non-200 status is not an error type at all; it is folded into
//! [`Envelope::Failure`](crate::Envelope::Failure) as business data.

use thiserror::Error;

/// Invalid argument passed to a Transport Handle configuration method.
///
/// The rejected call has no effect; previously applied configuration stays.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("header name must not be empty")]
    EmptyHeaderName,

    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),

    #[error("invalid value for header {0:?}")]
    InvalidHeaderValue(String),

    #[error("authorization scheme must not be empty")]
    EmptyScheme,

    #[error("timeout must be a positive duration")]
    NonPositiveTimeout,
}

/// The request could not be completed at the network level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The per-call deadline expired during dispatch or body read.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// DNS, connect, TLS or protocol failure before a response arrived.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A response arrived but its body could not be read in full.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// JSON encode/decode failure.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The request body could not be serialized; nothing was sent.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A 200 response body could not be parsed into the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A 200 response body requested as text is not valid UTF-8.
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[source] std::string::FromUtf8Error),
}

/// Infrastructure failure propagated by the `*_or_throw` entry points.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport(TransportError::Timeout(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_is_transparent_through_client_error() {
        let err = ClientError::from(TransportError::Connection("refused".to_string()));
        assert_eq!(err.to_string(), "connection failed: refused");
        assert!(!err.is_timeout());
    }

    #[test]
    fn timeout_is_detected() {
        let err = ClientError::from(TransportError::Timeout("global".to_string()));
        assert!(err.is_timeout());
    }

    #[test]
    fn decode_error_keeps_serde_source() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ClientError::from(CodecError::Decode(source));
        assert!(err.to_string().starts_with("failed to decode response body"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
