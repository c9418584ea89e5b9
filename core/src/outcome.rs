//! Classification of a single call.
//!
//! Every pipeline invocation ends in exactly one `Outcome`. The typed entry
//! points then fold it into an [`Envelope`]; the `*_or_throw` entry points
//! fold only `ApiError` and propagate the rest.

use crate::envelope::{Envelope, FAILURE_SENTINEL_STATUS, SUCCESS_STATUS};
use crate::error::{ClientError, CodecError, TransportError};
use crate::http::HttpResponse;

pub const GENERIC_TIMEOUT_MESSAGE: &str = "request timed out";
pub const GENERIC_TRANSPORT_MESSAGE: &str = "network error";
pub const GENERIC_ENCODE_MESSAGE: &str = "invalid request payload";
pub const GENERIC_DECODE_MESSAGE: &str = "invalid response payload";

#[derive(Debug)]
pub enum Outcome<T> {
    Decoded(T),
    /// Non-200 response. `reason` is the status text, never the body.
    ApiError { status: u16, reason: String },
    TransportError(TransportError),
    /// Encode failures land here too: they are client-side payload errors.
    DecodeError(CodecError),
}

/// Response status split before any decoding happens.
#[derive(Debug)]
pub(crate) enum Classified {
    Success(Vec<u8>),
    ApiError { status: u16, reason: String },
}

pub(crate) fn classify(response: HttpResponse) -> Classified {
    if response.status == SUCCESS_STATUS {
        Classified::Success(response.body)
    } else {
        Classified::ApiError {
            status: response.status,
            reason: response.reason,
        }
    }
}

impl<T> Outcome<T> {
    pub fn is_decoded(&self) -> bool {
        matches!(self, Outcome::Decoded(_))
    }

    /// Detailed text for debug output; `None` for a decoded value.
    pub fn failure_detail(&self) -> Option<String> {
        match self {
            Outcome::Decoded(_) => None,
            Outcome::ApiError { status, reason } => Some(format!("non-200 response ({status}): {reason}")),
            Outcome::TransportError(err) => Some(err.to_string()),
            Outcome::DecodeError(err) => Some(err.to_string()),
        }
    }

    /// Fold every outcome into an envelope. With `debug` off, transport and
    /// codec failures get a generic message instead of the underlying error.
    pub fn into_envelope(self, debug: bool) -> Envelope<T> {
        match self {
            Outcome::Decoded(value) => Envelope::Success(value),
            Outcome::ApiError { status, reason } => Envelope::failure(status, reason),
            Outcome::TransportError(err) => {
                Envelope::failure(FAILURE_SENTINEL_STATUS, failure_message(&err, debug))
            }
            Outcome::DecodeError(err) => {
                Envelope::failure(FAILURE_SENTINEL_STATUS, codec_message(&err, debug))
            }
        }
    }

    /// Fold only the API error; propagate infrastructure failures.
    pub fn into_envelope_or_error(self) -> Result<Envelope<T>, ClientError> {
        match self {
            Outcome::Decoded(value) => Ok(Envelope::Success(value)),
            Outcome::ApiError { status, reason } => Ok(Envelope::failure(status, reason)),
            Outcome::TransportError(err) => Err(err.into()),
            Outcome::DecodeError(err) => Err(err.into()),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Decoded(value) => Some(value),
            _ => None,
        }
    }
}

fn failure_message(err: &TransportError, debug: bool) -> String {
    if debug {
        return err.to_string();
    }
    match err {
        TransportError::Timeout(_) => GENERIC_TIMEOUT_MESSAGE,
        TransportError::Connection(_) | TransportError::Body(_) => GENERIC_TRANSPORT_MESSAGE,
    }
    .to_string()
}

fn codec_message(err: &CodecError, debug: bool) -> String {
    if debug {
        return err.to_string();
    }
    match err {
        CodecError::Encode(_) => GENERIC_ENCODE_MESSAGE,
        CodecError::Decode(_) | CodecError::Utf8(_) => GENERIC_DECODE_MESSAGE,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> CodecError {
        CodecError::Decode(serde_json::from_str::<u32>("{").unwrap_err())
    }

    #[test]
    fn only_exact_200_is_success() {
        assert!(matches!(
            classify(HttpResponse::new(200, "OK", "{}")),
            Classified::Success(_)
        ));
        for status in [100, 201, 204, 301, 404, 500] {
            match classify(HttpResponse::new(status, "Reason", "{}")) {
                Classified::ApiError { status: s, reason } => {
                    assert_eq!(s, status);
                    assert_eq!(reason, "Reason");
                }
                Classified::Success(_) => panic!("{status} must not be success"),
            }
        }
    }

    #[test]
    fn api_error_message_is_reason_even_in_release_mode() {
        let outcome: Outcome<u32> = Outcome::ApiError {
            status: 403,
            reason: "Forbidden".to_string(),
        };
        assert_eq!(outcome.into_envelope(false), Envelope::failure(403, "Forbidden"));
    }

    #[test]
    fn transport_error_is_generic_without_debug() {
        let outcome: Outcome<u32> =
            Outcome::TransportError(TransportError::Connection("tcp refused 10.0.0.1".to_string()));
        assert_eq!(
            outcome.into_envelope(false),
            Envelope::failure(0, GENERIC_TRANSPORT_MESSAGE)
        );
    }

    #[test]
    fn timeout_has_its_own_generic_message() {
        let outcome: Outcome<u32> = Outcome::TransportError(TransportError::Timeout("global".to_string()));
        assert_eq!(outcome.into_envelope(false).message(), GENERIC_TIMEOUT_MESSAGE);
    }

    #[test]
    fn debug_surfaces_underlying_text() {
        let outcome: Outcome<u32> =
            Outcome::TransportError(TransportError::Connection("tcp refused".to_string()));
        assert_eq!(
            outcome.into_envelope(true).message(),
            "connection failed: tcp refused"
        );

        let outcome: Outcome<u32> = Outcome::DecodeError(decode_error());
        let message = outcome.into_envelope(true).message().to_string();
        assert!(message.starts_with("failed to decode response body"), "{message}");
    }

    #[test]
    fn or_error_folds_only_api_errors() {
        let api: Outcome<u32> = Outcome::ApiError {
            status: 500,
            reason: "Internal Server Error".to_string(),
        };
        assert_eq!(
            api.into_envelope_or_error().unwrap(),
            Envelope::failure(500, "Internal Server Error")
        );

        let decode: Outcome<u32> = Outcome::DecodeError(decode_error());
        assert!(matches!(
            decode.into_envelope_or_error(),
            Err(ClientError::Codec(CodecError::Decode(_)))
        ));
    }
}
