//! The caller-facing result of the typed entry points.
//!
//! # Design
//! Every typed call returns an `Envelope` regardless of what went wrong, so
//! callers branch on `status()` instead of handling errors. There is one
//! failure shape (`status` + `message`); transport and codec failures use the
//! sentinel status `0` because no HTTP status was received or accepted.

use serde::{Serialize, Serializer};

/// Status reported for failures that did not come from a non-200 response.
pub const FAILURE_SENTINEL_STATUS: u16 = 0;

/// The only status classified as success. 201, 204 and friends are failures.
pub const SUCCESS_STATUS: u16 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    Success(T),
    Failure { status: u16, message: String },
}

impl<T> Envelope<T> {
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Envelope::Failure {
            status,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn status(&self) -> u16 {
        match self {
            Envelope::Success(_) => SUCCESS_STATUS,
            Envelope::Failure { status, .. } => *status,
        }
    }

    /// Empty for a success.
    pub fn message(&self) -> &str {
        match self {
            Envelope::Success(_) => "",
            Envelope::Failure { message, .. } => message,
        }
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Envelope::Success(value) => Some(value),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn into_success(self) -> Option<T> {
        match self {
            Envelope::Success(value) => Some(value),
            Envelope::Failure { .. } => None,
        }
    }

    /// `Err((status, message))` for a failure.
    pub fn into_result(self) -> Result<T, (u16, String)> {
        match self {
            Envelope::Success(value) => Ok(value),
            Envelope::Failure { status, message } => Err((status, message)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Envelope::Success(value) => Envelope::Success(f(value)),
            Envelope::Failure { status, message } => Envelope::Failure { status, message },
        }
    }
}

#[derive(Serialize)]
struct Wire<'a, T> {
    status: u16,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
}

/// `{"status":200,"message":"","data":..}` or `{"status":403,"message":"Forbidden"}`.
impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Wire {
            status: self.status(),
            message: self.message(),
            data: self.success(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_reports_200() {
        let env = Envelope::Success(7);
        assert!(env.is_success());
        assert_eq!(env.status(), 200);
        assert_eq!(env.message(), "");
        assert_eq!(env.into_result(), Ok(7));
    }

    #[test]
    fn failure_carries_status_and_message() {
        let env: Envelope<u32> = Envelope::failure(403, "Forbidden");
        assert!(!env.is_success());
        assert_eq!(env.status(), 403);
        assert_eq!(env.message(), "Forbidden");
        assert_eq!(env.success(), None);
    }

    #[test]
    fn map_preserves_failure() {
        let env: Envelope<u32> = Envelope::failure(FAILURE_SENTINEL_STATUS, "network error");
        let mapped = env.map(|v| v.to_string());
        assert_eq!(mapped, Envelope::failure(0, "network error"));
    }

    #[test]
    fn serializes_to_status_message_data() {
        let ok = serde_json::to_value(Envelope::Success(json!({"id": 7}))).unwrap();
        assert_eq!(ok, json!({"status": 200, "message": "", "data": {"id": 7}}));

        let failed = serde_json::to_value(Envelope::<u8>::failure(404, "Not Found")).unwrap();
        assert_eq!(failed, json!({"status": 404, "message": "Not Found"}));
    }
}
