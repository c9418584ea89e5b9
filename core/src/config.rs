//! Default request configuration owned by the Transport Handle.
//!
//! # Design
//! `ClientConfig` is an immutable value. The handle keeps it behind an `Arc`
//! and replaces the whole value on every change, so a call that took a
//! snapshot keeps a consistent view for its whole lifetime.
//!
//! `ClientSettings` is the serde-facing form for applications that load the
//! client from their own configuration files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::http::{HeaderName, HeaderValue};

use crate::error::ConfigError;

pub const AUTHORIZATION: &str = "authorization";
pub const CONTENT_TYPE: &str = "content-type";
pub const APPLICATION_JSON: &str = "application/json";

/// Credential sent as the `authorization` header on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub scheme: String,
    #[serde(default)]
    pub token: String,
}

impl Authorization {
    /// `"Bearer abc"`, or just the scheme when it already embeds the credential.
    pub fn header_value(&self) -> String {
        if self.token.is_empty() {
            self.scheme.clone()
        } else {
            format!("{} {}", self.scheme, self.token)
        }
    }
}

/// Snapshot of the handle's defaults applied to each outgoing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Lowercased header name -> value.
    pub default_headers: BTreeMap<String, String>,
    pub authorization: Option<Authorization>,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Headers for one request, in a stable order. Authorization, when set,
    /// replaces a default header of the same name.
    pub fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .default_headers
            .iter()
            .filter(|(name, _)| self.authorization.is_none() || name.as_str() != AUTHORIZATION)
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if let Some(auth) = &self.authorization {
            headers.push((AUTHORIZATION.to_string(), auth.header_value()));
        }
        headers
    }
}

/// Validate a header pair and return the normalized (lowercased) name.
pub(crate) fn normalize_header(name: &str, value: &str) -> Result<String, ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::EmptyHeaderName);
    }
    let parsed = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ConfigError::InvalidHeaderName(name.to_string()))?;
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeaderValue(name.to_string()))?;
    Ok(parsed.as_str().to_string())
}

pub(crate) fn validate_scheme(scheme: &str) -> Result<(), ConfigError> {
    if scheme.trim().is_empty() {
        return Err(ConfigError::EmptyScheme);
    }
    Ok(())
}

pub(crate) fn validate_timeout(timeout: Duration) -> Result<(), ConfigError> {
    if timeout.is_zero() {
        return Err(ConfigError::NonPositiveTimeout);
    }
    Ok(())
}

/// Client settings as they appear in an application's config file.
///
/// ```json
/// {
///   "default_headers": { "Accept": "application/json" },
///   "authorization": { "scheme": "Bearer", "token": "abc" },
///   "timeout_ms": 5000,
///   "debug": false
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub default_headers: BTreeMap<String, String>,
    pub authorization: Option<Authorization>,
    pub timeout_ms: Option<u64>,
    /// Surface underlying error text in failure envelopes and emit warnings.
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_lowercased() {
        assert_eq!(normalize_header("X-Request-Id", "1").unwrap(), "x-request-id");
    }

    #[test]
    fn empty_header_name_rejected() {
        assert_eq!(normalize_header("", "1"), Err(ConfigError::EmptyHeaderName));
    }

    #[test]
    fn illegal_header_name_rejected() {
        assert_eq!(
            normalize_header("bad name", "1"),
            Err(ConfigError::InvalidHeaderName("bad name".to_string()))
        );
    }

    #[test]
    fn illegal_header_value_rejected() {
        assert_eq!(
            normalize_header("x-a", "line\nbreak"),
            Err(ConfigError::InvalidHeaderValue("x-a".to_string()))
        );
    }

    #[test]
    fn authorization_with_embedded_credential() {
        let auth = Authorization {
            scheme: "Bearer abc".to_string(),
            token: String::new(),
        };
        assert_eq!(auth.header_value(), "Bearer abc");
    }

    #[test]
    fn authorization_overrides_default_header() {
        let mut config = ClientConfig::default();
        config
            .default_headers
            .insert(AUTHORIZATION.to_string(), "Basic old".to_string());
        config
            .default_headers
            .insert("accept".to_string(), APPLICATION_JSON.to_string());
        config.authorization = Some(Authorization {
            scheme: "Bearer".to_string(),
            token: "new".to_string(),
        });

        let headers = config.request_headers();
        assert_eq!(
            headers,
            vec![
                ("accept".to_string(), APPLICATION_JSON.to_string()),
                (AUTHORIZATION.to_string(), "Bearer new".to_string()),
            ]
        );
    }

    #[test]
    fn zero_timeout_rejected() {
        assert_eq!(
            validate_timeout(Duration::ZERO),
            Err(ConfigError::NonPositiveTimeout)
        );
        assert!(validate_timeout(Duration::from_millis(1)).is_ok());
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"authorization":{"scheme":"Bearer abc"},"timeout_ms":250}"#)
                .unwrap();
        assert!(settings.default_headers.is_empty());
        assert_eq!(settings.timeout_ms, Some(250));
        assert!(!settings.debug);
        assert_eq!(settings.authorization.unwrap().header_value(), "Bearer abc");
    }
}
