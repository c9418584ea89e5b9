//! The shared Transport Handle.
//!
//! # Design
//! One handle per logical client, created once and shared through `Arc`. It
//! pairs the pooled transport with an `Arc<ClientConfig>` that is replaced
//! wholesale on every configuration change (copy-on-write under a short
//! write lock). Calls take a snapshot at dispatch time and never observe a
//! partially applied change.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::config::{self, Authorization, ClientConfig};
use crate::error::ConfigError;
use crate::transport::{Transport, UreqTransport};

pub struct TransportHandle {
    transport: Arc<dyn Transport>,
    config: RwLock<Arc<ClientConfig>>,
}

impl TransportHandle {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: RwLock::new(Arc::new(ClientConfig::default())),
        }
    }

    /// Upsert a default header. Names are case-insensitive; the last value wins.
    pub fn configure_default_header(&self, name: &str, value: &str) -> Result<(), ConfigError> {
        let name = config::normalize_header(name, value)?;
        self.update(|config| {
            config.default_headers.insert(name, value.to_string());
        });
        Ok(())
    }

    pub fn remove_default_header(&self, name: &str) {
        let name = name.to_ascii_lowercase();
        self.update(|config| {
            config.default_headers.remove(&name);
        });
    }

    /// Replace the authorization header. `token` may be empty when `scheme`
    /// already carries the credential (`"Bearer abc"`).
    pub fn configure_authorization(&self, scheme: &str, token: &str) -> Result<(), ConfigError> {
        config::validate_scheme(scheme)?;
        let auth = Authorization {
            scheme: scheme.to_string(),
            token: token.to_string(),
        };
        config::normalize_header(config::AUTHORIZATION, &auth.header_value())?;
        self.update(|config| config.authorization = Some(auth));
        Ok(())
    }

    pub fn clear_authorization(&self) {
        self.update(|config| config.authorization = None);
    }

    /// Deadline for dispatch plus body read, applied to calls started after this.
    pub fn configure_timeout(&self, timeout: Duration) -> Result<(), ConfigError> {
        config::validate_timeout(timeout)?;
        self.update(|config| config.timeout = Some(timeout));
        Ok(())
    }

    pub fn snapshot(&self) -> Arc<ClientConfig> {
        self.config.read().clone()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn update(&self, apply: impl FnOnce(&mut ClientConfig)) {
        let mut guard = self.config.write();
        let mut next = (**guard).clone();
        apply(&mut next);
        *guard = Arc::new(next);
    }
}

impl Default for TransportHandle {
    fn default() -> Self {
        Self::new(Arc::new(UreqTransport::new()))
    }
}

impl std::fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportHandle")
            .field("config", &self.snapshot())
            .finish_non_exhaustive()
    }
}
