//! The request pipeline.
//!
//! # Design
//! `ApiClient` is a thin, cloneable front over one shared [`TransportHandle`].
//! Every entry point runs the same steps:
//!
//! 1. encode the optional body (failure: not sent),
//! 2. build the request from a config snapshot,
//! 3. dispatch and read the full body,
//! 4. classify by status (exactly 200 is success),
//! 5. decode the body on success only.
//!
//! The result is an [`Outcome`], which each entry point folds into its own
//! return shape. No per-call state lives outside the call itself.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ClientConfig, ClientSettings, APPLICATION_JSON, CONTENT_TYPE};
use crate::debug::{DebugSink, TracingSink};
use crate::envelope::Envelope;
use crate::error::{ClientError, CodecError, ConfigError, TransportError};
use crate::handle::TransportHandle;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::outcome::{classify, Classified, Outcome};
use crate::transport::{Transport, UreqTransport};

/// Shorthand for calls without a request body: `None::<&NoBody>`.
pub type NoBody = ();

const NO_BODY: Option<&NoBody> = None;

/// JSON API client sharing one transport and configuration across clones.
#[derive(Clone)]
pub struct ApiClient {
    handle: Arc<TransportHandle>,
    sink: Arc<dyn DebugSink>,
    timeout_override: Option<Duration>,
}

impl ApiClient {
    /// ureq transport, tracing sink, debug off.
    pub fn new() -> Self {
        Self::with_debug(false)
    }

    pub fn with_debug(debug: bool) -> Self {
        Self::from_parts(Arc::new(UreqTransport::new()), Arc::new(TracingSink::new(debug)))
    }

    pub fn from_parts(transport: Arc<dyn Transport>, sink: Arc<dyn DebugSink>) -> Self {
        Self {
            handle: Arc::new(TransportHandle::new(transport)),
            sink,
            timeout_override: None,
        }
    }

    /// Build a ureq-backed client and apply every setting through the handle.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ConfigError> {
        let client = Self::with_debug(settings.debug);
        client.apply_settings(settings)?;
        Ok(client)
    }

    pub fn apply_settings(&self, settings: &ClientSettings) -> Result<(), ConfigError> {
        for (name, value) in &settings.default_headers {
            self.handle.configure_default_header(name, value)?;
        }
        if let Some(auth) = &settings.authorization {
            self.handle.configure_authorization(&auth.scheme, &auth.token)?;
        }
        if let Some(ms) = settings.timeout_ms {
            self.handle.configure_timeout(Duration::from_millis(ms))?;
        }
        Ok(())
    }

    pub fn handle(&self) -> &TransportHandle {
        &self.handle
    }

    /// A clone whose calls use `timeout` instead of the handle's timeout.
    /// Transport and configuration stay shared.
    pub fn with_timeout(&self, timeout: Duration) -> Result<Self, ConfigError> {
        crate::config::validate_timeout(timeout)?;
        Ok(Self {
            timeout_override: Some(timeout),
            ..self.clone()
        })
    }

    // -----------------------------------------------------------------------
    // Pipeline primitives
    // -----------------------------------------------------------------------

    /// Never fails observably: every failure lands in `Envelope::Failure`.
    pub fn execute_typed<T, B>(&self, method: HttpMethod, url: &str, body: Option<&B>) -> Envelope<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let outcome = self.outcome(method, url, body);
        self.report("execute_typed", method, url, &outcome);
        outcome.into_envelope(self.sink.is_debug_enabled())
    }

    /// Folds non-200 responses into `Envelope::Failure`; encode, transport and
    /// decode failures propagate as `Err`.
    pub fn execute_typed_or_throw<T, B>(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&B>,
    ) -> Result<Envelope<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let outcome = self.outcome(method, url, body);
        self.report("execute_typed_or_throw", method, url, &outcome);
        outcome.into_envelope_or_error()
    }

    /// The decoded payload, or `None` on any failure.
    pub fn execute_raw<T, B>(&self, method: HttpMethod, url: &str, body: Option<&B>) -> Option<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let outcome = self.outcome(method, url, body);
        self.report("execute_raw", method, url, &outcome);
        outcome.into_option()
    }

    /// The body as text on a 200, `None` otherwise. Never JSON-decodes.
    ///
    /// A 200 body that is not valid UTF-8 is a decode failure and yields
    /// `None`; use [`execute_for_bytes`](Self::execute_for_bytes) for binary
    /// payloads.
    pub fn execute_for_text<B>(&self, method: HttpMethod, url: &str, body: Option<&B>) -> Option<String>
    where
        B: Serialize + ?Sized,
    {
        let outcome = self.exchange(method, url, body, |bytes| {
            String::from_utf8(bytes).map_err(CodecError::Utf8)
        });
        self.report("execute_for_text", method, url, &outcome);
        outcome.into_option()
    }

    /// The body bytes on a 200, `None` otherwise.
    pub fn execute_for_bytes<B>(&self, method: HttpMethod, url: &str, body: Option<&B>) -> Option<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let outcome = self.exchange(method, url, body, Ok);
        self.report("execute_for_bytes", method, url, &outcome);
        outcome.into_option()
    }

    // -----------------------------------------------------------------------
    // Verb bindings
    // -----------------------------------------------------------------------

    pub fn get<T: DeserializeOwned>(&self, url: &str) -> Envelope<T> {
        self.execute_typed(HttpMethod::Get, url, NO_BODY)
    }

    pub fn get_or_throw<T: DeserializeOwned>(&self, url: &str) -> Result<Envelope<T>, ClientError> {
        self.execute_typed_or_throw(HttpMethod::Get, url, NO_BODY)
    }

    pub fn get_for_type<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        self.execute_raw(HttpMethod::Get, url, NO_BODY)
    }

    pub fn get_for_text(&self, url: &str) -> Option<String> {
        self.execute_for_text(HttpMethod::Get, url, NO_BODY)
    }

    pub fn get_for_bytes(&self, url: &str) -> Option<Vec<u8>> {
        self.execute_for_bytes(HttpMethod::Get, url, NO_BODY)
    }

    pub fn post<T, B>(&self, url: &str, body: Option<&B>) -> Envelope<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_typed(HttpMethod::Post, url, body)
    }

    pub fn post_or_throw<T, B>(&self, url: &str, body: Option<&B>) -> Result<Envelope<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_typed_or_throw(HttpMethod::Post, url, body)
    }

    pub fn post_for_type<T, B>(&self, url: &str, body: Option<&B>) -> Option<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_raw(HttpMethod::Post, url, body)
    }

    pub fn post_for_text<B>(&self, url: &str, body: Option<&B>) -> Option<String>
    where
        B: Serialize + ?Sized,
    {
        self.execute_for_text(HttpMethod::Post, url, body)
    }

    pub fn put<T, B>(&self, url: &str, body: Option<&B>) -> Envelope<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_typed(HttpMethod::Put, url, body)
    }

    pub fn delete<T: DeserializeOwned>(&self, url: &str) -> Envelope<T> {
        self.execute_typed(HttpMethod::Delete, url, NO_BODY)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn outcome<T, B>(&self, method: HttpMethod, url: &str, body: Option<&B>) -> Outcome<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.exchange(method, url, body, |bytes| {
            serde_json::from_slice(&bytes).map_err(CodecError::Decode)
        })
    }

    /// Steps 1-5; `decode` runs only for a 200 response.
    ///
    /// Headers and timeout come from one configuration snapshot taken here.
    fn exchange<T, B>(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&B>,
        decode: impl FnOnce(Vec<u8>) -> Result<T, CodecError>,
    ) -> Outcome<T>
    where
        B: Serialize + ?Sized,
    {
        let config = self.handle.snapshot();
        let request = match self.build_request(&config, method, url, body) {
            Ok(request) => request,
            Err(err) => return Outcome::DecodeError(err),
        };
        let response = match self.dispatch(&config, &request) {
            Ok(response) => response,
            Err(err) => return Outcome::TransportError(err),
        };
        match classify(response) {
            Classified::Success(bytes) => match decode(bytes) {
                Ok(value) => Outcome::Decoded(value),
                Err(err) => Outcome::DecodeError(err),
            },
            Classified::ApiError { status, reason } => Outcome::ApiError { status, reason },
        }
    }

    fn build_request<B>(
        &self,
        config: &ClientConfig,
        method: HttpMethod,
        url: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, CodecError>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(CodecError::Encode)?;
        let mut headers = config.request_headers();
        if body.is_some() {
            headers.retain(|(name, _)| name != CONTENT_TYPE);
            headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        }
        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }

    fn dispatch(&self, config: &ClientConfig, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = self.timeout_override.or(config.timeout);
        self.handle.transport().send(request, timeout)
    }

    fn report<T>(&self, entry: &str, method: HttpMethod, url: &str, outcome: &Outcome<T>) {
        if outcome.is_decoded() || !self.sink.is_debug_enabled() {
            return;
        }
        if let Some(detail) = outcome.failure_detail() {
            self.sink.warn(&format!("{entry} {method} {url}"), &detail);
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("handle", &self.handle)
            .field("timeout_override", &self.timeout_override)
            .finish_non_exhaustive()
    }
}
