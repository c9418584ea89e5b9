//! The network boundary.
//!
//! # Design
//! The pipeline only ever talks to `dyn Transport`. Production code uses
//! `UreqTransport`, which wraps one pooled `ureq::Agent`; tests substitute a
//! scripted transport. Implementations must tolerate concurrent `send` calls
//! from many threads.

use std::time::Duration;

use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one request and returns the fully-read response.
///
/// Any status code is a successful `send`; only failures to obtain a complete
/// response are errors.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &HttpRequest,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport over a shared `ureq::Agent`.
///
/// The agent owns the connection pool. Cloning shares it.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status interpretation belongs to the pipeline, not the agent. A 3xx
        // is a non-200 outcome, so redirects are returned, never followed.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(
        &self,
        request: &HttpRequest,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => prepare(self.agent.get(url), request, timeout).call(),
            HttpMethod::Delete => prepare(self.agent.delete(url), request, timeout).call(),
            HttpMethod::Post => send_body(prepare(self.agent.post(url), request, timeout), request),
            HttpMethod::Put => send_body(prepare(self.agent.put(url), request, timeout), request),
            HttpMethod::Patch => {
                send_body(prepare(self.agent.patch(url), request, timeout), request)
            }
        };
        let response = result.map_err(dispatch_error)?;
        read_response(response)
    }
}

fn prepare<B>(
    builder: RequestBuilder<B>,
    request: &HttpRequest,
    timeout: Option<Duration>,
) -> RequestBuilder<B> {
    let builder = request
        .headers
        .iter()
        .fold(builder, |builder, (name, value)| builder.header(name.as_str(), value.as_str()));
    builder.config().timeout_global(timeout).build()
}

fn send_body(
    builder: RequestBuilder<ureq::typestate::WithBody>,
    request: &HttpRequest,
) -> Result<Response<Body>, ureq::Error> {
    match &request.body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn read_response(mut response: Response<Body>) -> Result<HttpResponse, TransportError> {
    let status = response.status();
    // ureq does not expose the reason phrase from the status line, so this is
    // the standard phrase for the code.
    let reason = status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string());
    let body = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|err| match err {
            ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
            other => TransportError::Body(other.to_string()),
        })?;
    Ok(HttpResponse {
        status: status.as_u16(),
        reason,
        body,
    })
}

fn dispatch_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout(err.to_string()),
        other => TransportError::Connection(other.to_string()),
    }
}
