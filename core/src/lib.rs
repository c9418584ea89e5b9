//! Blocking JSON API client core.
//!
//! # Overview
//! `ApiClient` sends JSON requests over one shared, pooled transport and
//! hands back either a normalized [`Envelope`] or the decoded payload. Raw
//! transport failures and malformed payloads never escape the typed entry
//! points; the `*_or_throw` variants let callers propagate them instead.
//!
//! # Design
//! - `TransportHandle` owns the transport and the default headers,
//!   authorization and timeout. Configuration is swapped atomically, so
//!   in-flight calls keep a consistent snapshot.
//! - The pipeline in `client` is stateless per call: build, dispatch,
//!   classify (exactly HTTP 200 is success), decode, fold.
//! - Non-200 failures report the status text, never the body. Transport and
//!   codec failures report a generic message unless debug mode is on.
//!
//! ```no_run
//! use jsonapi_core::{ApiClient, Envelope};
//!
//! #[derive(serde::Deserialize)]
//! struct Thing {
//!     id: u32,
//! }
//!
//! let client = ApiClient::new();
//! client.handle().configure_default_header("Accept", "application/json")?;
//! match client.get::<Thing>("http://localhost:3000/ok") {
//!     Envelope::Success(thing) => println!("id {}", thing.id),
//!     Envelope::Failure { status, message } => println!("{status}: {message}"),
//! }
//! # Ok::<(), jsonapi_core::ConfigError>(())
//! ```

pub mod client;
pub mod config;
pub mod debug;
pub mod envelope;
pub mod error;
pub mod handle;
pub mod http;
pub mod outcome;
pub mod transport;

pub use client::{ApiClient, NoBody};
pub use config::{Authorization, ClientConfig, ClientSettings};
pub use debug::{DebugSink, TracingSink};
pub use envelope::{Envelope, FAILURE_SENTINEL_STATUS};
pub use error::{ClientError, CodecError, ConfigError, TransportError};
pub use handle::TransportHandle;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use outcome::Outcome;
pub use transport::{Transport, UreqTransport};
