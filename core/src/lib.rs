//! Minimal HTTP request client with a schema-driven JSON codec.
//!
//! # Overview
//! `HttpRequestClient` joins a base URL with endpoint templates, applies a
//! fixed header set, sends the request over a pluggable `Transport`, and
//! hands back an `Outcome<T>`: the decoded payload and a result envelope.
//! Nothing is thrown across the public API. HTTP errors, transport failures
//! and undecodable bodies all come back as data.
//!
//! # Design
//! - `ClientConfig` is immutable and shared; calls hold no other state.
//! - `execute` is the synchronous pipeline; the async client runs it on
//!   tokio's blocking pool.
//! - Value objects opt into JSON through `Serializable` / `Decodable`
//!   instead of runtime inspection. Nested objects are written but not
//!   read back.
//! - Status codes map to result messages and `ResponseHandler` hooks
//!   through a fixed table in `classify`.

pub mod classify;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod executor;
pub mod handler;
pub mod http;
pub mod transport;
pub mod types;
pub mod url;

pub use client::HttpRequestClient;
pub use codec::{Decodable, FieldKind, FieldRef, FieldSpec, Fields, Serializable};
pub use config::{ClientConfig, ClientConfigBuilder, TlsFactory};
pub use error::{CodecError, RequestError, TransportError};
pub use executor::execute;
pub use handler::ResponseHandler;
pub use http::{HttpMethod, Params, RequestSpec};
pub use transport::{Connection, Transport, UreqConnection, UreqTransport};
pub use types::{MessageKind, Outcome, Response, ResultMessage};
