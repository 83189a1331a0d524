//! The request pipeline.
//!
//! # Design
//! `execute` is a free function over an explicit `ClientConfig`, so it runs
//! the same whether the async client calls it on a worker thread or a test
//! calls it directly. The connection lives inside a `ConnectionGuard`
//! whose `Drop` disconnects it, so release happens exactly once on every
//! exit path, including panics inside a transport.
//!
//! Every outcome is first rendered as JSON text: the raw body for 200, an
//! error envelope otherwise. That text is then decoded twice, once as the
//! caller's type and once as the `Response` envelope.

use tracing::{debug, warn};

use crate::classify::classify;
use crate::codec::{self, Decodable};
use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::http::RequestSpec;
use crate::transport::{Connection, Transport};
use crate::types::{Outcome, Response, ResultMessage};
use crate::url;

/// Owns a connection and disconnects it when dropped.
struct ConnectionGuard<C: Connection> {
    connection: C,
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        self.connection.disconnect();
    }
}

/// Run one request to completion. Never fails; failures are data.
///
/// # Panics
/// A panic raised by a `ResponseHandler` hook propagates to the caller
/// after the connection has been released. `HttpRequestClient` turns it
/// into an exception outcome; direct callers see the unwind.
pub fn execute<T, R>(config: &ClientConfig, transport: &T, spec: &RequestSpec) -> Outcome<R>
where
    T: Transport + ?Sized,
    R: Decodable,
{
    let text = match request(config, transport, spec) {
        Ok(text) => text,
        Err(err) => {
            warn!(method = %spec.method, endpoint = %spec.endpoint, "request failed: {err}");
            exception_text(&err.to_string())
        }
    };

    if config.log_enabled() {
        debug!("Response: {text}");
    }

    into_outcome(&text, config.log_enabled())
}

/// Render the outcome of a request as JSON text.
fn request<T>(config: &ClientConfig, transport: &T, spec: &RequestSpec) -> Result<String, RequestError>
where
    T: Transport + ?Sized,
{
    let url = url::compose(
        config.base_url(),
        &spec.endpoint,
        &spec.path_params,
        &spec.query_params,
    );
    let log = config.log_enabled();
    if log {
        debug!("{} -- {url}", spec.method);
    }

    // Encoded up front so a bad body never opens a connection.
    let body = spec
        .body
        .as_deref()
        .map(|body| codec::encode(body))
        .transpose()?;

    let mut guard = ConnectionGuard {
        connection: transport.open(&url)?,
    };
    let connection = &mut guard.connection;

    if log {
        debug!("Headers");
    }
    for (name, value) in config.headers() {
        if log {
            debug!("{name}: {value}");
        }
        connection.set_header(name, value)?;
    }

    if let Some(body) = &body {
        if log {
            debug!("Body: \n{body}");
        }
        connection.write_body(body.as_bytes())?;
    }

    connection.set_method(spec.method)?;

    if let Some(factory) = config.tls_factory() {
        connection.set_tls_factory(factory)?;
    }

    let status = connection.status_code()?;
    if log {
        debug!("{} <{status}> -- {url}", spec.method);
    }

    let failure = match status {
        200 => None,
        _ => classify(status, &connection.status_reason()?, config.handler()),
    };
    match failure {
        Some(message) => Ok(envelope_text(message)),
        None => Ok(connection.read_body()?),
    }
}

fn envelope_text(message: ResultMessage) -> String {
    let response = Response::failure(message);
    // Failure envelopes hold only strings, which always encode.
    codec::encode(&response).unwrap_or_else(|_| "{}".to_string())
}

pub(crate) fn exception_text(message: &str) -> String {
    envelope_text(ResultMessage::exception(message))
}

/// Decode rendered text as both the caller's type and the envelope.
pub(crate) fn into_outcome<R: Decodable>(text: &str, log: bool) -> Outcome<R> {
    let result = codec::decode::<R>(text)
        .inspect_err(|err| {
            if log {
                debug!("response is not the expected type: {err}");
            }
        })
        .ok();
    let response = Response::from_json(text)
        .inspect_err(|err| {
            if log {
                debug!("response is not an envelope: {err}");
            }
        })
        .ok();
    (result, response)
}
