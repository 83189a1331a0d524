//! Error types for the request client.
//!
//! # Design
//! None of these ever cross the public `get`/`post` boundary. The executor
//! turns a `RequestError` into an `exception` result message, and a failed
//! decode simply leaves that half of the outcome empty. They are public so
//! that callers using the codec or a custom `Transport` directly can match
//! on them.

use thiserror::Error;

/// Failures while moving a value object to or from JSON text.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not valid JSON.
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The JSON root is valid but not an object.
    #[error("expected a JSON object")]
    NotAnObject,

    /// A field declared by the target type has no member in the JSON.
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// A member exists but cannot be read as the field's declared kind.
    #[error("field '{field}' cannot be read as {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    /// `from_fields` asked for a field the type never declared.
    #[error("field '{0}' is not part of the schema")]
    UnknownField(&'static str),

    /// A constructor slot received null where the type requires a value.
    #[error("field '{0}' is null")]
    NullField(&'static str),

    /// JSON has no representation for NaN or infinities.
    #[error("field '{0}' holds a non-finite number")]
    NonFiniteNumber(&'static str),
}

/// Failures raised by a `Transport` or one of its connections.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The connection was used after `disconnect`.
    #[error("connection already closed")]
    Closed,

    /// Free-form failure reported by a custom transport.
    #[error("{0}")]
    Other(String),
}

/// Everything that can abort a single request before a status is classified.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("could not encode request body: {0}")]
    Body(#[from] CodecError),
}
