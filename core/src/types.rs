//! Result envelope returned alongside every typed payload.
//!
//! # Design
//! Non-200 outcomes and transport failures are written as a JSON envelope
//! `{"result": null, "resultMessage": {...}}` and then decoded like any other
//! response body. The envelope's `resultMessage` is the one nested value the
//! client reads back, so `Response::from_json` decodes it explicitly instead
//! of going through the generic codec.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::codec::{self, Decodable, FieldKind, FieldRef, FieldSpec, Fields, Serializable};
use crate::error::CodecError;

/// What a call produces: the typed payload and the result envelope. Either
/// half may be absent; neither absence is an error by itself.
pub type Outcome<T> = (Option<T>, Option<Response>);

/// `type` of a `ResultMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Success,
    Error,
    Exception,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
            MessageKind::Exception => "exception",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(MessageKind::Success),
            "error" => Ok(MessageKind::Error),
            "exception" => Ok(MessageKind::Exception),
            _ => Err(CodecError::TypeMismatch {
                field: "type",
                expected: "success, error or exception",
            }),
        }
    }
}

/// Description of a non-primary outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMessage {
    pub title: String,
    pub kind: MessageKind,
    pub message: String,
}

impl ResultMessage {
    pub(crate) fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            kind: MessageKind::Error,
            message: message.into(),
        }
    }

    pub(crate) fn exception(message: impl Into<String>) -> Self {
        Self {
            title: "Exception".to_string(),
            kind: MessageKind::Exception,
            message: message.into(),
        }
    }
}

impl Serializable for ResultMessage {
    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("title", (&self.title).into()),
            ("type", self.kind.as_str().into()),
            ("message", (&self.message).into()),
        ]
    }
}

impl Decodable for ResultMessage {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("title", FieldKind::String),
        FieldSpec::new("type", FieldKind::String),
        FieldSpec::new("message", FieldKind::String),
    ];

    fn from_fields(fields: &mut Fields) -> Result<Self, CodecError> {
        Ok(ResultMessage {
            title: fields.string("title")?,
            kind: fields.string("type")?.parse()?,
            message: fields.string("message")?,
        })
    }
}

/// The result envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    /// Raw `result` member, if the body carried one.
    pub result: Option<Value>,
    pub result_message: Option<ResultMessage>,
}

impl Response {
    pub(crate) fn failure(message: ResultMessage) -> Self {
        Self {
            result: None,
            result_message: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result_message
            .as_ref()
            .is_some_and(|message| message.kind == MessageKind::Success)
    }

    /// Read the envelope out of a response body. Any JSON object qualifies;
    /// members it does not know are ignored.
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        let value: Value = serde_json::from_str(text)?;
        let object = value.as_object().ok_or(CodecError::NotAnObject)?;

        let result = object.get("result").filter(|v| !v.is_null()).cloned();
        let result_message = match object.get("resultMessage") {
            Some(message @ Value::Object(_)) => Some(codec::decode_value(message)?),
            _ => None,
        };

        Ok(Self {
            result,
            result_message,
        })
    }
}

impl Serializable for Response {
    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        // Raw JSON is not a supported field kind.
        let result = match self.result {
            Some(_) => FieldRef::Unsupported,
            None => FieldRef::Null,
        };
        vec![
            ("result", result),
            ("resultMessage", FieldRef::optional(&self.result_message)),
        ]
    }
}
