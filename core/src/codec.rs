//! Schema-driven JSON codec for simple value objects.
//!
//! # Design
//! A value object describes itself instead of being inspected at runtime.
//! The encode side is `Serializable::fields`, which lists `(name, value)`
//! pairs in declaration order. The decode side is `Decodable::FIELDS`, a
//! static table of `(name, kind)` pairs, plus a `from_fields` factory that
//! plays the role of the constructor.
//!
//! Only strings, integers, booleans and doubles are read back. A nested
//! value object is written recursively but never reconstructed: its slot
//! reaches `from_fields` as null. Every other kind is written as `null` and
//! also reaches `from_fields` as null.
//!
//! Both directions return `Result`; deciding what a failure means for a
//! request is the executor's job.

use serde_json::{Map, Number, Value};

use crate::error::CodecError;

/// The declared kind of a field in a value object's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Bool,
    Double,
    Nested,
    Unsupported,
}

impl FieldKind {
    fn label(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Int => "integer",
            FieldKind::Bool => "boolean",
            FieldKind::Double => "double",
            FieldKind::Nested => "nested object",
            FieldKind::Unsupported => "unsupported value",
        }
    }
}

/// One entry of a `Decodable` schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Borrowed view of a field's current value, produced when encoding.
#[derive(Clone, Copy)]
pub enum FieldRef<'a> {
    String(&'a str),
    Int(i64),
    Bool(bool),
    Double(f64),
    Nested(&'a dyn Serializable),
    /// An optional field that currently holds nothing.
    Null,
    /// Any kind the codec does not support (lists, maps, ...). Written as `null`.
    Unsupported,
}

impl FieldRef<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldRef::String(_) => FieldKind::String,
            FieldRef::Int(_) => FieldKind::Int,
            FieldRef::Bool(_) => FieldKind::Bool,
            FieldRef::Double(_) => FieldKind::Double,
            FieldRef::Nested(_) | FieldRef::Null => FieldKind::Nested,
            FieldRef::Unsupported => FieldKind::Unsupported,
        }
    }
}

impl<'a> FieldRef<'a> {
    /// Wrap an optional nested value object.
    pub fn optional<T: Serializable>(value: &'a Option<T>) -> Self {
        match value {
            Some(inner) => FieldRef::Nested(inner),
            None => FieldRef::Null,
        }
    }
}

impl<'a> From<&'a str> for FieldRef<'a> {
    fn from(value: &'a str) -> Self {
        FieldRef::String(value)
    }
}

impl<'a> From<&'a String> for FieldRef<'a> {
    fn from(value: &'a String) -> Self {
        FieldRef::String(value.as_str())
    }
}

impl From<i64> for FieldRef<'_> {
    fn from(value: i64) -> Self {
        FieldRef::Int(value)
    }
}

impl From<i32> for FieldRef<'_> {
    fn from(value: i32) -> Self {
        FieldRef::Int(i64::from(value))
    }
}

impl From<bool> for FieldRef<'_> {
    fn from(value: bool) -> Self {
        FieldRef::Bool(value)
    }
}

impl From<f64> for FieldRef<'_> {
    fn from(value: f64) -> Self {
        FieldRef::Double(value)
    }
}

/// A value object that can be written as a JSON object.
pub trait Serializable {
    /// Every public field, in declaration order.
    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)>;
}

/// A value object that can be rebuilt from a JSON object.
pub trait Decodable: Sized {
    /// Constructor slots, in order. Names double as JSON member names.
    const FIELDS: &'static [FieldSpec];

    /// Assemble a value from the slots read out of the JSON.
    fn from_fields(fields: &mut Fields) -> Result<Self, CodecError>;
}

/// A slot value read out of JSON by its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Bool(bool),
    Double(f64),
    Null,
}

/// The argument set handed to `Decodable::from_fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields {
    values: Vec<(&'static str, FieldValue)>,
}

impl Fields {
    /// Peek at a slot without consuming it.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, value)| value)
    }

    pub fn string(&mut self, name: &'static str) -> Result<String, CodecError> {
        match self.take(name)? {
            FieldValue::String(value) => Ok(value),
            other => Err(unexpected(name, &other, FieldKind::String)),
        }
    }

    pub fn int(&mut self, name: &'static str) -> Result<i64, CodecError> {
        match self.take(name)? {
            FieldValue::Int(value) => Ok(value),
            other => Err(unexpected(name, &other, FieldKind::Int)),
        }
    }

    pub fn bool(&mut self, name: &'static str) -> Result<bool, CodecError> {
        match self.take(name)? {
            FieldValue::Bool(value) => Ok(value),
            other => Err(unexpected(name, &other, FieldKind::Bool)),
        }
    }

    pub fn double(&mut self, name: &'static str) -> Result<f64, CodecError> {
        match self.take(name)? {
            FieldValue::Double(value) => Ok(value),
            other => Err(unexpected(name, &other, FieldKind::Double)),
        }
    }

    /// Slot of a nested or unsupported field. These are never read from the
    /// JSON, so a declared slot always yields `Ok(None)`.
    pub fn skipped<T>(&mut self, name: &'static str) -> Result<Option<T>, CodecError> {
        match self.take(name)? {
            FieldValue::Null => Ok(None),
            other => Err(unexpected(name, &other, FieldKind::Nested)),
        }
    }

    fn take(&mut self, name: &'static str) -> Result<FieldValue, CodecError> {
        self.values
            .iter_mut()
            .find(|(slot, _)| *slot == name)
            .map(|(_, value)| std::mem::replace(value, FieldValue::Null))
            .ok_or(CodecError::UnknownField(name))
    }
}

fn unexpected(name: &'static str, found: &FieldValue, expected: FieldKind) -> CodecError {
    match found {
        FieldValue::Null => CodecError::NullField(name),
        _ => CodecError::TypeMismatch {
            field: name,
            expected: expected.label(),
        },
    }
}

/// Encode a value object as compact JSON text.
pub fn encode(value: &dyn Serializable) -> Result<String, CodecError> {
    encode_value(value).map(|json| json.to_string())
}

/// Encode a value object as a JSON object value.
pub fn encode_value(value: &dyn Serializable) -> Result<Value, CodecError> {
    let mut object = Map::new();
    for (name, field) in value.fields() {
        let json = match field {
            FieldRef::String(s) => Value::String(s.to_string()),
            FieldRef::Int(i) => Value::from(i),
            FieldRef::Bool(b) => Value::Bool(b),
            FieldRef::Double(d) => Number::from_f64(d)
                .map(Value::Number)
                .ok_or(CodecError::NonFiniteNumber(name))?,
            FieldRef::Nested(inner) => encode_value(inner)?,
            FieldRef::Null | FieldRef::Unsupported => Value::Null,
        };
        object.insert(name.to_string(), json);
    }
    Ok(Value::Object(object))
}

/// Decode JSON text into `T`.
pub fn decode<T: Decodable>(json: &str) -> Result<T, CodecError> {
    let value: Value = serde_json::from_str(json)?;
    decode_value(&value)
}

/// Decode an already-parsed JSON value into `T`.
pub fn decode_value<T: Decodable>(value: &Value) -> Result<T, CodecError> {
    let object = value.as_object().ok_or(CodecError::NotAnObject)?;
    let values = T::FIELDS
        .iter()
        .map(|spec| read_field(object, spec).map(|value| (spec.name, value)))
        .collect::<Result<Vec<_>, _>>()?;
    T::from_fields(&mut Fields { values })
}

fn read_field(object: &Map<String, Value>, spec: &FieldSpec) -> Result<FieldValue, CodecError> {
    if matches!(spec.kind, FieldKind::Nested | FieldKind::Unsupported) {
        return Ok(FieldValue::Null);
    }
    let value = object
        .get(spec.name)
        .ok_or(CodecError::MissingField(spec.name))?;

    let read = match spec.kind {
        FieldKind::String => match value {
            Value::String(s) => Some(FieldValue::String(s.clone())),
            Value::Number(n) => Some(FieldValue::String(n.to_string())),
            Value::Bool(b) => Some(FieldValue::String(b.to_string())),
            _ => None,
        },
        FieldKind::Int => read_int(value).map(FieldValue::Int),
        FieldKind::Bool => match value {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(FieldValue::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(FieldValue::Bool(false)),
            _ => None,
        },
        FieldKind::Double => read_double(value).map(FieldValue::Double),
        FieldKind::Nested | FieldKind::Unsupported => None,
    };

    read.ok_or(CodecError::TypeMismatch {
        field: spec.name,
        expected: spec.kind.label(),
    })
}

fn read_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|d| d as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|d| d as i64))
        }
        _ => None,
    }
}

fn read_double(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
