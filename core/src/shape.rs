//! Expected-shape descriptors for decoded JSON.
//!
//! A caller states up front what structure it expects from a response body.
//! [`JsonShape`] checks the structure of a dynamic `serde_json::Value`;
//! [`Typed`] hands the value to serde and reports mismatches the same way.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;

/// Decoder from a parsed JSON value to the caller's expected output.
pub trait Shape: Send + Sync {
    type Output: Send + 'static;

    /// Human-readable name of the expected shape, used in mismatch errors.
    fn expected(&self) -> String;

    fn decode(&self, value: Value) -> Result<Self::Output, DecodeError>;
}

/// Structural description of a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonShape {
    Any,
    Null,
    Bool,
    Number,
    String,
    Sequence(Box<JsonShape>),
    /// Object with string keys and values of the inner shape.
    Mapping(Box<JsonShape>),
}

impl JsonShape {
    pub fn sequence_of(element: JsonShape) -> Self {
        JsonShape::Sequence(Box::new(element))
    }

    pub fn mapping_of(value: JsonShape) -> Self {
        JsonShape::Mapping(Box::new(value))
    }

    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (JsonShape::Any, _) => true,
            (JsonShape::Null, Value::Null) => true,
            (JsonShape::Bool, Value::Bool(_)) => true,
            (JsonShape::Number, Value::Number(_)) => true,
            (JsonShape::String, Value::String(_)) => true,
            (JsonShape::Sequence(element), Value::Array(items)) => {
                items.iter().all(|item| element.matches(item))
            }
            (JsonShape::Mapping(inner), Value::Object(map)) => {
                map.values().all(|item| inner.matches(item))
            }
            _ => false,
        }
    }

    /// Describe the actual shape of `value`. Containers are described by
    /// their first element; empty containers hold `any`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonShape::Null,
            Value::Bool(_) => JsonShape::Bool,
            Value::Number(_) => JsonShape::Number,
            Value::String(_) => JsonShape::String,
            Value::Array(items) => {
                JsonShape::sequence_of(items.first().map(JsonShape::of).unwrap_or(JsonShape::Any))
            }
            Value::Object(map) => {
                JsonShape::mapping_of(map.values().next().map(JsonShape::of).unwrap_or(JsonShape::Any))
            }
        }
    }
}

impl fmt::Display for JsonShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonShape::Any => f.write_str("any"),
            JsonShape::Null => f.write_str("null"),
            JsonShape::Bool => f.write_str("bool"),
            JsonShape::Number => f.write_str("number"),
            JsonShape::String => f.write_str("string"),
            JsonShape::Sequence(element) => write!(f, "sequence of {element}"),
            JsonShape::Mapping(inner) => write!(f, "mapping of {inner}"),
        }
    }
}

impl Shape for JsonShape {
    type Output = Value;

    fn expected(&self) -> String {
        self.to_string()
    }

    fn decode(&self, value: Value) -> Result<Value, DecodeError> {
        if self.matches(&value) {
            Ok(value)
        } else {
            Err(DecodeError::UnexpectedType {
                expected: self.expected(),
                found: JsonShape::of(&value).to_string(),
            })
        }
    }
}

/// Shape backed by a serde type.
pub struct Typed<T>(PhantomData<fn() -> T>);

impl<T> Typed<T> {
    pub fn new() -> Self {
        Typed(PhantomData)
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Typed<{}>", std::any::type_name::<T>())
    }
}

impl<T> Shape for Typed<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn expected(&self) -> String {
        std::any::type_name::<T>().to_string()
    }

    fn decode(&self, value: Value) -> Result<T, DecodeError> {
        let found = JsonShape::of(&value).to_string();
        serde_json::from_value(value).map_err(|e| DecodeError::UnexpectedType {
            expected: format!("{} ({e})", self.expected()),
            found,
        })
    }
}
