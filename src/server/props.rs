//! A thin typed view over the loosely-typed JSON maps the platform nests inside
//! its payloads (events, views, messages).
//!
//! Every accessor reports a missing key and a key of the wrong type as distinct
//! errors rather than falling back to a zero value, so malformed payloads
//! surface where they're read instead of as mysteriously empty strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Missing(String),
    WrongType { key: String, expected: &'static str },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Missing(key) => write!(f, "Missing field `{}`", key),
            FieldError::WrongType { key, expected } => {
                write!(f, "Field `{}` is not {}", key, expected)
            }
        }
    }
}

impl std::error::Error for FieldError {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(Map<String, Value>);

impl Props {
    pub fn new(map: Map<String, Value>) -> Self {
        Props(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn required(&self, key: &str) -> Result<&Value, FieldError> {
        self.0
            .get(key)
            .ok_or_else(|| FieldError::Missing(key.to_owned()))
    }

    fn wrong(key: &str, expected: &'static str) -> FieldError {
        FieldError::WrongType {
            key: key.to_owned(),
            expected,
        }
    }

    pub fn str(&self, key: &str) -> Result<&str, FieldError> {
        self.required(key)?
            .as_str()
            .ok_or_else(|| Self::wrong(key, "a string"))
    }

    /// Absent and `null` are both `None`; present values must be strings.
    pub fn opt_str(&self, key: &str) -> Result<Option<&str>, FieldError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(Self::wrong(key, "a string")),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool, FieldError> {
        self.required(key)?
            .as_bool()
            .ok_or_else(|| Self::wrong(key, "a boolean"))
    }

    pub fn opt_bool(&self, key: &str) -> Result<Option<bool>, FieldError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(Self::wrong(key, "a boolean")),
        }
    }

    pub fn i64(&self, key: &str) -> Result<i64, FieldError> {
        self.required(key)?
            .as_i64()
            .ok_or_else(|| Self::wrong(key, "an integer"))
    }

    /// A nested object.
    pub fn props(&self, key: &str) -> Result<Props, FieldError> {
        self.required(key)?
            .as_object()
            .cloned()
            .map(Props)
            .ok_or_else(|| Self::wrong(key, "an object"))
    }

    pub fn array(&self, key: &str) -> Result<&[Value], FieldError> {
        self.required(key)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| Self::wrong(key, "an array"))
    }
}

impl From<Map<String, Value>> for Props {
    fn from(map: Map<String, Value>) -> Self {
        Props(map)
    }
}

/// Only objects convert; anything else is handed back.
impl TryFrom<Value> for Props {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Props(map)),
            other => Err(other),
        }
    }
}
