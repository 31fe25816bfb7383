//! Explicit presence tracking for document fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A document field as it was actually written.
///
/// glTF exporters routinely omit fields, write `null`, or emit the wrong JSON
/// type. Deserializing into `Field<T>` never fails: the raw value is kept in
/// [`Field::Invalid`] so validators can name it in their findings.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// The key is not present in the object.
    Absent,
    /// The key is present with a JSON `null`.
    Null,
    /// The key is present but the value has the wrong shape.
    Invalid(Value),
    /// The key is present with a well-formed value.
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(Field::Null);
        }
        match T::deserialize(&value) {
            Ok(parsed) => Ok(Field::Present(parsed)),
            Err(_) => Ok(Field::Invalid(value)),
        }
    }
}

impl<T> Field<T> {
    /// Returns the value if present and well-formed.
    pub fn present(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Mutable access to a present value.
    pub fn present_mut(&mut self) -> Option<&mut T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }

    /// True when the key was not written at all.
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// True for absent or `null`.
    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Absent | Field::Null)
    }

    /// True when a value was written but could not be read as `T`.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Field::Invalid(_))
    }

    /// True when the value is present and well-formed.
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }
}

impl<T: std::fmt::Display> Field<T> {
    /// Renders the field for use in a finding message.
    ///
    /// Present values render as themselves, invalid values as compact JSON.
    pub fn describe(&self) -> String {
        match self {
            Field::Absent => "missing".to_string(),
            Field::Null => "null".to_string(),
            Field::Invalid(value) => value.to_string(),
            Field::Present(value) => value.to_string(),
        }
    }
}

/// Short name of a JSON value's type, for messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
