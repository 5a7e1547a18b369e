use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value as JsonValue;

use crate::identifier::Identifier;

/// Values that can be bound as statement parameters or decoded out of a row.
///
/// Rows are materialized into this closed set once, when the driver hands them over, so the
/// typed accessors on [`RowResult`](crate::results::RowResult) only ever pattern-match:
/// ```rust
/// use stmt_middleware::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Timestamp with its UTC offset
    Timestamp(DateTime<FixedOffset>),
    /// 128-bit identifier
    Identifier(Identifier),
    /// Binary data
    Bytes(Vec<u8>),
    /// Key/value object, e.g. a JSON object column
    Nested(HashMap<String, RowValues>),
    /// Ordered list, e.g. a JSON array or SQL array column
    List(Vec<RowValues>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if let RowValues::Bytes(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_nested(&self) -> Option<&HashMap<String, RowValues>> {
        if let RowValues::Nested(map) = self {
            Some(map)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[RowValues]> {
        if let RowValues::List(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// The textual form numeric conversions parse from.
    ///
    /// Only scalar values have one; null, bytes, nested objects and lists do not.
    #[must_use]
    pub fn textual_form(&self) -> Option<Cow<'_, str>> {
        match self {
            RowValues::Bool(b) => Some(Cow::Owned(b.to_string())),
            RowValues::Int(i) => Some(Cow::Owned(i.to_string())),
            RowValues::Float(f) => Some(Cow::Owned(f.to_string())),
            RowValues::Text(s) => Some(Cow::Borrowed(s.as_str())),
            RowValues::Timestamp(ts) => Some(Cow::Owned(ts.to_rfc3339())),
            RowValues::Identifier(id) => Some(Cow::Owned(id.to_string())),
            RowValues::Null | RowValues::Bytes(_) | RowValues::Nested(_) | RowValues::List(_) => {
                None
            }
        }
    }

    /// Convert into a JSON value, used when binding nested values to `json`/`jsonb` columns.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            RowValues::Null => JsonValue::Null,
            RowValues::Bool(b) => JsonValue::Bool(*b),
            RowValues::Int(i) => JsonValue::from(*i),
            RowValues::Float(f) => JsonValue::from(*f),
            RowValues::Text(s) => JsonValue::String(s.clone()),
            RowValues::Timestamp(ts) => JsonValue::String(ts.to_rfc3339()),
            RowValues::Identifier(id) => JsonValue::String(id.to_string()),
            RowValues::Bytes(bytes) => {
                JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect())
            }
            RowValues::Nested(map) => JsonValue::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            RowValues::List(items) => {
                JsonValue::Array(items.iter().map(RowValues::to_json).collect())
            }
        }
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => RowValues::Null,
            JsonValue::Bool(b) => RowValues::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => RowValues::Int(i),
                // u64 above i64::MAX and fractional numbers both land here
                None => n
                    .as_f64()
                    .map_or_else(|| RowValues::Text(n.to_string()), RowValues::Float),
            },
            JsonValue::String(s) => RowValues::Text(s),
            JsonValue::Array(items) => {
                RowValues::List(items.into_iter().map(RowValues::from).collect())
            }
            JsonValue::Object(map) => RowValues::Nested(
                map.into_iter()
                    .map(|(key, value)| (key, RowValues::from(value)))
                    .collect(),
            ),
        }
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RowValues {
                fn from(value: $ty) -> Self {
                    RowValues::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

/// Values above `i64::MAX` are kept as their decimal text, which still decodes back into a
/// `u64` but is refused when bound to an integer column.
impl From<u64> for RowValues {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| RowValues::Text(value.to_string()), RowValues::Int)
    }
}

impl From<f32> for RowValues {
    fn from(value: f32) -> Self {
        RowValues::Float(f64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<DateTime<FixedOffset>> for RowValues {
    fn from(value: DateTime<FixedOffset>) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for RowValues {
    fn from(value: DateTime<Utc>) -> Self {
        RowValues::Timestamp(value.fixed_offset())
    }
}

impl From<Identifier> for RowValues {
    fn from(value: Identifier) -> Self {
        RowValues::Identifier(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Bytes(value)
    }
}

impl From<HashMap<String, String>> for RowValues {
    fn from(value: HashMap<String, String>) -> Self {
        RowValues::Nested(
            value
                .into_iter()
                .map(|(key, text)| (key, RowValues::Text(text)))
                .collect(),
        )
    }
}

impl From<HashMap<String, RowValues>> for RowValues {
    fn from(value: HashMap<String, RowValues>) -> Self {
        RowValues::Nested(value)
    }
}

impl From<Vec<String>> for RowValues {
    fn from(value: Vec<String>) -> Self {
        RowValues::List(value.into_iter().map(RowValues::Text).collect())
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}
