//! Value types and conversions for tabletalk

use crate::error::Error;
use crate::error::Result;

/// A scalar database value.
///
/// Mirrors SQLite's storage classes, which double as the lowest common
/// denominator across the supported dialects:
/// - `Integer` maps to INTEGER (64-bit signed)
/// - `Real` maps to REAL (64-bit floating point)
/// - `Text` maps to TEXT (UTF-8 string)
/// - `Blob` maps to BLOB (binary data)
/// - `Null` maps to NULL
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Null value (SQLite NULL)
    Null,
    /// 64-bit signed integer (SQLite INTEGER)
    Integer(i64),
    /// 64-bit floating point number (SQLite REAL)
    Real(f64),
    /// UTF-8 text string (SQLite TEXT)
    Text(String),
    /// Binary data (SQLite BLOB)
    Blob(Vec<u8>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrows the inner string for [`Value::Text`], `None` otherwise.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the inner integer for [`Value::Integer`], `None` otherwise.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<turso::Value> for Value {
    fn from(value: turso::Value) -> Self {
        match value {
            turso::Value::Null => Value::Null,
            turso::Value::Integer(i) => Value::Integer(i),
            turso::Value::Real(f) => Value::Real(f),
            turso::Value::Text(s) => Value::Text(s),
            turso::Value::Blob(b) => Value::Blob(b),
        }
    }
}

impl From<Value> for turso::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => turso::Value::Null,
            Value::Integer(i) => turso::Value::Integer(i),
            Value::Real(f) => turso::Value::Real(f),
            Value::Text(s) => turso::Value::Text(s),
            Value::Blob(b) => turso::Value::Blob(b),
        }
    }
}

/// Trait for converting Rust types into database values
///
/// This trait is implemented for common Rust types to allow them to be used
/// as query parameters and record columns. Custom types can implement this
/// trait to be used with the ORM.
///
/// # Example
///
/// ```ignore
/// use tabletalk::IntoValue;
///
/// let value: Value = 42i64.into_value();
/// let text: Value = "hello".into_value();
/// ```
pub trait IntoValue {
    /// Convert this value into a database [`Value`]
    fn into_value(self) -> Value;
}

/// Trait for converting database values into Rust types
///
/// This trait is implemented for common Rust types to allow them to be
/// extracted from query results. Custom types can implement this trait to
/// be used with the ORM.
///
/// # Example
///
/// ```ignore
/// use tabletalk::{FromValue, Value};
///
/// let value = Value::Integer(42);
/// let num: i64 = i64::from_value(value)?;
/// ```
pub trait FromValue: Sized {
    /// Convert a database [`Value`] into this type
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be converted to this type,
    /// or if the value is null and this type is not nullable.
    fn from_value(value: Value) -> Result<Self>;

    /// Convert from value, returning the default value for null
    ///
    /// This is useful for nullable columns where you want to use a default
    /// value instead of `Option<T>`.
    fn from_value_opt(value: Value) -> Result<Self>
    where Self: Default {
        if matches!(value, Value::Null) { Ok(Self::default()) } else { Self::from_value(value) }
    }
}

/// Builds a `Vec<Value>` of bound parameters from a comma-separated list.
///
/// # Example
///
/// ```ignore
/// use tabletalk::params;
///
/// let params = params!["George Lucas", 1977];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::IntoValue::into_value($value)),+]
    };
}

// Implement IntoValue for common types

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoValue for i16 {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoValue for i8 {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoValue for u16 {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoValue for u8 {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Real(self as f64)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Blob(self)
    }
}

impl IntoValue for &[u8] {
    fn into_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Integer(if self { 1 } else { 0 })
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Value {
        self.clone()
    }
}

// Implement FromValue for common types

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(v) => Ok(v),
            Value::Real(v) => Ok(v as i64),
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "Integer", actual: format!("{:?}", other) }),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self> {
        i64::from_value(value).map(|v| v as i32)
    }
}

impl FromValue for i16 {
    fn from_value(value: Value) -> Result<Self> {
        i64::from_value(value).map(|v| v as i16)
    }
}

impl FromValue for i8 {
    fn from_value(value: Value) -> Result<Self> {
        i64::from_value(value).map(|v| v as i8)
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self> {
        i64::from_value(value).map(|v| v as u32)
    }
}

impl FromValue for u16 {
    fn from_value(value: Value) -> Result<Self> {
        i64::from_value(value).map(|v| v as u16)
    }
}

impl FromValue for u8 {
    fn from_value(value: Value) -> Result<Self> {
        i64::from_value(value).map(|v| v as u8)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(v) => Ok(v),
            Value::Integer(v) => Ok(v as f64),
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "Real", actual: format!("{:?}", other) }),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "Text", actual: format!("{:?}", other) }),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "Blob", actual: format!("{:?}", other) }),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(v) => Ok(v != 0),
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "Integer (boolean)", actual: format!("{:?}", other) }),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn from_value_opt(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

// Optional chrono support
#[cfg(feature = "with-chrono")]
mod chrono_impl {
    use chrono::DateTime;
    use chrono::NaiveDate;
    use chrono::NaiveDateTime;
    use chrono::NaiveTime;
    use chrono::Utc;

    use super::*;

    impl IntoValue for NaiveDateTime {
        fn into_value(self) -> Value {
            Value::Text(self.format("%Y-%m-%d %H:%M:%S").to_string())
        }
    }

    impl FromValue for NaiveDateTime {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                    .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S"))
                    .map_err(|_| Error::TypeConversion { expected: "NaiveDateTime", actual: s }),
                Value::Null => Err(Error::UnexpectedNull),
                other => Err(Error::TypeConversion { expected: "Text (datetime)", actual: format!("{:?}", other) }),
            }
        }
    }

    impl IntoValue for DateTime<Utc> {
        fn into_value(self) -> Value {
            Value::Text(self.format("%Y-%m-%d %H:%M:%S").to_string())
        }
    }

    impl FromValue for DateTime<Utc> {
        fn from_value(value: Value) -> Result<Self> {
            let ndt = NaiveDateTime::from_value(value)?;
            Ok(DateTime::from_naive_utc_and_offset(ndt, Utc))
        }
    }

    impl IntoValue for NaiveDate {
        fn into_value(self) -> Value {
            Value::Text(self.format("%Y-%m-%d").to_string())
        }
    }

    impl FromValue for NaiveDate {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|_| Error::TypeConversion { expected: "NaiveDate", actual: s }),
                Value::Null => Err(Error::UnexpectedNull),
                other => Err(Error::TypeConversion { expected: "Text (date)", actual: format!("{:?}", other) }),
            }
        }
    }

    impl IntoValue for NaiveTime {
        fn into_value(self) -> Value {
            Value::Text(self.format("%H:%M:%S").to_string())
        }
    }

    impl FromValue for NaiveTime {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => NaiveTime::parse_from_str(&s, "%H:%M:%S")
                    .map_err(|_| Error::TypeConversion { expected: "NaiveTime", actual: s }),
                Value::Null => Err(Error::UnexpectedNull),
                other => Err(Error::TypeConversion { expected: "Text (time)", actual: format!("{:?}", other) }),
            }
        }
    }
}

// Optional UUID support
#[cfg(feature = "with-uuid")]
mod uuid_impl {
    use uuid::Uuid;

    use super::*;

    impl IntoValue for Uuid {
        fn into_value(self) -> Value {
            Value::Text(self.to_string())
        }
    }

    impl FromValue for Uuid {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => {
                    Uuid::parse_str(&s).map_err(|_| Error::TypeConversion { expected: "UUID", actual: s })
                }
                Value::Blob(b) => Uuid::from_slice(&b)
                    .map_err(|_| Error::TypeConversion { expected: "UUID", actual: format!("{:?}", b) }),
                Value::Null => Err(Error::UnexpectedNull),
                other => {
                    Err(Error::TypeConversion { expected: "Text or Blob (UUID)", actual: format!("{:?}", other) })
                }
            }
        }
    }
}

// Optional serde support
#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serialize;
    use serde::Serializer;
    use serde::de::Visitor;

    use super::Value;

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            match self {
                Value::Null => serializer.serialize_none(),
                Value::Integer(i) => serializer.serialize_i64(*i),
                Value::Real(f) => serializer.serialize_f64(*f),
                Value::Text(s) => serializer.serialize_str(s),
                Value::Blob(b) => serializer.serialize_bytes(b),
            }
        }
    }

    struct ValueVisitor;

    impl<'de> Visitor<'de> for ValueVisitor {
        type Value = Value;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a null, boolean, integer, float, string, or byte value")
        }

        fn visit_bool<E>(self, v: bool) -> std::result::Result<Value, E> {
            Ok(Value::Integer(if v { 1 } else { 0 }))
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Value, E> {
            Ok(Value::Integer(v))
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Value, E> {
            i64::try_from(v)
                .map(Value::Integer)
                .map_err(|_| E::custom(format!("integer out of range: {}", v)))
        }

        fn visit_f64<E>(self, v: f64) -> std::result::Result<Value, E> {
            Ok(Value::Real(v))
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Value, E> {
            Ok(Value::Text(v.to_string()))
        }

        fn visit_string<E>(self, v: String) -> std::result::Result<Value, E> {
            Ok(Value::Text(v))
        }

        fn visit_bytes<E>(self, v: &[u8]) -> std::result::Result<Value, E> {
            Ok(Value::Blob(v.to_vec()))
        }

        fn visit_byte_buf<E>(self, v: Vec<u8>) -> std::result::Result<Value, E> {
            Ok(Value::Blob(v))
        }

        fn visit_none<E>(self) -> std::result::Result<Value, E> {
            Ok(Value::Null)
        }

        fn visit_unit<E>(self) -> std::result::Result<Value, E> {
            Ok(Value::Null)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
            Value::deserialize(deserializer)
        }
    }

    impl<'de> Deserialize<'de> for Value {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Value, D::Error> {
            deserializer.deserialize_any(ValueVisitor)
        }
    }
}
