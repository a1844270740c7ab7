//! Runtime values bound to query placeholders

use crate::query::TermType;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single bound argument value.
///
/// The variants mirror the natively supported column types, plus `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Short(i16),
    Byte(i8),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The algebra type a variable holding this value would have.
    pub fn term_type(&self) -> TermType {
        match self {
            Value::Int(_)
            | Value::Long(_)
            | Value::Short(_)
            | Value::Byte(_)
            | Value::Float(_)
            | Value::Double(_) => TermType::Number,
            Value::String(_) => TermType::String,
            Value::Bool(_) => TermType::Bool,
            Value::Date(_) | Value::Time(_) | Value::Timestamp(_) => TermType::Time,
            Value::Null | Value::Bytes(_) => TermType::Wildcard,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
        }
    }
}

/// A native Rust type with a lossless mapping to and from [`Value`].
pub trait NativeValue: Sized {
    fn to_value(&self) -> Value;

    /// Returns `None` when the value holds a different variant.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_native_value {
    ($type:ty, $variant:ident) => {
        impl NativeValue for $type {
            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$type> for Value {
            fn from(value: $type) -> Self {
                Value::$variant(value)
            }
        }
    };
}

impl_native_value!(bool, Bool);
impl_native_value!(i32, Int);
impl_native_value!(i64, Long);
impl_native_value!(i16, Short);
impl_native_value!(i8, Byte);
impl_native_value!(f32, Float);
impl_native_value!(f64, Double);
impl_native_value!(String, String);
impl_native_value!(Vec<u8>, Bytes);
impl_native_value!(NaiveDate, Date);
impl_native_value!(NaiveTime, Time);
impl_native_value!(NaiveDateTime, Timestamp);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
