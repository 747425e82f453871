use serde::{Serialize, Serializer};

use super::types;

/// A generic wrapper enum to hold any scalar value read from a data source.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Blob(types::Blob),
    Boolean(types::Boolean),
    Date(types::Date),
    DateTime(types::DateTime),
    Decimal(types::Decimal),
    Float64(types::Float64),
    Int32(types::Int32),
    Int64(types::Int64),
    Json(types::Json),
    Null,
    Text(types::Text),
    Time(types::Time),
    Uuid(types::Uuid),
}

// macro rules for implementing From trait for Value enum variants
macro_rules! impl_conv_for_value {
    ($variant:ident, $ty:ty, $name:ident) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }

        impl Value {
            /// Attempts to extract a reference to the inner value if it matches the variant.
            pub fn $name(&self) -> Option<&$ty> {
                if let Value::$variant(v) = self {
                    Some(v)
                } else {
                    None
                }
            }
        }
    };
}

impl_conv_for_value!(Blob, types::Blob, as_blob);
impl_conv_for_value!(Boolean, types::Boolean, as_boolean);
impl_conv_for_value!(Date, types::Date, as_date);
impl_conv_for_value!(DateTime, types::DateTime, as_datetime);
impl_conv_for_value!(Decimal, types::Decimal, as_decimal);
impl_conv_for_value!(Float64, types::Float64, as_float64);
impl_conv_for_value!(Int32, types::Int32, as_int32);
impl_conv_for_value!(Int64, types::Int64, as_int64);
impl_conv_for_value!(Json, types::Json, as_json);
impl_conv_for_value!(Text, types::Text, as_text);
impl_conv_for_value!(Time, types::Time, as_time);
impl_conv_for_value!(Uuid, types::Uuid, as_uuid);

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value.into())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Value {
    /// Checks if the value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Blob(_) => "Blob",
            Value::Boolean(_) => "Boolean",
            Value::Date(_) => "Date",
            Value::DateTime(_) => "DateTime",
            Value::Decimal(_) => "Decimal",
            Value::Float64(_) => "Float64",
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::Json(_) => "Json",
            Value::Null => "Null",
            Value::Text(_) => "Text",
            Value::Time(_) => "Time",
            Value::Uuid(_) => "Uuid",
        }
    }

    /// SQL equality: `NULL` never matches anything, itself included.
    ///
    /// Integers of different widths compare by numeric value.
    pub fn sql_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Int32(a), Value::Int64(b)) => i64::from(a.0) == b.0,
            (Value::Int64(a), Value::Int32(b)) => a.0 == i64::from(b.0),
            (a, b) => a == b,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Blob(v) => v.serialize(serializer),
            Value::Boolean(v) => v.serialize(serializer),
            Value::Date(v) => v.serialize(serializer),
            Value::DateTime(v) => v.serialize(serializer),
            Value::Decimal(v) => v.serialize(serializer),
            Value::Float64(v) => v.serialize(serializer),
            Value::Int32(v) => v.serialize(serializer),
            Value::Int64(v) => v.serialize(serializer),
            Value::Json(v) => v.serialize(serializer),
            Value::Null => serializer.serialize_unit(),
            Value::Text(v) => v.serialize(serializer),
            Value::Time(v) => v.serialize(serializer),
            Value::Uuid(v) => v.serialize(serializer),
        }
    }
}
