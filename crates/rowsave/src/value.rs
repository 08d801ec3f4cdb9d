//! Scalar values carried by parameter sets.
//!
//! Every record field is read into a [`Value`] through the [`ToValue`] trait.
//! `ToValue` also exposes the declared [`FieldKind`] of the Rust type, which the
//! derive macro stores in each field descriptor.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
    Date,
    Time,
    DateTime,
    Uuid,
    Json,
}

/// A dynamically typed scalar bound to a SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeUtc(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for date, time and timestamp values, which get a precision
    /// hint when bound.
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) | Value::DateTimeUtc(_)
        )
    }

    /// Interpret a scalar result as an integer (row counts, generated ids).
    ///
    /// SQL Server returns `SCOPE_IDENTITY()` as `numeric`, which some providers
    /// surface as a float or a string; both are accepted when they hold a whole number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            Value::Float32(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::Float64(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Conversion from a record field to a [`Value`].
pub trait ToValue {
    /// Declared kind of this Rust type.
    const KIND: FieldKind;

    fn to_value(&self) -> Value;
}

macro_rules! impl_to_value {
    ($($ty:ty => $kind:ident, $variant:ident;)*) => {
        $(
            impl ToValue for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_to_value! {
    bool => Bool, Bool;
    i16 => Int, Int16;
    i32 => Int, Int32;
    i64 => Int, Int64;
    f32 => Float, Float32;
    f64 => Float, Float64;
    String => Text, Text;
    Vec<u8> => Bytes, Bytes;
    NaiveDate => Date, Date;
    NaiveTime => Time, Time;
    NaiveDateTime => DateTime, DateTime;
    DateTime<Utc> => DateTime, DateTimeUtc;
    Uuid => Uuid, Uuid;
    serde_json::Value => Json, Json;
}

impl ToValue for &'static str {
    const KIND: FieldKind = FieldKind::Text;

    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::INT2 {
        i16::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(v)?.to_sql(ty, out)
    } else {
        v.to_sql_checked(ty, out)
    }
}

fn float_to_sql(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::FLOAT4 {
        (v as f32).to_sql(ty, out)
    } else {
        v.to_sql_checked(ty, out)
    }
}

// Parameter types are inferred by the server from the statement, so integer and
// float widths are coerced to whatever the column expects.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int16(v) => int_to_sql(i64::from(*v), ty, out),
            Value::Int32(v) => int_to_sql(i64::from(*v), ty, out),
            Value::Int64(v) => int_to_sql(*v, ty, out),
            Value::Float32(v) => float_to_sql(f64::from(*v), ty, out),
            Value::Float64(v) => float_to_sql(*v, ty, out),
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Time(v) => v.to_sql_checked(ty, out),
            Value::DateTime(v) => v.to_sql_checked(ty, out),
            Value::DateTimeUtc(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
