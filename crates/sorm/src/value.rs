//! Bound values, raw SQL expressions and ordered write payloads.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// A value bound to a `?` placeholder.
///
/// The set of variants is closed; anything the driver should receive as a
/// parameter converts into one of these via `From`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text payload, if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Display text used when rendering audited statements.
///
/// Text is written verbatim (no quoting); the rendered form is for humans,
/// never for re-execution.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::UInt(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Loosely-typed input (e.g. request bodies) converts at the boundary.
///
/// Arrays and objects are bound as their JSON text.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

/// Build a `Vec<Value>` from heterogeneous arguments.
///
/// ```ignore
/// builder.where_raw("`age` BETWEEN ? AND ?", sorm::args![18, 30]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($v:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($v)),+]
    };
}

/// A literal SQL expression emitted verbatim instead of a bound placeholder.
///
/// **Warning**: the text is not escaped. Only use trusted expressions such
/// as `` `age`+1 ``.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue(String);

impl RawValue {
    pub fn new(sql: impl Into<String>) -> Self {
        RawValue(sql.into())
    }

    /// The SQL text.
    pub fn as_sql(&self) -> &str {
        &self.0
    }
}

/// Shorthand for [`RawValue::new`].
pub fn raw(sql: impl Into<String>) -> RawValue {
    RawValue::new(sql)
}

/// The right-hand side of an INSERT/UPDATE column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Bound as a `?` parameter
    Bind(Value),
    /// Emitted verbatim
    Raw(RawValue),
}

impl From<RawValue> for FieldValue {
    fn from(v: RawValue) -> Self {
        FieldValue::Raw(v)
    }
}

/// Implement `From<scalar>` for a wrapper around [`Value`].
macro_rules! impl_from_scalars {
    (@each $target:ty => $ctor:path; $($t:ty),*) => {
        $(impl From<$t> for $target {
            fn from(v: $t) -> Self {
                $ctor($crate::value::Value::from(v))
            }
        })*
    };
    ($target:ty => $ctor:path) => {
        $crate::value::impl_from_scalars!(@each $target => $ctor;
            $crate::value::Value, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize,
            f32, f64, &str, String, &String, Vec<u8>, chrono::NaiveDate, chrono::NaiveDateTime,
            serde_json::Value);

        impl<T: Into<$crate::value::Value>> From<Option<T>> for $target {
            fn from(v: Option<T>) -> Self {
                $ctor($crate::value::Value::from(v))
            }
        }
    };
}

pub(crate) use impl_from_scalars;

impl_from_scalars!(FieldValue => FieldValue::Bind);

/// Ordered column/value list for INSERT and UPDATE.
///
/// Columns compile in insertion order, so the same payload always yields the
/// same SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, FieldValue)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column value (bound, or raw if given a [`RawValue`]).
    pub fn set(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(column, value);
        self
    }

    /// Append a raw SQL expression for a column.
    pub fn set_raw(self, column: impl Into<String>, sql: impl Into<String>) -> Self {
        self.set(column, RawValue::new(sql))
    }

    /// Append in place.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.push((column.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Payload
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (k, v) in iter {
            payload.push(k, v);
        }
        payload
    }
}
