//! Runtime field values for in-memory matching.
//!
//! The [`FieldValue`] enum is what a [`Record`](crate::Record) hands back for
//! a field path. It borrows from the record where it can.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

/// Value of one record field.
///
/// # Example
///
/// ```
/// use querybuilder::{FieldValue, Number};
///
/// struct Host {
///     name: String,
///     cpu: u32,
/// }
///
/// fn field<'a>(host: &'a Host, path: &str) -> FieldValue<'a> {
///     match path {
///         "name" => FieldValue::String(&host.name),
///         "cpu" => FieldValue::Number(Number::U64(host.cpu as u64)),
///         _ => FieldValue::Missing,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// The field is not present on the record.
    Missing,
    /// The field is present and null.
    Null,
    Bool(bool),
    Number(Number),
    String(&'a str),
    Timestamp(Timestamp),
    Array(Vec<FieldValue<'a>>),
    /// A nested object; present, but not comparable.
    Object,
}

impl<'a> FieldValue<'a> {
    /// Borrows a JSON value.
    pub fn from_json(value: &'a Json) -> Self {
        match value {
            Json::Null => FieldValue::Null,
            Json::Bool(b) => FieldValue::Bool(*b),
            Json::Number(n) => FieldValue::Number(Number::from_json(n)),
            Json::String(s) => FieldValue::String(s),
            Json::Array(items) => FieldValue::Array(items.iter().map(FieldValue::from_json).collect()),
            Json::Object(_) => FieldValue::Object,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a timestamp for timestamp fields and RFC-3339 string fields.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            FieldValue::String(s) => Timestamp::parse_rfc3339(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue<'a>]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Comparisons between different variants convert to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    /// Converts a JSON number, preferring the integer variants.
    pub fn from_json(n: &serde_json::Number) -> Self {
        if let Some(u) = n.as_u64() {
            Number::U64(u)
        } else if let Some(i) = n.as_i64() {
            Number::I64(i)
        } else {
            Number::F64(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types. `None` involves NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

fn compare_signed(a: i64, b: u64) -> Ordering {
    if a < 0 {
        Ordering::Less
    } else {
        (a as u64).cmp(&b)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

/// Timestamp as milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Saturates at the `i64` millisecond range.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Parses an RFC-3339 datetime, or `None` if it is not one.
    pub fn parse_rfc3339(text: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| Timestamp(dt.timestamp_millis()))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp(dt.timestamp_millis())
    }
}
