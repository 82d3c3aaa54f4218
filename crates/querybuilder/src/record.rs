//! Records that rules can be matched against in memory.

use serde_json::{Map, Value as Json};

use crate::value::FieldValue;

/// A record exposing its fields by path.
///
/// Implemented for JSON documents, where dotted paths walk nested objects.
/// Implement it by hand for your own types:
///
/// ```
/// use querybuilder::{FieldValue, Number, Record};
///
/// struct Host {
///     name: String,
///     cpu: u8,
/// }
///
/// impl Record for Host {
///     fn field_value(&self, path: &str) -> FieldValue<'_> {
///         match path {
///             "name" => FieldValue::String(&self.name),
///             "cpu" => FieldValue::Number(Number::U64(self.cpu as u64)),
///             _ => FieldValue::Missing,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value at `path`, or [`FieldValue::Missing`] if there is none.
    fn field_value(&self, path: &str) -> FieldValue<'_>;
}

impl Record for Json {
    fn field_value(&self, path: &str) -> FieldValue<'_> {
        match self {
            Json::Object(map) => map.field_value(path),
            _ => FieldValue::Missing,
        }
    }
}

impl Record for Map<String, Json> {
    fn field_value(&self, path: &str) -> FieldValue<'_> {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return FieldValue::Missing;
        };
        let mut current = match self.get(first) {
            Some(value) => value,
            None => return FieldValue::Missing,
        };
        for segment in segments {
            current = match current.get(segment) {
                Some(value) => value,
                None => return FieldValue::Missing,
            };
        }
        FieldValue::from_json(current)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field_value(&self, path: &str) -> FieldValue<'_> {
        (**self).field_value(path)
    }
}
