//! Value type checks shared by validation and compilation.

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

use crate::error::ErrorKind;
use crate::operator::{Operator, ValueShape};

/// The kind of a basic scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Number,
    Bool,
    String,
}

/// Returns the basic kind of a value, or `None` for null, arrays and objects.
pub fn basic_kind(value: &Json) -> Option<BasicKind> {
    match value {
        Json::Number(_) => Some(BasicKind::Number),
        Json::Bool(_) => Some(BasicKind::Bool),
        Json::String(_) => Some(BasicKind::String),
        _ => None,
    }
}

pub(crate) fn is_basic(value: &Json) -> bool {
    basic_kind(value).is_some()
}

pub(crate) fn is_numeric(value: &Json) -> bool {
    value.is_number()
}

pub(crate) fn is_non_empty_string(value: &Json) -> bool {
    matches!(value, Json::String(s) if !s.is_empty())
}

/// Returns `true` if `value` is an array whose elements are all basic values
/// of one kind. An empty array qualifies.
pub(crate) fn is_basic_slice(value: &Json) -> bool {
    let Json::Array(items) = value else {
        return false;
    };
    let mut kinds = items.iter().map(basic_kind);
    match kinds.next() {
        None => true,
        Some(None) => false,
        Some(Some(first)) => kinds.all(|kind| kind == Some(first)),
    }
}

/// Parses an RFC-3339 datetime into UTC. A space may stand in for the `T`
/// separator; the offset is required.
pub(crate) fn parse_datetime(text: &str) -> Result<DateTime<Utc>, ErrorKind> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| ErrorKind::InvalidDatetime {
            value: text.to_string(),
            reason: err.to_string(),
        })
}

/// Checks that `value` has the shape `operator` requires.
pub fn check_value(operator: Operator, value: &Json) -> Result<(), ErrorKind> {
    let shape = operator.shape();
    let ok = match shape {
        ValueShape::Basic => is_basic(value),
        ValueShape::BasicSlice => is_basic_slice(value),
        ValueShape::Numeric => is_numeric(value),
        ValueShape::Datetime => {
            let Json::String(text) = value else {
                return Err(invalid(operator, shape));
            };
            return parse_datetime(text).map(|_| ());
        }
        ValueShape::NonEmptyString => is_non_empty_string(value),
        ValueShape::Ignored => true,
    };
    if ok {
        Ok(())
    } else {
        Err(invalid(operator, shape))
    }
}

fn invalid(operator: Operator, shape: ValueShape) -> ErrorKind {
    ErrorKind::InvalidValue {
        operator,
        expected: shape.describe(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_checks() {
        assert!(is_numeric(&json!(1)));
        assert!(is_numeric(&json!(-1.5)));
        assert!(!is_numeric(&json!("1")));

        assert!(!is_non_empty_string(&json!("")));
        assert!(!is_non_empty_string(&json!(1)));
        assert!(is_non_empty_string(&json!("x")));

        assert!(is_basic(&json!("x")));
        assert!(!is_basic(&json!(null)));
        assert!(!is_basic(&json!([1])));
        assert!(!is_basic(&json!({"a": 1})));
    }

    #[test]
    fn basic_slices() {
        assert!(is_basic_slice(&json!([])));
        assert!(is_basic_slice(&json!([1, 2.5, 3])));
        assert!(is_basic_slice(&json!(["a", "b"])));
        assert!(is_basic_slice(&json!([true])));

        assert!(!is_basic_slice(&json!([1, "a"])));
        assert!(!is_basic_slice(&json!([null])));
        assert!(!is_basic_slice(&json!([[1]])));
        assert!(!is_basic_slice(&json!("a")));
    }

    #[test]
    fn datetimes() {
        let dt = parse_datetime("2024-01-02T03:04:05+08:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T19:04:05+00:00");

        assert!(parse_datetime("2024-01-02").is_err());
        assert!(matches!(
            parse_datetime("yesterday"),
            Err(ErrorKind::InvalidDatetime { .. })
        ));
    }

    #[test]
    fn datetime_separator_may_be_a_space() {
        // RFC 3339 section 5.6 permits a space in place of `T`
        let spaced = parse_datetime("2024-01-01 00:00:00Z").unwrap();
        assert_eq!(spaced, parse_datetime("2024-01-01T00:00:00Z").unwrap());
        assert!(check_value(Operator::DatetimeLess, &json!("2024-01-01 00:00:00Z")).is_ok());

        assert!(parse_datetime("2024-01-01_00:00:00Z").is_err());
        assert!(parse_datetime("2024-01-01T00:00:00").is_err());
    }

    #[test]
    fn check_value_by_operator() {
        assert!(check_value(Operator::Equal, &json!(true)).is_ok());
        assert!(check_value(Operator::Equal, &json!([1])).is_err());
        assert!(check_value(Operator::In, &json!(["a"])).is_ok());
        assert!(check_value(Operator::In, &json!(["a", 1])).is_err());
        assert!(check_value(Operator::Less, &json!(3)).is_ok());
        assert!(check_value(Operator::Less, &json!("3")).is_err());
        assert!(check_value(Operator::DatetimeLess, &json!("2024-01-01T00:00:00Z")).is_ok());
        assert!(check_value(Operator::DatetimeLess, &json!(1700000000)).is_err());
        assert!(check_value(Operator::BeginsWith, &json!("a")).is_ok());
        assert!(check_value(Operator::BeginsWith, &json!("")).is_err());
        assert!(check_value(Operator::IsNull, &json!({"anything": []})).is_ok());
    }
}
