//! In-memory evaluation of rule trees.
//!
//! [`Rule::evaluate`] supplies only the `AND` / `OR` logic and asks a
//! caller-supplied predicate about each atomic rule. [`Rule::matches`] plugs
//! in [`AtomicRule::matches`] over a [`Record`], so a tree can filter records
//! fetched by other means. Semantics follow the compiled filter, except that
//! datetime operators also accept RFC-3339 string fields (see
//! [`AtomicRule::matches`]).

use std::cmp::Ordering;

use serde_json::Value as Json;

use crate::operator::Operator;
use crate::record::Record;
use crate::rule::{AtomicRule, Condition, Rule};
use crate::value::{FieldValue, Number, Timestamp};

impl Rule {
    /// Evaluates the tree with `predicate` deciding each atomic rule.
    ///
    /// `AND` stops at the first false child, `OR` at the first true one. A
    /// group with no children is true.
    ///
    /// ```
    /// use querybuilder::{Operator, Rule};
    ///
    /// let rule = Rule::or(vec![
    ///     Rule::atomic("a", Operator::Exist, ()),
    ///     Rule::atomic("b", Operator::Exist, ()),
    /// ]);
    /// assert!(rule.evaluate(|atomic| atomic.field == "b"));
    /// ```
    pub fn evaluate<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&AtomicRule) -> bool,
    {
        self.eval(&mut predicate)
    }

    fn eval<F>(&self, predicate: &mut F) -> bool
    where
        F: FnMut(&AtomicRule) -> bool,
    {
        match self {
            Rule::Atomic(atomic) => predicate(atomic),
            Rule::Combined(combined) => {
                if combined.rules.is_empty() {
                    return true;
                }
                match combined.condition {
                    Condition::And => combined.rules.iter().all(|rule| rule.eval(&mut *predicate)),
                    Condition::Or => combined.rules.iter().any(|rule| rule.eval(&mut *predicate)),
                }
            }
        }
    }

    /// Tests if a record matches this rule.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.evaluate(|atomic| atomic.matches(&record.field_value(&atomic.field)))
    }

    /// Returns references to the matching records, in input order.
    pub fn filter<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|record| self.matches(*record)).collect()
    }

    /// Counts the matching records.
    pub fn count<R: Record>(&self, records: &[R]) -> usize {
        records.iter().filter(|record| self.matches(*record)).count()
    }

    /// Returns `true` if any record matches.
    pub fn any<R: Record>(&self, records: &[R]) -> bool {
        records.iter().any(|record| self.matches(record))
    }

    /// Returns `true` if every record matches.
    pub fn all<R: Record>(&self, records: &[R]) -> bool {
        records.iter().all(|record| self.matches(record))
    }

    /// Finds the first matching record.
    pub fn find<'a, R: Record>(&self, records: &'a [R]) -> Option<&'a R> {
        records.iter().find(|record| self.matches(*record))
    }
}

/// Matches a record against an optional rule; no rule matches everything.
pub fn record_matches<R: Record + ?Sized>(rule: Option<&Rule>, record: &R) -> bool {
    rule.map_or(true, |rule| rule.matches(record))
}

impl AtomicRule {
    /// Evaluates this rule against one field value.
    ///
    /// Negated operators are exact complements of their positive forms, so
    /// `not_equal` matches a missing field. An unknown operator never matches.
    ///
    /// Datetime operators compare [`FieldValue::Timestamp`] fields and also
    /// RFC-3339 [`FieldValue::String`] fields. The compiled `{"$date": ...}`
    /// bound only matches stored dates, so a string field that matches here
    /// will not match in the store.
    pub fn matches(&self, field: &FieldValue<'_>) -> bool {
        let Some(operator) = self.resolve_operator() else {
            return false;
        };
        match operator.negates() {
            Some(positive) => !self.matches_positive(positive, field),
            None => self.matches_positive(operator, field),
        }
    }

    fn matches_positive(&self, operator: Operator, field: &FieldValue<'_>) -> bool {
        match operator {
            Operator::Equal => any_element(field, |f| scalar_eq(&self.value, f)),
            Operator::In => match &self.value {
                Json::Array(items) => {
                    any_element(field, |f| items.iter().any(|item| scalar_eq(item, f)))
                }
                _ => false,
            },
            Operator::Less
            | Operator::LessOrEqual
            | Operator::Greater
            | Operator::GreaterOrEqual => {
                let Json::Number(bound) = &self.value else {
                    return false;
                };
                let bound = Number::from_json(bound);
                any_element(field, |f| {
                    f.as_number()
                        .and_then(|n| n.compare(bound))
                        .is_some_and(|ordering| satisfies(operator, ordering))
                })
            }
            Operator::DatetimeLess
            | Operator::DatetimeLessOrEqual
            | Operator::DatetimeGreater
            | Operator::DatetimeGreaterOrEqual => {
                let Some(bound) = self.value.as_str().and_then(Timestamp::parse_rfc3339) else {
                    return false;
                };
                any_element(field, |f| {
                    f.as_timestamp()
                        .is_some_and(|ts| satisfies(operator, ts.cmp(&bound)))
                })
            }
            Operator::BeginsWith | Operator::Contains | Operator::EndsWith => {
                let Some(needle) = self.value.as_str() else {
                    return false;
                };
                any_element(field, |f| {
                    f.as_str().is_some_and(|s| match operator {
                        Operator::BeginsWith => s.starts_with(needle),
                        Operator::EndsWith => s.ends_with(needle),
                        _ => s.contains(needle),
                    })
                })
            }
            Operator::IsEmpty => field.as_array().is_some_and(<[_]>::is_empty),
            Operator::IsNull => field.is_null() || field.is_missing(),
            Operator::Exist => !field.is_missing(),
            // negated forms are resolved by `matches`
            _ => false,
        }
    }
}

/// An array field matches when any element does; other fields are tested directly.
fn any_element(field: &FieldValue<'_>, test: impl Fn(&FieldValue<'_>) -> bool) -> bool {
    match field {
        FieldValue::Array(items) => items.iter().any(&test),
        other => test(other),
    }
}

fn scalar_eq(expected: &Json, field: &FieldValue<'_>) -> bool {
    match (expected, field) {
        (Json::String(a), FieldValue::String(b)) => a.as_str() == *b,
        (Json::Bool(a), FieldValue::Bool(b)) => a == b,
        (Json::Number(a), FieldValue::Number(b)) => {
            Number::from_json(a).compare(*b) == Some(Ordering::Equal)
        }
        _ => false,
    }
}

fn satisfies(operator: Operator, ordering: Ordering) -> bool {
    match operator {
        Operator::Less | Operator::DatetimeLess => ordering == Ordering::Less,
        Operator::LessOrEqual | Operator::DatetimeLessOrEqual => ordering != Ordering::Greater,
        Operator::Greater | Operator::DatetimeGreater => ordering == Ordering::Greater,
        Operator::GreaterOrEqual | Operator::DatetimeGreaterOrEqual => {
            ordering != Ordering::Less
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn atomic(operator: Operator, value: Json) -> AtomicRule {
        AtomicRule::new("f", operator, value)
    }

    #[test]
    fn evaluate_delegates_atomic() {
        let rule = Rule::atomic("a", Operator::Equal, 1);
        assert!(rule.evaluate(|_| true));
        assert!(!rule.evaluate(|_| false));
    }

    #[test]
    fn empty_group_is_true() {
        assert!(Rule::and(vec![]).evaluate(|_| false));
        assert!(Rule::or(vec![]).evaluate(|_| false));
    }

    #[test]
    fn and_short_circuits() {
        let rule = Rule::and(vec![
            Rule::atomic("a", Operator::Exist, ()),
            Rule::atomic("b", Operator::Exist, ()),
        ]);
        let mut seen = Vec::new();
        assert!(!rule.evaluate(|atomic| {
            seen.push(atomic.field.clone());
            false
        }));
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn or_short_circuits() {
        let rule = Rule::or(vec![
            Rule::atomic("a", Operator::Exist, ()),
            Rule::atomic("b", Operator::Exist, ()),
        ]);
        let mut calls = 0;
        assert!(rule.evaluate(|_| {
            calls += 1;
            true
        }));
        assert_eq!(calls, 1);
    }

    #[test]
    fn equality() {
        let rule = atomic(Operator::Equal, json!("x"));
        assert!(rule.matches(&FieldValue::String("x")));
        assert!(!rule.matches(&FieldValue::String("X")));
        assert!(!rule.matches(&FieldValue::Missing));
        assert!(rule.matches(&FieldValue::Array(vec![
            FieldValue::String("y"),
            FieldValue::String("x"),
        ])));

        let rule = atomic(Operator::Equal, json!(10));
        assert!(rule.matches(&FieldValue::Number(Number::F64(10.0))));
        assert!(!rule.matches(&FieldValue::String("10")));

        let rule = atomic(Operator::NotEqual, json!(true));
        assert!(rule.matches(&FieldValue::Bool(false)));
        assert!(rule.matches(&FieldValue::Missing));
        assert!(!rule.matches(&FieldValue::Bool(true)));
    }

    #[test]
    fn membership() {
        let rule = atomic(Operator::In, json!([1, 2]));
        assert!(rule.matches(&FieldValue::Number(Number::U64(2))));
        assert!(!rule.matches(&FieldValue::Number(Number::U64(3))));

        let rule = atomic(Operator::NotIn, json!(["a"]));
        assert!(rule.matches(&FieldValue::String("b")));
        assert!(!rule.matches(&FieldValue::String("a")));
    }

    #[test]
    fn numeric_ordering() {
        let field = FieldValue::Number(Number::I64(10));
        assert!(atomic(Operator::Less, json!(11)).matches(&field));
        assert!(!atomic(Operator::Less, json!(10)).matches(&field));
        assert!(atomic(Operator::LessOrEqual, json!(10)).matches(&field));
        assert!(atomic(Operator::Greater, json!(9.5)).matches(&field));
        assert!(atomic(Operator::GreaterOrEqual, json!(10)).matches(&field));
        assert!(!atomic(Operator::Greater, json!(10)).matches(&FieldValue::String("11")));
    }

    #[test]
    fn datetime_ordering() {
        let field = FieldValue::String("2024-06-01T00:00:00Z");
        assert!(atomic(Operator::DatetimeGreater, json!("2024-01-01T00:00:00Z")).matches(&field));
        assert!(!atomic(Operator::DatetimeLess, json!("2024-01-01T00:00:00Z")).matches(&field));
        assert!(atomic(Operator::DatetimeLessOrEqual, json!("2024-06-01T08:00:00+08:00"))
            .matches(&field));

        let ts = FieldValue::Timestamp(Timestamp::from_secs(0));
        assert!(atomic(Operator::DatetimeGreaterOrEqual, json!("1970-01-01T00:00:00Z")).matches(&ts));
        assert!(!atomic(Operator::DatetimeGreater, json!("1970-01-01T00:00:00Z"))
            .matches(&FieldValue::String("garbage")));
    }

    #[test]
    fn datetime_operators_accept_string_fields() {
        let rule = AtomicRule::new("f", Operator::DatetimeGreater, "2024-01-01T00:00:00Z");
        assert!(rule.matches(&FieldValue::String("2025-01-01T00:00:00Z")));
        assert!(rule.matches(&FieldValue::Timestamp(Timestamp::from_secs(1_735_689_600))));
        assert!(!rule.matches(&FieldValue::String("2023-12-31T23:59:59Z")));
        assert!(!rule.matches(&FieldValue::Number(Number::I64(1_735_689_600_000))));
    }

    #[test]
    fn string_matching() {
        let field = FieldValue::String("web-server-01");
        assert!(atomic(Operator::BeginsWith, json!("web")).matches(&field));
        assert!(!atomic(Operator::NotBeginsWith, json!("web")).matches(&field));
        assert!(atomic(Operator::Contains, json!("server")).matches(&field));
        assert!(atomic(Operator::NotContains, json!("db")).matches(&field));
        assert!(atomic(Operator::EndsWith, json!("01")).matches(&field));
        assert!(!atomic(Operator::NotEndsWith, json!("01")).matches(&field));
        // patterns are literal
        assert!(!atomic(Operator::Contains, json!(".*")).matches(&field));
    }

    #[test]
    fn emptiness_nullness_existence() {
        let empty = FieldValue::Array(vec![]);
        let full = FieldValue::Array(vec![FieldValue::Null]);
        assert!(atomic(Operator::IsEmpty, Json::Null).matches(&empty));
        assert!(!atomic(Operator::IsEmpty, Json::Null).matches(&full));
        assert!(atomic(Operator::IsNotEmpty, Json::Null).matches(&full));

        assert!(atomic(Operator::IsNull, Json::Null).matches(&FieldValue::Null));
        assert!(atomic(Operator::IsNull, Json::Null).matches(&FieldValue::Missing));
        assert!(atomic(Operator::IsNotNull, Json::Null).matches(&FieldValue::Bool(false)));

        assert!(atomic(Operator::Exist, Json::Null).matches(&FieldValue::Null));
        assert!(!atomic(Operator::Exist, Json::Null).matches(&FieldValue::Missing));
        assert!(atomic(Operator::NotExist, Json::Null).matches(&FieldValue::Missing));
    }

    #[test]
    fn unknown_operator_never_matches() {
        let rule = AtomicRule::with_operator_name("f", "like", "x");
        assert!(!rule.matches(&FieldValue::String("x")));
    }

    #[test]
    fn records() {
        let hosts = vec![
            json!({"name": "web-1", "cpu": 4, "os": {"type": "linux"}}),
            json!({"name": "web-2", "cpu": 16, "os": {"type": "linux"}}),
            json!({"name": "db-1", "cpu": 32, "os": {"type": "windows"}}),
        ];
        let rule = Rule::and(vec![
            Rule::atomic("os.type", Operator::Equal, "linux"),
            Rule::atomic("cpu", Operator::GreaterOrEqual, 8),
        ]);
        let found = rule.filter(&hosts);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["name"], "web-2");
        assert_eq!(rule.count(&hosts), 1);
        assert!(rule.any(&hosts));
        assert!(!rule.all(&hosts));
        assert_eq!(rule.find(&hosts).map(|h| &h["name"]), Some(&json!("web-2")));
    }

    #[test]
    fn no_rule_matches_everything() {
        let doc = json!({"a": 1});
        assert!(record_matches(None, &doc));
        let rule = Rule::atomic("a", Operator::Equal, 2);
        assert!(!record_matches(Some(&rule), &doc));
    }
}
