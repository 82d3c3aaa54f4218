//! Error types for the querybuilder crate.
//!
//! Every failure carries a path locating the offending node, such as
//! `rules[1].rules[0].value`, so callers can point at the bad clause in a
//! large filter. The root node has an empty path.

use thiserror::Error;

use crate::operator::Operator;

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The node is neither a combined nor an atomic rule.
    #[error("no filter found: expected a `condition` or `operator` key")]
    NoFilter,

    /// A node or key has the wrong JSON type.
    #[error("malformed rule: expected {expected}")]
    Decode { expected: &'static str },

    /// The condition is not `AND` or `OR`.
    #[error("unsupported condition '{0}'")]
    InvalidCondition(String),

    /// A combined rule has no children.
    #[error("combined rule must contain at least one rule")]
    EmptyRules,

    /// The field name does not match the naming pattern.
    #[error("invalid field name '{0}'")]
    InvalidField(String),

    /// The operator is not in the registry.
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    /// The operator is known but currently disabled.
    #[error("operator '{0}' is disabled")]
    DisabledOperator(Operator),

    /// The value's type does not fit the operator.
    #[error("operator '{operator}' requires {expected}")]
    InvalidValue {
        operator: Operator,
        expected: &'static str,
    },

    /// The value is a string but not an RFC-3339 datetime.
    #[error("invalid RFC-3339 datetime '{value}': {reason}")]
    InvalidDatetime { value: String, reason: String },

    /// The tree is nested deeper than allowed.
    #[error("rule depth {depth} exceeds the maximum of {max}")]
    TooDeep { depth: usize, max: usize },

    /// The input text is not JSON.
    #[error("invalid JSON: {0}")]
    Json(String),
}

/// A located rule error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{kind}", path_prefix(.path))]
pub struct RuleError {
    /// Path of the failing node, empty for the root.
    pub path: String,
    /// The failure itself.
    pub kind: ErrorKind,
}

impl RuleError {
    /// Creates an error at the root path.
    pub fn new(kind: ErrorKind) -> Self {
        RuleError {
            path: String::new(),
            kind,
        }
    }

    /// Creates an error at the given path.
    pub fn at(path: impl Into<String>, kind: ErrorKind) -> Self {
        RuleError {
            path: path.into(),
            kind,
        }
    }

    /// Prefixes the path with a parent segment.
    ///
    /// `within("rules[2]")` turns `value` into `rules[2].value` and the root
    /// path into `rules[2]`.
    pub fn within(mut self, segment: &str) -> Self {
        self.path = if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{segment}.{}", self.path)
        };
        self
    }

    /// Prefixes the path with `rules[index]`.
    pub(crate) fn within_rule(self, index: usize) -> Self {
        self.within(&format!("rules[{index}]"))
    }
}

fn path_prefix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{path}: ")
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::new(ErrorKind::Json(err.to_string()))
    }
}

/// Result type for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_builds_dotted_paths() {
        let err = RuleError::at("value", ErrorKind::EmptyRules)
            .within_rule(0)
            .within_rule(1);
        assert_eq!(err.path, "rules[1].rules[0].value");
    }

    #[test]
    fn within_root_path() {
        let err = RuleError::new(ErrorKind::NoFilter).within_rule(3);
        assert_eq!(err.path, "rules[3]");
    }

    #[test]
    fn display_includes_path() {
        let err = RuleError::at("field", ErrorKind::InvalidField("1x".into()));
        assert_eq!(err.to_string(), "field: invalid field name '1x'");

        let root = RuleError::new(ErrorKind::TooDeep { depth: 4, max: 3 });
        assert_eq!(root.to_string(), "rule depth 4 exceeds the maximum of 3");
    }
}
