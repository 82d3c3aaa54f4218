//! Rule tree types.
//!
//! A [`Rule`] is either an [`AtomicRule`] (a single `field / operator /
//! value` predicate) or a [`CombinedRule`] (an `AND` / `OR` group of child
//! rules). Trees are built once, validated once, then compiled or evaluated.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::config::Limits;
use crate::error::{ErrorKind, Result, RuleError};
use crate::operator::Operator;
use crate::validators;

static FIELD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][\w\-.]*$").expect("field pattern is a valid regex")
});

/// Returns `true` if `field` is a valid, possibly dotted, field name.
pub fn is_valid_field(field: &str) -> bool {
    FIELD_PATTERN.is_match(field)
}

/// Boolean combinator of a [`CombinedRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl Condition {
    /// Parses `AND` or `OR`.
    pub fn from_name(name: &str) -> Option<Condition> {
        match name {
            "AND" => Some(Condition::And),
            "OR" => Some(Condition::Or),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::And => "AND",
            Condition::Or => "OR",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node of the filter tree.
///
/// Serializes to the same shape [`parse`](crate::parse) reads:
///
/// ```
/// use querybuilder::{AtomicRule, Operator, Rule};
/// use serde_json::json;
///
/// let rule = Rule::and(vec![
///     AtomicRule::new("name", Operator::Equal, "x").into(),
///     AtomicRule::new("age", Operator::Greater, 10).into(),
/// ]);
/// assert_eq!(
///     serde_json::to_value(&rule).unwrap(),
///     json!({
///         "condition": "AND",
///         "rules": [
///             {"field": "name", "operator": "equal", "value": "x"},
///             {"field": "age", "operator": "greater", "value": 10}
///         ]
///     })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rule {
    Atomic(AtomicRule),
    Combined(CombinedRule),
}

/// A single `field / operator / value` predicate.
///
/// The operator is kept as its wire name, so a rule naming an unknown
/// operator can still be built; it fails [`validate`](Rule::validate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomicRule {
    /// Field to compare; dots address nested fields.
    pub field: String,
    /// Operator wire name (see [`Operator::as_str`]).
    pub operator: String,
    /// Value to compare against.
    pub value: Json,
}

/// An `AND` / `OR` group of rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRule {
    pub condition: Condition,
    pub rules: Vec<Rule>,
}

impl AtomicRule {
    /// Creates a rule with a registry operator.
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Json>) -> Self {
        AtomicRule {
            field: field.into(),
            operator: operator.as_str().to_string(),
            value: value.into(),
        }
    }

    /// Creates a rule from an operator name, which may not be in the registry.
    pub fn with_operator_name(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Json>,
    ) -> Self {
        AtomicRule {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Resolves the operator name through the registry.
    pub fn resolve_operator(&self) -> Option<Operator> {
        Operator::from_name(&self.operator)
    }

    /// Checks field, operator and value, returning the resolved operator.
    pub(crate) fn check(&self, limits: &Limits) -> Result<Operator> {
        if !is_valid_field(&self.field) {
            return Err(RuleError::at(
                "field",
                ErrorKind::InvalidField(self.field.clone()),
            ));
        }
        let operator = self.resolve_operator().ok_or_else(|| {
            RuleError::at(
                "operator",
                ErrorKind::UnsupportedOperator(self.operator.clone()),
            )
        })?;
        if !limits.allows(operator) {
            return Err(RuleError::at(
                "operator",
                ErrorKind::DisabledOperator(operator),
            ));
        }
        validators::check_value(operator, &self.value)
            .map_err(|kind| RuleError::at("value", kind))?;
        Ok(operator)
    }
}

impl CombinedRule {
    pub fn new(condition: Condition, rules: Vec<Rule>) -> Self {
        CombinedRule { condition, rules }
    }

    fn check(&self, limits: &Limits) -> Result<()> {
        if self.rules.is_empty() {
            return Err(RuleError::at("rules", ErrorKind::EmptyRules));
        }
        for (index, rule) in self.rules.iter().enumerate() {
            rule.check(limits).map_err(|err| err.within_rule(index))?;
        }
        Ok(())
    }
}

impl Rule {
    /// Creates an `AND` group.
    pub fn and(rules: Vec<Rule>) -> Self {
        Rule::Combined(CombinedRule::new(Condition::And, rules))
    }

    /// Creates an `OR` group.
    pub fn or(rules: Vec<Rule>) -> Self {
        Rule::Combined(CombinedRule::new(Condition::Or, rules))
    }

    /// Creates an atomic rule.
    pub fn atomic(field: impl Into<String>, operator: Operator, value: impl Into<Json>) -> Self {
        Rule::Atomic(AtomicRule::new(field, operator, value))
    }

    /// Height of the tree: 1 for an atomic rule, `1 + max(children)` for a group.
    pub fn depth(&self) -> usize {
        match self {
            Rule::Atomic(_) => 1,
            Rule::Combined(combined) => {
                1 + combined.rules.iter().map(Rule::depth).max().unwrap_or(0)
            }
        }
    }

    /// Validates against the default [`Limits`].
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&Limits::default())
    }

    /// Validates depth first, then the tree depth-first; the first failure wins.
    pub fn validate_with(&self, limits: &Limits) -> Result<()> {
        let depth = self.depth();
        let result = if depth > limits.max_depth {
            Err(RuleError::new(ErrorKind::TooDeep {
                depth,
                max: limits.max_depth,
            }))
        } else {
            self.check(limits)
        };
        if let Err(err) = &result {
            tracing::debug!(path = %err.path, error = %err.kind, "rule failed validation");
        }
        result
    }

    fn check(&self, limits: &Limits) -> Result<()> {
        match self {
            Rule::Atomic(atomic) => atomic.check(limits).map(|_| ()),
            Rule::Combined(combined) => combined.check(limits),
        }
    }
}

impl From<AtomicRule> for Rule {
    fn from(rule: AtomicRule) -> Self {
        Rule::Atomic(rule)
    }
}

impl From<CombinedRule> for Rule {
    fn from(rule: CombinedRule) -> Self {
        Rule::Combined(rule)
    }
}
