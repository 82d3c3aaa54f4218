//! Compilation of rule trees into storage filters.

use serde_json::Value as Json;

use crate::config::Limits;
use crate::error::{ErrorKind, Result, RuleError};
use crate::filter::{Bound, Comparison, Filter};
use crate::operator::Operator;
use crate::rule::{AtomicRule, CombinedRule, Condition, Rule};
use crate::validators;

impl Rule {
    /// Compiles against the default [`Limits`].
    ///
    /// ```
    /// use querybuilder::parse;
    /// use serde_json::json;
    ///
    /// let rule = parse(&json!({
    ///     "condition": "AND",
    ///     "rules": [
    ///         {"operator": "equal", "field": "name", "value": "x"},
    ///         {"operator": "greater", "field": "age", "value": 10}
    ///     ]
    /// }))
    /// .unwrap()
    /// .unwrap();
    ///
    /// assert_eq!(
    ///     rule.compile().unwrap().to_document(),
    ///     json!({"$and": [{"name": {"$eq": "x"}}, {"age": {"$gt": 10}}]})
    /// );
    /// ```
    pub fn compile(&self) -> Result<Filter> {
        self.compile_with(&Limits::default())
    }

    /// Validates with `limits`, then compiles. Fails exactly as
    /// [`validate_with`](Rule::validate_with) would.
    pub fn compile_with(&self, limits: &Limits) -> Result<Filter> {
        self.validate_with(limits)?;
        let result = self.lower(limits);
        if let Err(err) = &result {
            tracing::debug!(path = %err.path, error = %err.kind, "rule failed to compile");
        }
        result
    }

    fn lower(&self, limits: &Limits) -> Result<Filter> {
        match self {
            Rule::Atomic(atomic) => atomic.lower(limits),
            Rule::Combined(combined) => combined.lower(limits),
        }
    }
}

impl CombinedRule {
    fn lower(&self, limits: &Limits) -> Result<Filter> {
        let filters = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| rule.lower(limits).map_err(|err| err.within_rule(index)))
            .collect::<Result<Vec<_>>>()?;
        Ok(match self.condition {
            Condition::And => Filter::And(filters),
            Condition::Or => Filter::Or(filters),
        })
    }
}

impl AtomicRule {
    fn lower(&self, limits: &Limits) -> Result<Filter> {
        let operator = self.check(limits)?;
        let comparison = match operator {
            Operator::Equal => Comparison::Eq(self.value.clone()),
            Operator::NotEqual => Comparison::Ne(self.value.clone()),
            Operator::In => Comparison::In(self.array(operator)?),
            Operator::NotIn => Comparison::Nin(self.array(operator)?),
            Operator::Less => Comparison::Lt(self.number(operator)?),
            Operator::LessOrEqual => Comparison::Lte(self.number(operator)?),
            Operator::Greater => Comparison::Gt(self.number(operator)?),
            Operator::GreaterOrEqual => Comparison::Gte(self.number(operator)?),
            Operator::DatetimeLess => Comparison::Lt(self.datetime(operator)?),
            Operator::DatetimeLessOrEqual => Comparison::Lte(self.datetime(operator)?),
            Operator::DatetimeGreater => Comparison::Gt(self.datetime(operator)?),
            Operator::DatetimeGreaterOrEqual => Comparison::Gte(self.datetime(operator)?),
            Operator::BeginsWith => Comparison::Regex(format!("^{}", self.literal(operator)?)),
            Operator::NotBeginsWith => {
                Comparison::NotRegex(format!("^{}", self.literal(operator)?))
            }
            Operator::Contains => Comparison::Regex(self.literal(operator)?),
            Operator::NotContains => Comparison::NotRegex(self.literal(operator)?),
            Operator::EndsWith => Comparison::Regex(format!("{}$", self.literal(operator)?)),
            Operator::NotEndsWith => {
                Comparison::NotRegex(format!("{}$", self.literal(operator)?))
            }
            Operator::IsEmpty => Comparison::Eq(Json::Array(Vec::new())),
            Operator::IsNotEmpty => Comparison::Ne(Json::Array(Vec::new())),
            Operator::IsNull => Comparison::Eq(Json::Null),
            Operator::IsNotNull => Comparison::Ne(Json::Null),
            Operator::Exist => Comparison::Exists(true),
            Operator::NotExist => Comparison::Exists(false),
        };
        Ok(Filter::field(self.field.clone(), comparison))
    }

    fn array(&self, operator: Operator) -> Result<Vec<Json>> {
        match &self.value {
            Json::Array(items) => Ok(items.clone()),
            _ => Err(value_error(operator)),
        }
    }

    fn number(&self, operator: Operator) -> Result<Bound> {
        match &self.value {
            Json::Number(n) => Ok(Bound::Number(n.clone())),
            _ => Err(value_error(operator)),
        }
    }

    fn datetime(&self, operator: Operator) -> Result<Bound> {
        match &self.value {
            Json::String(text) => validators::parse_datetime(text)
                .map(Bound::Datetime)
                .map_err(|kind| RuleError::at("value", kind)),
            _ => Err(value_error(operator)),
        }
    }

    /// The string operand with regex metacharacters escaped.
    fn literal(&self, operator: Operator) -> Result<String> {
        match &self.value {
            Json::String(text) if !text.is_empty() => Ok(regex::escape(text)),
            _ => Err(value_error(operator)),
        }
    }
}

fn value_error(operator: Operator) -> RuleError {
    RuleError::at(
        "value",
        ErrorKind::InvalidValue {
            operator,
            expected: operator.shape().describe(),
        },
    )
}
