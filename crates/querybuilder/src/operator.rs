//! Comparison operators and their registry.
//!
//! The [`Operator`] enum is the closed set of supported operators. What each
//! operator requires of its value, and whether it is currently enabled, lives
//! in one declarative table ([`REGISTRY`]) so the validator and the compiler
//! read the same facts.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator of an atomic rule.
///
/// Operators fall into families:
/// - **Equality**: `Equal`, `NotEqual`
/// - **Membership**: `In`, `NotIn`
/// - **Numeric ordering**: `Less`, `LessOrEqual`, `Greater`, `GreaterOrEqual`
/// - **Datetime ordering**: the same four on RFC-3339 strings
/// - **String matching**: begins/contains/ends with, and their negations
/// - **Emptiness / nullness / existence**: value is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equal,
    NotEqual,
    In,
    NotIn,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    DatetimeLess,
    DatetimeLessOrEqual,
    DatetimeGreater,
    DatetimeGreaterOrEqual,
    BeginsWith,
    NotBeginsWith,
    Contains,
    NotContains,
    EndsWith,
    NotEndsWith,
    IsEmpty,
    IsNotEmpty,
    IsNull,
    IsNotNull,
    Exist,
    NotExist,
}

/// The value an operator requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    /// A single number, boolean or string.
    Basic,
    /// An array of basic values, all of the same kind.
    BasicSlice,
    /// A number.
    Numeric,
    /// A string holding an RFC-3339 datetime.
    Datetime,
    /// A string with at least one character.
    NonEmptyString,
    /// Anything; the value is not used.
    Ignored,
}

impl ValueShape {
    /// Human-readable description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            ValueShape::Basic => "a number, boolean or string value",
            ValueShape::BasicSlice => "an array of numbers, booleans or strings of one type",
            ValueShape::Numeric => "a numeric value",
            ValueShape::Datetime => "an RFC-3339 datetime string",
            ValueShape::NonEmptyString => "a non-empty string",
            ValueShape::Ignored => "no value",
        }
    }
}

/// One registry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorInfo {
    pub operator: Operator,
    /// Wire name, as it appears in the `operator` key.
    pub name: &'static str,
    /// Operators may ship disabled while their backend translation is unfinished.
    pub enabled: bool,
    pub shape: ValueShape,
}

const fn row(operator: Operator, name: &'static str, shape: ValueShape) -> OperatorInfo {
    OperatorInfo {
        operator,
        name,
        enabled: true,
        shape,
    }
}

/// All operators, in declaration order of [`Operator`].
pub const REGISTRY: [OperatorInfo; 24] = [
    row(Operator::Equal, "equal", ValueShape::Basic),
    row(Operator::NotEqual, "not_equal", ValueShape::Basic),
    row(Operator::In, "in", ValueShape::BasicSlice),
    row(Operator::NotIn, "not_in", ValueShape::BasicSlice),
    row(Operator::Less, "less", ValueShape::Numeric),
    row(Operator::LessOrEqual, "less_or_equal", ValueShape::Numeric),
    row(Operator::Greater, "greater", ValueShape::Numeric),
    row(Operator::GreaterOrEqual, "greater_or_equal", ValueShape::Numeric),
    row(Operator::DatetimeLess, "datetime_less", ValueShape::Datetime),
    row(
        Operator::DatetimeLessOrEqual,
        "datetime_less_or_equal",
        ValueShape::Datetime,
    ),
    row(Operator::DatetimeGreater, "datetime_greater", ValueShape::Datetime),
    row(
        Operator::DatetimeGreaterOrEqual,
        "datetime_greater_or_equal",
        ValueShape::Datetime,
    ),
    row(Operator::BeginsWith, "begins_with", ValueShape::NonEmptyString),
    row(
        Operator::NotBeginsWith,
        "not_begins_with",
        ValueShape::NonEmptyString,
    ),
    row(Operator::Contains, "contains", ValueShape::NonEmptyString),
    row(Operator::NotContains, "not_contains", ValueShape::NonEmptyString),
    row(Operator::EndsWith, "ends_with", ValueShape::NonEmptyString),
    row(Operator::NotEndsWith, "not_ends_with", ValueShape::NonEmptyString),
    row(Operator::IsEmpty, "is_empty", ValueShape::Ignored),
    row(Operator::IsNotEmpty, "is_not_empty", ValueShape::Ignored),
    row(Operator::IsNull, "is_null", ValueShape::Ignored),
    row(Operator::IsNotNull, "is_not_null", ValueShape::Ignored),
    row(Operator::Exist, "exist", ValueShape::Ignored),
    row(Operator::NotExist, "not_exist", ValueShape::Ignored),
];

impl Operator {
    /// Every operator, in registry order.
    pub fn all() -> impl Iterator<Item = Operator> {
        REGISTRY.iter().map(|info| info.operator)
    }

    /// Looks an operator up by its wire name.
    pub fn from_name(name: &str) -> Option<Operator> {
        REGISTRY
            .iter()
            .find(|info| info.name == name)
            .map(|info| info.operator)
    }

    /// Returns this operator's registry row.
    pub fn info(self) -> &'static OperatorInfo {
        &REGISTRY[self as usize]
    }

    /// Returns the wire name of this operator.
    pub fn as_str(self) -> &'static str {
        self.info().name
    }

    /// Returns `true` if the registry currently enables this operator.
    pub fn is_enabled(self) -> bool {
        self.info().enabled
    }

    /// Returns the value shape this operator requires.
    pub fn shape(self) -> ValueShape {
        self.info().shape
    }

    /// For a negated operator, returns the operator it negates.
    ///
    /// - `NotEqual` -> `Equal`
    /// - `NotIn` -> `In`
    /// - `NotBeginsWith` / `NotContains` / `NotEndsWith` -> positive form
    /// - `IsNotEmpty` -> `IsEmpty`, `IsNotNull` -> `IsNull`
    /// - `NotExist` -> `Exist`
    /// - Others: `None`
    pub fn negates(self) -> Option<Operator> {
        match self {
            Operator::NotEqual => Some(Operator::Equal),
            Operator::NotIn => Some(Operator::In),
            Operator::NotBeginsWith => Some(Operator::BeginsWith),
            Operator::NotContains => Some(Operator::Contains),
            Operator::NotEndsWith => Some(Operator::EndsWith),
            Operator::IsNotEmpty => Some(Operator::IsEmpty),
            Operator::IsNotNull => Some(Operator::IsNull),
            Operator::NotExist => Some(Operator::Exist),
            _ => None,
        }
    }

    /// Returns `true` for the datetime ordering family.
    pub fn is_datetime_op(self) -> bool {
        self.shape() == ValueShape::Datetime
    }

    /// Returns `true` for the string matching family.
    pub fn is_string_op(self) -> bool {
        self.shape() == ValueShape::NonEmptyString
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::from_name(s).ok_or_else(|| s.to_string())
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_rows_follow_declaration_order() {
        for (index, info) in REGISTRY.iter().enumerate() {
            assert_eq!(info.operator as usize, index, "{}", info.name);
        }
    }

    #[test]
    fn names_round_trip() {
        for op in Operator::all() {
            assert_eq!(Operator::from_name(op.as_str()), Some(op));
            assert_eq!(op.as_str().parse::<Operator>(), Ok(op));
        }
        assert_eq!(Operator::from_name("unknown"), None);
        assert_eq!("Equal".parse::<Operator>(), Err("Equal".to_string()));
    }

    #[test]
    fn serde_names_match_registry() {
        for op in Operator::all() {
            let json = serde_json::to_value(op).unwrap();
            assert_eq!(json, serde_json::Value::String(op.as_str().to_string()));
        }
    }

    #[test]
    fn every_operator_ships_enabled() {
        assert!(Operator::all().all(Operator::is_enabled));
    }

    #[test]
    fn shapes() {
        assert_eq!(Operator::Equal.shape(), ValueShape::Basic);
        assert_eq!(Operator::NotIn.shape(), ValueShape::BasicSlice);
        assert_eq!(Operator::GreaterOrEqual.shape(), ValueShape::Numeric);
        assert_eq!(Operator::DatetimeLess.shape(), ValueShape::Datetime);
        assert_eq!(Operator::NotEndsWith.shape(), ValueShape::NonEmptyString);
        assert_eq!(Operator::Exist.shape(), ValueShape::Ignored);

        assert!(Operator::DatetimeGreater.is_datetime_op());
        assert!(!Operator::Greater.is_datetime_op());
        assert!(Operator::Contains.is_string_op());
        assert!(!Operator::Equal.is_string_op());
    }

    #[test]
    fn negations() {
        assert_eq!(Operator::NotEqual.negates(), Some(Operator::Equal));
        assert_eq!(Operator::NotExist.negates(), Some(Operator::Exist));
        assert_eq!(Operator::IsNotNull.negates(), Some(Operator::IsNull));
        assert_eq!(Operator::Equal.negates(), None);
        assert_eq!(Operator::Less.negates(), None);
    }

    #[test]
    fn display() {
        assert_eq!(Operator::BeginsWith.to_string(), "begins_with");
        assert_eq!(Operator::DatetimeLessOrEqual.to_string(), "datetime_less_or_equal");
    }
}
