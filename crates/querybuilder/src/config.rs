//! Tunable limits applied during validation.

use serde::{Deserialize, Serialize};

use crate::operator::Operator;

/// Default maximum rule tree depth: two levels of combined rules above the leaves.
pub const MAX_DEPTH: usize = 3;

/// Maximum depth for the high-volume search path.
pub const MAX_SEARCH_DEPTH: usize = 3;

/// Limits a rule tree must satisfy to validate.
///
/// Deserializes with defaults for missing keys, so it can be embedded in a
/// caller's configuration file:
///
/// ```
/// use querybuilder::{Limits, Operator};
///
/// let limits: Limits = serde_json::from_str(
///     r#"{ "max_depth": 2, "disabled_operators": ["contains"] }"#,
/// ).unwrap();
/// assert_eq!(limits.max_depth, 2);
/// assert!(!limits.allows(Operator::Contains));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum tree depth; an atomic rule has depth 1.
    pub max_depth: usize,
    /// Operators rejected in addition to those the registry disables.
    pub disabled_operators: Vec<Operator>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_depth: MAX_DEPTH,
            disabled_operators: Vec::new(),
        }
    }
}

impl Limits {
    /// Creates the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits for the search path.
    pub fn search() -> Self {
        Limits {
            max_depth: MAX_SEARCH_DEPTH,
            ..Self::default()
        }
    }

    /// Sets the maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Rejects an operator.
    pub fn disable(mut self, operator: Operator) -> Self {
        if !self.disabled_operators.contains(&operator) {
            self.disabled_operators.push(operator);
        }
        self
    }

    /// Returns `true` if `operator` is enabled in the registry and not disabled here.
    pub fn allows(&self, operator: Operator) -> bool {
        operator.is_enabled() && !self.disabled_operators.contains(&operator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = Limits::default();
        assert_eq!(limits.max_depth, 3);
        assert!(limits.disabled_operators.is_empty());
        assert_eq!(Limits::search().max_depth, MAX_SEARCH_DEPTH);
    }

    #[test]
    fn builder() {
        let limits = Limits::new()
            .with_max_depth(5)
            .disable(Operator::Exist)
            .disable(Operator::Exist);
        assert_eq!(limits.max_depth, 5);
        assert_eq!(limits.disabled_operators, vec![Operator::Exist]);
        assert!(!limits.allows(Operator::Exist));
        assert!(limits.allows(Operator::NotExist));
    }

    #[test]
    fn deserialize_fills_missing_keys() {
        let limits: Limits = serde_json::from_str("{}").unwrap();
        assert_eq!(limits, Limits::default());

        let limits: Limits = serde_json::from_str(r#"{"max_depth": 1}"#).unwrap();
        assert_eq!(limits.max_depth, 1);
    }

    #[test]
    fn deserialize_rejects_unknown_operator() {
        let result: Result<Limits, _> =
            serde_json::from_str(r#"{"disabled_operators": ["sounds_like"]}"#);
        assert!(result.is_err());
    }
}
