//! Querybuilder - structured filter rules for document queries.
//!
//! A rule is a tree of `AND` / `OR` groups over `field / operator / value`
//! predicates, usually received as JSON in an "advanced search" request.
//! This crate:
//!
//! - Parses rule trees from loosely-typed JSON
//! - Validates structure, field names, operators, value types and depth
//! - Compiles valid trees into document-store filters (`$and`, `$eq`, `$in`, ...)
//! - Evaluates trees in memory, through a predicate or against records
//!
//! # Quick Start
//!
//! ```rust
//! use querybuilder::{parse, Rule};
//! use serde_json::json;
//!
//! let rule = parse(&json!({
//!     "condition": "AND",
//!     "rules": [
//!         {"field": "name", "operator": "begins_with", "value": "web"},
//!         {"field": "cpu", "operator": "greater_or_equal", "value": 8}
//!     ]
//! }))
//! .unwrap()
//! .expect("a rule was supplied");
//!
//! rule.validate().unwrap();
//!
//! // For the store
//! let filter = rule.compile().unwrap();
//! assert_eq!(
//!     filter.to_document(),
//!     json!({"$and": [
//!         {"name": {"$regex": "^web"}},
//!         {"cpu": {"$gte": 8}}
//!     ]})
//! );
//!
//! // Or in memory
//! let hosts = vec![
//!     json!({"name": "web-1", "cpu": 16}),
//!     json!({"name": "web-2", "cpu": 4}),
//!     json!({"name": "db-1", "cpu": 32}),
//! ];
//! let found = rule.filter(&hosts);
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0]["name"], "web-1");
//! ```
//!
//! # Rule Shapes
//!
//! ```text
//! combined: { "condition": "AND" | "OR", "rules": [ <rule>, ... ] }
//! atomic:   { "field": <name>, "operator": <operator>, "value": <any> }
//! ```
//!
//! `null` or `{}` parse to no rule, which callers treat as match-everything.
//!
//! # Operators
//!
//! | Family | Operators | Value |
//! |--------|-----------|-------|
//! | Equality | `equal`, `not_equal` | number, bool or string |
//! | Membership | `in`, `not_in` | array of one basic type |
//! | Numeric | `less`, `less_or_equal`, `greater`, `greater_or_equal` | number |
//! | Datetime | `datetime_less`, ... `datetime_greater_or_equal` | RFC-3339 string |
//! | String | `begins_with`, `contains`, `ends_with` and `not_` forms | non-empty string |
//! | Presence | `is_empty`, `is_not_empty`, `is_null`, `is_not_null`, `exist`, `not_exist` | ignored |
//!
//! # Errors
//!
//! Failures carry the path of the offending node, e.g. `rules[1].value`.
//! Validation stops at the first failure; depth beyond [`Limits::max_depth`]
//! fails at the root.

mod compile;
mod config;
mod error;
mod filter;
mod matcher;
mod operator;
mod parser;
mod record;
mod rule;
mod validators;
mod value;

pub use config::{Limits, MAX_DEPTH, MAX_SEARCH_DEPTH};
pub use error::{ErrorKind, Result, RuleError};
pub use filter::{Bound, Comparison, Filter};
pub use matcher::record_matches;
pub use operator::{Operator, OperatorInfo, ValueShape, REGISTRY};
pub use parser::{deserialize_optional, parse, parse_str};
pub use record::Record;
pub use rule::{is_valid_field, AtomicRule, CombinedRule, Condition, Rule};
pub use validators::{basic_kind, check_value, BasicKind};
pub use value::{FieldValue, Number, Timestamp};
