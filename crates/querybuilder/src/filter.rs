//! Compiled storage filters.
//!
//! A [`Filter`] is the document-store form of a validated rule tree. It is
//! a typed tree; [`Filter::to_document`] renders the store's JSON query
//! syntax (`$and`, `$or`, `$eq`, `$in`, `$regex`, ...).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Number, Value as Json};

/// A compiled filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// All sub-filters must match.
    And(Vec<Filter>),
    /// At least one sub-filter must match.
    Or(Vec<Filter>),
    /// A comparison on one field.
    Field {
        field: String,
        comparison: Comparison,
    },
}

/// A per-field comparison clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Eq(Json),
    Ne(Json),
    In(Vec<Json>),
    Nin(Vec<Json>),
    Lt(Bound),
    Lte(Bound),
    Gt(Bound),
    Gte(Bound),
    /// Field matches the pattern.
    Regex(String),
    /// Field does not match the pattern.
    NotRegex(String),
    /// Field is present (`true`) or absent (`false`).
    Exists(bool),
}

/// Right-hand side of an ordering comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Number(Number),
    Datetime(DateTime<Utc>),
}

impl Filter {
    /// Creates a field comparison.
    pub fn field(field: impl Into<String>, comparison: Comparison) -> Self {
        Filter::Field {
            field: field.into(),
            comparison,
        }
    }

    /// Renders the store's JSON query document.
    ///
    /// ```
    /// use querybuilder::{Comparison, Filter};
    /// use serde_json::json;
    ///
    /// let filter = Filter::Or(vec![
    ///     Filter::field("name", Comparison::Eq(json!("x"))),
    ///     Filter::field("deleted", Comparison::Exists(false)),
    /// ]);
    /// assert_eq!(
    ///     filter.to_document(),
    ///     json!({"$or": [
    ///         {"name": {"$eq": "x"}},
    ///         {"deleted": {"$exists": false}}
    ///     ]})
    /// );
    /// ```
    pub fn to_document(&self) -> Json {
        match self {
            Filter::And(filters) => json!({ "$and": documents(filters) }),
            Filter::Or(filters) => json!({ "$or": documents(filters) }),
            Filter::Field { field, comparison } => {
                let mut doc = Map::new();
                doc.insert(field.clone(), comparison.to_document());
                Json::Object(doc)
            }
        }
    }
}

fn documents(filters: &[Filter]) -> Vec<Json> {
    filters.iter().map(Filter::to_document).collect()
}

impl Comparison {
    /// Returns the store operator key, such as `$gte`.
    pub fn key(&self) -> &'static str {
        match self {
            Comparison::Eq(_) => "$eq",
            Comparison::Ne(_) => "$ne",
            Comparison::In(_) => "$in",
            Comparison::Nin(_) => "$nin",
            Comparison::Lt(_) => "$lt",
            Comparison::Lte(_) => "$lte",
            Comparison::Gt(_) => "$gt",
            Comparison::Gte(_) => "$gte",
            Comparison::Regex(_) => "$regex",
            Comparison::NotRegex(_) => "$not",
            Comparison::Exists(_) => "$exists",
        }
    }

    fn operand(&self) -> Json {
        match self {
            Comparison::Eq(value) | Comparison::Ne(value) => value.clone(),
            Comparison::In(values) | Comparison::Nin(values) => Json::Array(values.clone()),
            Comparison::Lt(bound)
            | Comparison::Lte(bound)
            | Comparison::Gt(bound)
            | Comparison::Gte(bound) => bound.to_document(),
            Comparison::Regex(pattern) => Json::String(pattern.clone()),
            Comparison::NotRegex(pattern) => json!({ "$regex": pattern }),
            Comparison::Exists(present) => Json::Bool(*present),
        }
    }

    /// Renders `{"$op": operand}`.
    pub fn to_document(&self) -> Json {
        let mut doc = Map::new();
        doc.insert(self.key().to_string(), self.operand());
        Json::Object(doc)
    }
}

impl Bound {
    /// Numbers render as-is; datetimes as `{"$date": "<RFC-3339 UTC>"}`.
    pub fn to_document(&self) -> Json {
        match self {
            Bound::Number(n) => Json::Number(n.clone()),
            Bound::Datetime(dt) => {
                json!({ "$date": dt.to_rfc3339_opts(SecondsFormat::Millis, true) })
            }
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}
