//! Decoding rule trees from loosely-typed JSON.
//!
//! The parser only checks shape: a node with a `condition` key is a
//! [`CombinedRule`], a node with an `operator` key is an [`AtomicRule`].
//! Field names, operator support, value types and depth are left to
//! [`Rule::validate`], which must run before a tree is compiled.

use serde::de::{Deserialize, Deserializer, Error as _};
use serde_json::{Map, Value as Json};

use crate::error::{ErrorKind, Result, RuleError};
use crate::rule::{AtomicRule, CombinedRule, Condition, Rule};

/// Parses a rule tree.
///
/// `null` and `{}` mean "no rule" and return `Ok(None)`; callers should
/// treat that as match-everything rather than as a failure.
///
/// ```
/// use querybuilder::{parse, Rule};
/// use serde_json::json;
///
/// let rule = parse(&json!({
///     "condition": "OR",
///     "rules": [{"field": "name", "operator": "equal", "value": "x"}]
/// }))
/// .unwrap()
/// .unwrap();
/// assert!(matches!(rule, Rule::Combined(_)));
///
/// assert_eq!(parse(&json!(null)).unwrap(), None);
/// ```
pub fn parse(node: &Json) -> Result<Option<Rule>> {
    match node {
        Json::Null => Ok(None),
        Json::Object(map) if map.is_empty() => Ok(None),
        _ => match parse_node(node) {
            Ok(rule) => Ok(Some(rule)),
            Err(err) => {
                tracing::debug!(path = %err.path, error = %err.kind, "rule failed to parse");
                Err(err)
            }
        },
    }
}

/// Parses a rule tree from JSON text; blank text means "no rule".
pub fn parse_str(text: &str) -> Result<Option<Rule>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let node: Json = serde_json::from_str(text)?;
    parse(&node)
}

fn parse_node(node: &Json) -> Result<Rule> {
    let Json::Object(map) = node else {
        return Err(RuleError::new(ErrorKind::Decode {
            expected: "a rule object",
        }));
    };
    if map.contains_key("condition") {
        tracing::trace!("parsing combined rule");
        parse_combined(map).map(Rule::Combined)
    } else if map.contains_key("operator") {
        tracing::trace!("parsing atomic rule");
        parse_atomic(map).map(Rule::Atomic)
    } else {
        Err(RuleError::new(ErrorKind::NoFilter))
    }
}

fn parse_combined(map: &Map<String, Json>) -> Result<CombinedRule> {
    let condition = match map.get("condition") {
        Some(Json::String(name)) => Condition::from_name(name).ok_or_else(|| {
            RuleError::at("condition", ErrorKind::InvalidCondition(name.clone()))
        })?,
        _ => {
            return Err(RuleError::at(
                "condition",
                ErrorKind::Decode {
                    expected: "a condition string",
                },
            ))
        }
    };

    let nodes: &[Json] = match map.get("rules") {
        None | Some(Json::Null) => &[],
        Some(Json::Array(nodes)) => nodes.as_slice(),
        Some(_) => {
            return Err(RuleError::at(
                "rules",
                ErrorKind::Decode {
                    expected: "an array of rules",
                },
            ))
        }
    };

    let mut rules = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        rules.push(parse_node(node).map_err(|err| err.within_rule(index))?);
    }
    Ok(CombinedRule::new(condition, rules))
}

fn parse_atomic(map: &Map<String, Json>) -> Result<AtomicRule> {
    let field = string_key(map, "field", "a field name string")?;
    let operator = string_key(map, "operator", "an operator name string")?;
    let value = map.get("value").cloned().unwrap_or(Json::Null);
    Ok(AtomicRule::with_operator_name(field, operator, value))
}

fn string_key(map: &Map<String, Json>, key: &'static str, expected: &'static str) -> Result<String> {
    match map.get(key) {
        None | Some(Json::Null) => Ok(String::new()),
        Some(Json::String(s)) => Ok(s.clone()),
        Some(_) => Err(RuleError::at(key, ErrorKind::Decode { expected })),
    }
}

/// Rules embed as structured fields of larger payloads; decoding goes
/// through [`parse`]. A required `Rule` field rejects `null` and `{}`; for an
/// optional filter use [`deserialize_optional`].
impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let node = Json::deserialize(deserializer)?;
        match parse(&node) {
            Ok(Some(rule)) => Ok(rule),
            Ok(None) => Err(D::Error::custom(ErrorKind::NoFilter)),
            Err(err) => Err(D::Error::custom(err)),
        }
    }
}

/// Decodes an optional rule field exactly as [`parse`] does, so `null`, `{}`
/// and an absent key all mean "no rule".
///
/// ```
/// use querybuilder::Rule;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct SearchRequest {
///     #[serde(default, deserialize_with = "querybuilder::deserialize_optional")]
///     filter: Option<Rule>,
/// }
///
/// let req: SearchRequest = serde_json::from_str(r#"{"filter": {}}"#).unwrap();
/// assert!(req.filter.is_none());
/// ```
pub fn deserialize_optional<'de, D>(deserializer: D) -> std::result::Result<Option<Rule>, D::Error>
where
    D: Deserializer<'de>,
{
    let node = Json::deserialize(deserializer)?;
    parse(&node).map_err(D::Error::custom)
}
