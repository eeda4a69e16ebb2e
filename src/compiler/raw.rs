//! Raw expression override
//!
//! A caller may bypass the builder with a literal expression object. No
//! placeholders are allocated; values that are not yet wire-typed are
//! marshalled under their placeholder name.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::context::CompileContext;
use super::tokens::{CompiledExpression, ExpressionRepr, ExpressionToken};
use crate::condition::{ConditionError, ConditionResult, RawExpression};
use crate::value::AttributeValue;

const NAMES_KEY: &str = "ExpressionAttributeNames";
const VALUES_KEY: &str = "ExpressionAttributeValues";

fn placeholder_pattern() -> ConditionResult<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"[#:][A-Za-z0-9_]+").ok())
        .as_ref()
        .ok_or_else(|| ConditionError::malformed_raw("Placeholder pattern unavailable"))
}

/// Compiles a raw expression object
pub async fn compile_raw(
    raw: &RawExpression,
    ctx: &CompileContext<'_>,
) -> ConditionResult<CompiledExpression> {
    let keyword = ctx.keyword().as_str();

    let mut keys: Vec<&str> = raw.keys().map(String::as_str).collect();
    keys.sort_unstable();
    let mut expected = vec![keyword, NAMES_KEY, VALUES_KEY];
    expected.sort_unstable();
    if keys != expected {
        return Err(ConditionError::malformed_raw(format!(
            "Raw expression must have exactly the keys {}, {}, {}; found [{}]",
            keyword,
            NAMES_KEY,
            VALUES_KEY,
            keys.join(", ")
        )));
    }

    let expression = raw
        .get(keyword)
        .and_then(Value::as_str)
        .ok_or_else(|| ConditionError::malformed_raw(format!("{} must be a string", keyword)))?;

    let names = match raw.get(NAMES_KEY) {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(placeholder, name)| match name.as_str() {
                Some(name) => Ok((placeholder.clone(), name.to_string())),
                None => Err(ConditionError::malformed_raw(format!(
                    "Name placeholder '{}' must map to a string",
                    placeholder
                ))),
            })
            .collect::<ConditionResult<BTreeMap<_, _>>>()?,
        _ => {
            return Err(ConditionError::malformed_raw(format!(
                "{} must be an object",
                NAMES_KEY
            )))
        }
    };

    let raw_values = match raw.get(VALUES_KEY) {
        Some(Value::Object(map)) => map,
        _ => {
            return Err(ConditionError::malformed_raw(format!(
                "{} must be an object",
                VALUES_KEY
            )))
        }
    };

    for found in placeholder_pattern()?.find_iter(expression) {
        let placeholder = found.as_str();
        let defined = if placeholder.starts_with('#') {
            names.contains_key(placeholder)
        } else {
            raw_values.contains_key(placeholder)
        };
        if !defined {
            return Err(ConditionError::malformed_raw(format!(
                "Placeholder '{}' is not defined",
                placeholder
            )));
        }
    }

    let marshaller = ctx.marshaller();
    let mut values = BTreeMap::new();
    for (placeholder, value) in raw_values {
        let wire = match AttributeValue::from_wire_json(value) {
            Some(wire) => wire,
            None => marshaller
                .to_wire_value(placeholder, value)
                .await
                .map_err(ConditionError::marshal_failed)?,
        };
        values.insert(placeholder.clone(), wire);
    }

    let expression = if ctx.keyword().returns_tokens() {
        ExpressionRepr::Tokens(vec![ExpressionToken::Raw(expression.to_string())])
    } else {
        ExpressionRepr::Text(expression.to_string())
    };

    Ok(CompiledExpression {
        expression,
        names,
        values,
    })
}
