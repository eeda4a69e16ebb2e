//! Key condition extraction
//!
//! Lifts the selected index's hash (and, when possible, range) comparison out
//! of a compiled filter token list, renames its placeholders into the reserved
//! key-condition namespace and drops the connective it leaves behind.
//!
//! Reserved placeholders: `#qha`/`:qhv` (hash), `#qra`/`:qrv` (range).
//! Multi-value suffixes (`_1`, `_2`) carry over to the renamed base.

use std::collections::BTreeMap;

use super::catalog::{IndexDescriptor, TableDescriptor};
use super::errors::{PlannerError, PlannerResult};
use crate::compiler::{
    render_comparison, ComparisonToken, CompiledExpression, Connective, ExpressionRepr,
    ExpressionToken,
};
use crate::value::AttributeValue;

const HASH_NAME: &str = "#qha";
const HASH_VALUE: &str = ":qhv";
const RANGE_NAME: &str = "#qra";
const RANGE_VALUE: &str = ":qrv";

/// Rendered key condition and the placeholders it owns
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCondition {
    pub expression: String,
    pub names: BTreeMap<String, String>,
    pub values: BTreeMap<String, AttributeValue>,
}

/// Key condition plus whatever stays in the filter
#[derive(Debug, Clone, PartialEq)]
pub struct KeySplit {
    pub key_condition: KeyCondition,
    /// Residual filter; `None` when every clause was absorbed
    pub filter: Option<CompiledExpression>,
}

/// Splits a compiled filter into key condition and residual filter.
///
/// The hash comparison must be a top-level `Eq` not adjacent to an `OR`;
/// otherwise the request cannot be served and `AERO_NO_USABLE_INDEX` is
/// returned. A range comparison is lifted only when its comparator can
/// appear in a key condition.
pub fn split_key_condition(
    table: &TableDescriptor,
    index: &IndexDescriptor,
    filter: CompiledExpression,
) -> PlannerResult<KeySplit> {
    let CompiledExpression {
        expression,
        mut names,
        mut values,
    } = filter;

    let mut tokens = match expression {
        ExpressionRepr::Tokens(tokens) => tokens,
        ExpressionRepr::Text(_) => return Err(PlannerError::no_usable_index(&table.name)),
    };

    let hash = match find_eligible(&tokens, &index.hash_attribute) {
        Some(position) if is_hash_comparison(&tokens[position]) => {
            take_comparison(&mut tokens, position)
        }
        _ => None,
    };
    let Some(hash) = hash else {
        return Err(PlannerError::no_usable_index(&table.name));
    };

    let mut key_names = BTreeMap::new();
    let mut key_values = BTreeMap::new();
    let mut expression = relabel(
        &hash,
        HASH_NAME,
        HASH_VALUE,
        &mut names,
        &mut values,
        &mut key_names,
        &mut key_values,
    );

    if let Some(range_attribute) = index.range_attribute.as_deref() {
        let range = match find_eligible(&tokens, range_attribute) {
            Some(position) if is_range_comparison(&tokens[position]) => {
                take_comparison(&mut tokens, position)
            }
            _ => None,
        };
        if let Some(range) = range {
            let rendered = relabel(
                &range,
                RANGE_NAME,
                RANGE_VALUE,
                &mut names,
                &mut values,
                &mut key_names,
                &mut key_values,
            );
            expression.push_str(" AND ");
            expression.push_str(&rendered);
        }
    }

    let filter = if tokens.is_empty() {
        None
    } else {
        Some(CompiledExpression {
            expression: ExpressionRepr::Tokens(tokens),
            names,
            values,
        })
    };

    Ok(KeySplit {
        key_condition: KeyCondition {
            expression,
            names: key_names,
            values: key_values,
        },
        filter,
    })
}

/// First top-level comparison on `attribute` that does not touch an `OR`
fn find_eligible(tokens: &[ExpressionToken], attribute: &str) -> Option<usize> {
    tokens.iter().enumerate().position(|(position, token)| {
        let Some(comparison) = token.as_comparison() else {
            return false;
        };
        comparison.attribute_path == attribute && !touches_or(tokens, position)
    })
}

fn touches_or(tokens: &[ExpressionToken], position: usize) -> bool {
    let before = position
        .checked_sub(1)
        .and_then(|p| tokens.get(p))
        .map(|t| t.is_connective(Connective::Or))
        .unwrap_or(false);
    let after = tokens
        .get(position + 1)
        .map(|t| t.is_connective(Connective::Or))
        .unwrap_or(false);
    before || after
}

fn is_hash_comparison(token: &ExpressionToken) -> bool {
    token
        .as_comparison()
        .map(|c| c.comparator == crate::condition::Comparator::Eq)
        .unwrap_or(false)
}

fn is_range_comparison(token: &ExpressionToken) -> bool {
    token
        .as_comparison()
        .map(|c| c.comparator.is_key_condition_compatible())
        .unwrap_or(false)
}

/// Removes the comparison at `position` and the connective it leaves dangling
fn take_comparison(tokens: &mut Vec<ExpressionToken>, position: usize) -> Option<ComparisonToken> {
    let removed = match tokens.remove(position) {
        ExpressionToken::Comparison(comparison) => comparison,
        _ => return None,
    };

    if position > 0 && matches!(tokens.get(position - 1), Some(ExpressionToken::Connective(_))) {
        tokens.remove(position - 1);
    } else if matches!(tokens.get(position), Some(ExpressionToken::Connective(_))) {
        tokens.remove(position);
    }

    Some(removed)
}

/// Moves a comparison's placeholders into the reserved namespace and renders it
fn relabel(
    comparison: &ComparisonToken,
    name_base: &str,
    value_base: &str,
    names: &mut BTreeMap<String, String>,
    values: &mut BTreeMap<String, AttributeValue>,
    key_names: &mut BTreeMap<String, String>,
    key_values: &mut BTreeMap<String, AttributeValue>,
) -> String {
    let old_names = comparison.name_placeholders();
    let nested = old_names.len() > 1;
    let mut new_names = Vec::with_capacity(old_names.len());

    for (k, old) in old_names.iter().enumerate() {
        let new = if nested {
            format!("{}_{}", name_base, k)
        } else {
            name_base.to_string()
        };
        if let Some(attribute) = names.remove(old) {
            key_names.insert(new.clone(), attribute);
        }
        new_names.push(new);
    }

    let mut new_values = Vec::with_capacity(comparison.value_suffixes.len());
    for (old, suffix) in comparison
        .value_placeholders()
        .iter()
        .zip(&comparison.value_suffixes)
    {
        let new = format!("{}{}", value_base, suffix);
        if let Some(value) = values.remove(old) {
            key_values.insert(new.clone(), value);
        }
        new_values.push(new);
    }

    render_comparison(comparison.comparator, &new_names.join("."), &new_values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile, CompileContext, ExpressionKeyword};
    use crate::condition::Condition;
    use crate::value::JsonMarshaller;

    fn table() -> TableDescriptor {
        TableDescriptor::new("users", "id").with_index(IndexDescriptor::secondary(
            "nameGlobalIndex",
            "name",
            Some("age".to_string()),
        ))
    }

    async fn compiled(condition: &Condition) -> CompiledExpression {
        let marshaller = JsonMarshaller;
        let mut ctx = CompileContext::new(&marshaller, ExpressionKeyword::Filter);
        compile(condition, &mut ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_hash_only() {
        let table = table();
        let index = table.indexes[0].clone();
        let filter = compiled(&Condition::new().select("name").eq("Charlie")).await;

        let split = split_key_condition(&table, &index, filter).unwrap();
        assert_eq!(split.key_condition.expression, "#qha = :qhv");
        assert_eq!(split.key_condition.names["#qha"], "name");
        assert_eq!(
            split.key_condition.values[":qhv"],
            AttributeValue::string("Charlie")
        );
        assert!(split.filter.is_none());
    }

    #[tokio::test]
    async fn test_between_range_keeps_suffixes() {
        let table = table();
        let index = table.indexes[0].clone();
        let condition = Condition::new()
            .select("name")
            .eq("Charlie")
            .filter("age")
            .between(10, 20);
        let split = split_key_condition(&table, &index, compiled(&condition).await).unwrap();

        assert_eq!(
            split.key_condition.expression,
            "#qha = :qhv AND #qra BETWEEN :qrv_1 AND :qrv_2"
        );
        assert!(split.key_condition.values.contains_key(":qrv_1"));
        assert!(split.key_condition.values.contains_key(":qrv_2"));
        assert!(split.filter.is_none());
    }

    #[tokio::test]
    async fn test_exists_stays_in_filter() {
        let table = table();
        let index = table.indexes[0].clone();
        let condition = Condition::new()
            .select("name")
            .eq("Charlie")
            .filter("age")
            .exists();
        let split = split_key_condition(&table, &index, compiled(&condition).await).unwrap();

        assert_eq!(split.key_condition.expression, "#qha = :qhv");
        let filter = split.filter.unwrap();
        assert_eq!(filter.render().as_deref(), Some("attribute_exists (#a1)"));
        assert_eq!(filter.names["#a1"], "age");
        assert!(!filter.names.contains_key("#a0"));
        assert!(!filter.values.contains_key(":v0"));
    }

    #[tokio::test]
    async fn test_leading_connective_dropped() {
        let table = table();
        let index = table.indexes[0].clone();
        let condition = Condition::new()
            .select("status")
            .eq("active")
            .select("name")
            .eq("Charlie")
            .select("score")
            .gt(5);
        let split = split_key_condition(&table, &index, compiled(&condition).await).unwrap();

        let filter = split.filter.unwrap();
        assert_eq!(filter.render().as_deref(), Some("#a0 = :v0 AND #a2 > :v2"));
    }

    #[tokio::test]
    async fn test_first_token_drops_following_connective() {
        let table = table();
        let index = table.indexes[0].clone();
        let condition = Condition::new()
            .select("name")
            .eq("Charlie")
            .group(|g| g.select("id").eq(1).or().select("id").eq(2));
        let split = split_key_condition(&table, &index, compiled(&condition).await).unwrap();

        let filter = split.filter.unwrap();
        assert_eq!(
            filter.render().as_deref(),
            Some("(#a1 = :v1 OR #a2 = :v2)")
        );
    }

    #[tokio::test]
    async fn test_or_adjacent_hash_not_lifted() {
        let table = table();
        let index = table.indexes[0].clone();
        let condition = Condition::new()
            .select("name")
            .eq("a")
            .or()
            .select("name")
            .eq("b");

        let err = split_key_condition(&table, &index, compiled(&condition).await).unwrap_err();
        assert_eq!(err.code().code(), "AERO_NO_USABLE_INDEX");
    }
}
