//! Condition lowering
//!
//! Lowering walks the clause tree depth-first, left to right, allocating one
//! placeholder index per comparison. Value marshalling then runs strictly in
//! placeholder order, one awaited call at a time, so the emitted expression
//! and the value map always agree.
//!
//! Compilation is all-or-nothing: the context counter only advances when
//! every clause lowered and every value marshalled.

use std::collections::BTreeMap;

use serde_json::Value;

use super::context::{CompileContext, PlaceholderCounter};
use super::raw;
use super::tokens::{
    ComparisonToken, CompiledExpression, Connective, ExpressionRepr, ExpressionToken,
    render_tokens,
};
use crate::condition::{
    validate_siblings, Arity, Clause, Comparison, Condition, ConditionError, ConditionResult,
};
use crate::observability::Logger;

/// A value waiting to be marshalled into its placeholder
#[derive(Debug)]
struct ValueSlot<'c> {
    placeholder: String,
    attribute_path: &'c str,
    value: &'c Value,
}

/// Synchronous first pass: tokens, names and ordered value slots
struct Lowering<'c> {
    counter: PlaceholderCounter,
    names: BTreeMap<String, String>,
    slots: Vec<ValueSlot<'c>>,
}

impl<'c> Lowering<'c> {
    fn new(counter: PlaceholderCounter) -> Self {
        Self {
            counter,
            names: BTreeMap::new(),
            slots: Vec::new(),
        }
    }

    fn lower(&mut self, clauses: &'c [Clause]) -> ConditionResult<Vec<ExpressionToken>> {
        validate_siblings(clauses)?;

        let mut tokens = Vec::with_capacity(clauses.len() * 2);
        let mut connective = Connective::And;

        for clause in clauses {
            let token = match clause {
                Clause::Or => {
                    connective = Connective::Or;
                    continue;
                }
                Clause::Group(sub) => ExpressionToken::Group(self.lower(sub)?),
                Clause::Comparison(comparison) => {
                    ExpressionToken::Comparison(self.lower_comparison(comparison)?)
                }
            };

            if !tokens.is_empty() {
                tokens.push(ExpressionToken::Connective(connective));
            }
            connective = Connective::And;
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn lower_comparison(&mut self, comparison: &'c Comparison) -> ConditionResult<ComparisonToken> {
        comparison.validate()?;

        let index = self.counter.allocate()?;
        let values = comparison.operand.values();
        let value_suffixes: Vec<String> = match comparison.comparator.arity() {
            Arity::None => Vec::new(),
            Arity::Single => vec![String::new()],
            Arity::Multiple | Arity::Variadic => {
                (1..=values.len()).map(|k| format!("_{}", k)).collect()
            }
        };

        let segments = comparison.segments();
        let token = ComparisonToken {
            attribute_path: comparison.attribute_path.clone(),
            comparator: comparison.comparator,
            index,
            segments: segments.len(),
            value_suffixes,
        };

        for (placeholder, segment) in token.name_placeholders().into_iter().zip(segments) {
            self.names.insert(placeholder, segment.to_string());
        }
        for (placeholder, value) in token.value_placeholders().into_iter().zip(values) {
            self.slots.push(ValueSlot {
                placeholder,
                attribute_path: &comparison.attribute_path,
                value,
            });
        }

        Ok(token)
    }
}

/// Compiles a condition into expression, names and values.
///
/// Does not mutate the condition. Advances the context counter by one per
/// comparison on success and leaves it untouched on failure.
pub async fn compile(
    condition: &Condition,
    ctx: &mut CompileContext<'_>,
) -> ConditionResult<CompiledExpression> {
    match compile_inner(condition, ctx).await {
        Ok(compiled) => Ok(compiled),
        Err(err) => {
            Logger::warn(
                "CONDITION_REJECTED",
                &[
                    ("code", err.code().code()),
                    ("keyword", ctx.keyword().as_str()),
                    ("message", err.message()),
                ],
            );
            Err(err)
        }
    }
}

async fn compile_inner(
    condition: &Condition,
    ctx: &mut CompileContext<'_>,
) -> ConditionResult<CompiledExpression> {
    if let Some(err) = condition.error() {
        return Err(err.clone());
    }

    if let Some(raw_expression) = condition.raw_override() {
        return raw::compile_raw(raw_expression, ctx).await;
    }

    let mut lowering = Lowering::new(ctx.counter());
    let tokens = lowering.lower(condition.clauses())?;
    let Lowering {
        counter,
        names,
        slots,
    } = lowering;

    let marshaller = ctx.marshaller();
    let mut values = BTreeMap::new();
    for slot in slots {
        let wire = marshaller
            .to_wire_value(slot.attribute_path, slot.value)
            .await
            .map_err(ConditionError::marshal_failed)?;
        values.insert(slot.placeholder, wire);
    }

    let first = ctx.counter().peek();
    ctx.commit(counter);

    let expression = if ctx.keyword().returns_tokens() {
        ExpressionRepr::Tokens(tokens)
    } else {
        ExpressionRepr::Text(render_tokens(&tokens))
    };

    let placeholders = (counter.peek() - first).to_string();
    Logger::trace(
        "CONDITION_COMPILED",
        &[
            ("keyword", ctx.keyword().as_str()),
            ("placeholders", placeholders.as_str()),
        ],
    );

    Ok(CompiledExpression {
        expression,
        names,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ExpressionKeyword;
    use crate::value::{AttributeValue, FnMarshaller, JsonMarshaller, MarshalError};
    use std::sync::Mutex;

    async fn compile_text(condition: &Condition) -> ConditionResult<CompiledExpression> {
        let marshaller = JsonMarshaller;
        let mut ctx = CompileContext::new(&marshaller, ExpressionKeyword::Condition);
        compile(condition, &mut ctx).await
    }

    #[tokio::test]
    async fn test_single_equality() {
        let condition = Condition::new().select("name").eq("Charlie");
        let compiled = compile_text(&condition).await.unwrap();

        assert_eq!(compiled.expression, ExpressionRepr::Text("#a0 = :v0".into()));
        assert_eq!(compiled.names["#a0"], "name");
        assert_eq!(compiled.values[":v0"], AttributeValue::string("Charlie"));
    }

    #[tokio::test]
    async fn test_or_only_where_inserted() {
        let condition = Condition::new()
            .select("a")
            .eq(1)
            .select("b")
            .eq(2)
            .or()
            .select("c")
            .eq(3);
        let compiled = compile_text(&condition).await.unwrap();

        assert_eq!(
            compiled.render().unwrap(),
            "#a0 = :v0 AND #a1 = :v1 OR #a2 = :v2"
        );
    }

    #[tokio::test]
    async fn test_in_uses_suffixed_values_only() {
        let condition = Condition::new().select("id").is_in(["x", "y", "z"]);
        let compiled = compile_text(&condition).await.unwrap();

        assert_eq!(compiled.render().unwrap(), "#a0 IN (:v0_1, :v0_2, :v0_3)");
        assert_eq!(compiled.values.len(), 3);
        assert!(!compiled.values.contains_key(":v0"));
        assert_eq!(compiled.values[":v0_3"], AttributeValue::string("z"));
    }

    #[tokio::test]
    async fn test_nested_path_segments() {
        let condition = Condition::new().select("address.city").eq("Oslo");
        let compiled = compile_text(&condition).await.unwrap();

        assert_eq!(compiled.render().unwrap(), "#a0_0.#a0_1 = :v0");
        assert_eq!(compiled.names["#a0_0"], "address");
        assert_eq!(compiled.names["#a0_1"], "city");
    }

    #[tokio::test]
    async fn test_counter_advances_across_compilations() {
        let marshaller = JsonMarshaller;
        let mut ctx = CompileContext::new(&marshaller, ExpressionKeyword::Condition).with_offset(7);

        let first = compile(&Condition::new().select("a").eq(1), &mut ctx).await.unwrap();
        let second = compile(&Condition::new().select("b").exists(), &mut ctx).await.unwrap();

        assert_eq!(first.render().unwrap(), "#a7 = :v7");
        assert_eq!(second.render().unwrap(), "attribute_exists (#a8)");
        assert_eq!(ctx.counter().peek(), 9);
    }

    #[tokio::test]
    async fn test_marshal_order_follows_placeholders() {
        let seen = Mutex::new(Vec::new());
        let marshaller = FnMarshaller::new(|path: &str, value: &Value| {
            seen.lock().unwrap().push(path.to_string());
            Ok(JsonMarshaller::convert(value))
        });
        let mut ctx = CompileContext::new(&marshaller, ExpressionKeyword::Filter);

        let condition = Condition::new()
            .select("a")
            .eq(1)
            .group(|g| g.select("b").between(1, 2).or().select("c").eq(3))
            .select("d")
            .eq(4);
        compile(&condition, &mut ctx).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_marshal_failure_is_all_or_nothing() {
        let marshaller = FnMarshaller::new(|path: &str, value: &Value| {
            if path == "bad" {
                Err(MarshalError::new(path, "rejected"))
            } else {
                Ok(JsonMarshaller::convert(value))
            }
        });
        let mut ctx = CompileContext::new(&marshaller, ExpressionKeyword::Filter);

        let condition = Condition::new().select("ok").eq(1).select("bad").eq(2);
        let err = compile(&condition, &mut ctx).await.unwrap_err();

        assert_eq!(err.code().code(), "AERO_CONDITION_MARSHAL_FAILED");
        assert_eq!(ctx.counter().peek(), 0);
    }

    #[tokio::test]
    async fn test_recorded_builder_error_surfaces() {
        let condition = Condition::new().select("id").not().between(1, 2);
        let err = compile_text(&condition).await.unwrap_err();
        assert_eq!(err.code().code(), "AERO_CONDITION_UNSUPPORTED_NEGATION");
    }

    #[tokio::test]
    async fn test_trailing_or_rejected() {
        let condition = Condition::new().select("a").eq(1).or();
        let err = compile_text(&condition).await.unwrap_err();
        assert_eq!(err.code().code(), "AERO_CONDITION_DANGLING_CONNECTIVE");
    }

    #[tokio::test]
    async fn test_compilation_does_not_mutate_condition() {
        let condition = Condition::new().select("a").eq(1);
        let before = condition.clone();
        compile_text(&condition).await.unwrap();
        assert_eq!(condition, before);
    }
}
