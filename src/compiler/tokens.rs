//! Expression token list
//!
//! Filter expressions stay as tokens until the request is assembled, so the
//! planner can lift key clauses out with list operations instead of string
//! surgery.

use std::collections::BTreeMap;

use crate::condition::Comparator;
use crate::value::AttributeValue;

/// Prefix of attribute name placeholders
pub const NAME_PREFIX: &str = "#a";
/// Prefix of attribute value placeholders
pub const VALUE_PREFIX: &str = ":v";

/// Boolean connective between two sibling tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

/// A compiled comparison and the placeholders it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonToken {
    /// Attribute path as written by the caller
    pub attribute_path: String,
    /// Effective comparator
    pub comparator: Comparator,
    /// Placeholder index allocated for this comparison
    pub index: u32,
    /// Number of path segments
    pub segments: usize,
    /// Value placeholder suffixes: `""` for a single value, `_1.._n` otherwise
    pub value_suffixes: Vec<String>,
}

impl ComparisonToken {
    /// Name placeholders, one per path segment
    pub fn name_placeholders(&self) -> Vec<String> {
        if self.segments <= 1 {
            vec![format!("{}{}", NAME_PREFIX, self.index)]
        } else {
            (0..self.segments)
                .map(|k| format!("{}{}_{}", NAME_PREFIX, self.index, k))
                .collect()
        }
    }

    /// Value placeholders in operand order
    pub fn value_placeholders(&self) -> Vec<String> {
        self.value_suffixes
            .iter()
            .map(|suffix| format!("{}{}{}", VALUE_PREFIX, self.index, suffix))
            .collect()
    }

    /// Renders with this token's own placeholders
    pub fn render(&self) -> String {
        render_comparison(
            self.comparator,
            &self.name_placeholders().join("."),
            &self.value_placeholders(),
        )
    }
}

/// One element of a compiled expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionToken {
    Comparison(ComparisonToken),
    /// Parenthesised sub-expression
    Group(Vec<ExpressionToken>),
    Connective(Connective),
    /// Caller-supplied expression text, never inspected
    Raw(String),
}

impl ExpressionToken {
    pub fn as_comparison(&self) -> Option<&ComparisonToken> {
        match self {
            ExpressionToken::Comparison(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_connective(&self, connective: Connective) -> bool {
        matches!(self, ExpressionToken::Connective(c) if *c == connective)
    }
}

/// Renders one comparison with the given name expression and value placeholders
pub fn render_comparison(comparator: Comparator, name: &str, values: &[String]) -> String {
    let first = values.first().map(String::as_str).unwrap_or_default();
    match comparator {
        Comparator::Eq
        | Comparator::Ne
        | Comparator::Lt
        | Comparator::Le
        | Comparator::Gt
        | Comparator::Ge => {
            // symbol() is Some for every binary comparator
            let symbol = comparator.symbol().unwrap_or("=");
            format!("{} {} {}", name, symbol, first)
        }
        Comparator::BeginsWith => format!("begins_with ({}, {})", name, first),
        Comparator::Contains => format!("contains ({}, {})", name, first),
        Comparator::NotContains => format!("NOT contains ({}, {})", name, first),
        Comparator::Exists => format!("attribute_exists ({})", name),
        Comparator::NotExists => format!("attribute_not_exists ({})", name),
        Comparator::In => format!("{} IN ({})", name, values.join(", ")),
        Comparator::Between => format!(
            "{} BETWEEN {} AND {}",
            name,
            first,
            values.get(1).map(String::as_str).unwrap_or_default()
        ),
    }
}

/// Joins tokens into expression text. Groups are parenthesised, the top level is not.
pub fn render_tokens(tokens: &[ExpressionToken]) -> String {
    let mut output = String::new();
    for token in tokens {
        if !output.is_empty() {
            output.push(' ');
        }
        match token {
            ExpressionToken::Comparison(c) => output.push_str(&c.render()),
            ExpressionToken::Group(inner) => {
                output.push('(');
                output.push_str(&render_tokens(inner));
                output.push(')');
            }
            ExpressionToken::Connective(c) => output.push_str(c.as_str()),
            ExpressionToken::Raw(text) => output.push_str(text),
        }
    }
    output
}

/// Expression body in either form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionRepr {
    Text(String),
    Tokens(Vec<ExpressionToken>),
}

impl ExpressionRepr {
    pub fn render(&self) -> String {
        match self {
            ExpressionRepr::Text(text) => text.clone(),
            ExpressionRepr::Tokens(tokens) => render_tokens(tokens),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ExpressionRepr::Text(text) => text.trim().is_empty(),
            ExpressionRepr::Tokens(tokens) => tokens.is_empty(),
        }
    }
}

/// Output of one compilation
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    pub expression: ExpressionRepr,
    /// Name placeholder to attribute name
    pub names: BTreeMap<String, String>,
    /// Value placeholder to wire value
    pub values: BTreeMap<String, AttributeValue>,
}

impl CompiledExpression {
    /// Rendered expression, or `None` when there is nothing to send
    pub fn render(&self) -> Option<String> {
        if self.expression.is_empty() {
            None
        } else {
            Some(self.expression.render())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(comparator: Comparator, index: u32, suffixes: &[&str]) -> ComparisonToken {
        ComparisonToken {
            attribute_path: "age".into(),
            comparator,
            index,
            segments: 1,
            value_suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_binary_rendering() {
        assert_eq!(token(Comparator::Eq, 0, &[""]).render(), "#a0 = :v0");
        assert_eq!(token(Comparator::Ne, 2, &[""]).render(), "#a2 <> :v2");
        assert_eq!(token(Comparator::Ge, 1, &[""]).render(), "#a1 >= :v1");
    }

    #[test]
    fn test_function_rendering() {
        assert_eq!(
            token(Comparator::BeginsWith, 0, &[""]).render(),
            "begins_with (#a0, :v0)"
        );
        assert_eq!(
            token(Comparator::NotContains, 0, &[""]).render(),
            "NOT contains (#a0, :v0)"
        );
        assert_eq!(token(Comparator::Exists, 1, &[]).render(), "attribute_exists (#a1)");
    }

    #[test]
    fn test_multi_value_rendering() {
        assert_eq!(
            token(Comparator::Between, 3, &["_1", "_2"]).render(),
            "#a3 BETWEEN :v3_1 AND :v3_2"
        );
        assert_eq!(
            token(Comparator::In, 0, &["_1", "_2", "_3"]).render(),
            "#a0 IN (:v0_1, :v0_2, :v0_3)"
        );
    }

    #[test]
    fn test_nested_name_placeholders() {
        let nested = ComparisonToken {
            attribute_path: "address.city".into(),
            comparator: Comparator::Eq,
            index: 4,
            segments: 2,
            value_suffixes: vec![String::new()],
        };
        assert_eq!(nested.render(), "#a4_0.#a4_1 = :v4");
    }

    #[test]
    fn test_group_rendering() {
        let tokens = vec![
            ExpressionToken::Comparison(token(Comparator::Eq, 0, &[""])),
            ExpressionToken::Connective(Connective::And),
            ExpressionToken::Group(vec![
                ExpressionToken::Comparison(token(Comparator::Eq, 1, &[""])),
                ExpressionToken::Connective(Connective::Or),
                ExpressionToken::Comparison(token(Comparator::Eq, 2, &[""])),
            ]),
        ];
        assert_eq!(
            render_tokens(&tokens),
            "#a0 = :v0 AND (#a1 = :v1 OR #a2 = :v2)"
        );
    }

    #[test]
    fn test_empty_expression_not_rendered() {
        let compiled = CompiledExpression {
            expression: ExpressionRepr::Tokens(Vec::new()),
            names: BTreeMap::new(),
            values: BTreeMap::new(),
        };
        assert_eq!(compiled.render(), None);
    }
}
