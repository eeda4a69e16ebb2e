//! Chainable condition builder
//!
//! `select` stages an attribute, `not` toggles negation, and the next
//! comparator call turns the staged attribute into a finished comparison.
//!
//! Builder errors are deferred. The first failure is recorded, the clause
//! list is left exactly as it was, every later call is ignored, and the
//! compiler reports the recorded error.

use serde_json::{Map, Value};

use super::clause::{Clause, Comparison, Operand, PendingAttribute};
use super::comparator::{Arity, Comparator};
use super::errors::{ConditionError, ConditionResult};

/// Pre-built expression object supplied verbatim by the caller
pub type RawExpression = Map<String, Value>;

/// Condition under construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    clauses: Vec<Clause>,
    pending: PendingAttribute,
    raw_override: Option<RawExpression>,
    error: Option<ConditionError>,
}

impl Condition {
    /// Creates an empty condition
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a condition from a pre-built expression object.
    ///
    /// The object must carry exactly the expression keyword,
    /// `ExpressionAttributeNames` and `ExpressionAttributeValues`.
    /// Its shape is checked at compile time.
    pub fn raw(expression: RawExpression) -> Self {
        Self {
            raw_override: Some(expression),
            ..Self::default()
        }
    }

    /// Builds a condition from a map of attribute to value or `{op: operand}`.
    ///
    /// Entries are AND-ed in the order they were written.
    pub fn from_map(map: &Map<String, Value>) -> ConditionResult<Self> {
        let mut clauses = Vec::with_capacity(map.len());
        for (path, value) in map {
            match value {
                Value::Object(ops) if !ops.is_empty() => {
                    for (op, operand) in ops {
                        let comparator = match (op.parse::<Comparator>()?, operand) {
                            // `{"exists": false}` reads as not-exists
                            (c, Value::Bool(false)) if c.arity() == Arity::None => {
                                c.negated().unwrap_or(c)
                            }
                            (c, _) => c,
                        };
                        let comparison =
                            Comparison::new(path, comparator, operand_for(comparator, operand));
                        comparison.validate()?;
                        clauses.push(Clause::Comparison(comparison));
                    }
                }
                other => clauses.push(Clause::Comparison(Comparison::new(
                    path,
                    Comparator::Eq,
                    Operand::Single(other.clone()),
                ))),
            }
        }
        Ok(Self {
            clauses,
            ..Self::default()
        })
    }

    /// Stages an attribute for the next comparator
    pub fn select(mut self, path: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.pending.select(path);
        }
        self
    }

    /// Alias of [`Condition::select`]
    pub fn filter(self, path: impl Into<String>) -> Self {
        self.select(path)
    }

    /// Explicit AND. Siblings are AND-ed by default, so this only reads well.
    pub fn and(self) -> Self {
        self
    }

    /// Joins the previous and the next clause with OR
    pub fn or(mut self) -> Self {
        if self.error.is_none() {
            self.clauses.push(Clause::Or);
        }
        self
    }

    /// Negates the staged attribute's next comparator
    pub fn not(mut self) -> Self {
        if self.error.is_none() {
            self.pending.negate();
        }
        self
    }

    /// Appends a parenthesised sub-condition built on a fresh condition
    pub fn group<F>(mut self, build: F) -> Self
    where
        F: FnOnce(Condition) -> Condition,
    {
        if self.error.is_some() {
            return self;
        }
        let sub = build(Condition::new());
        match sub.error {
            Some(err) => self.error = Some(err),
            None => self.clauses.push(Clause::Group(sub.clauses)),
        }
        self
    }

    /// Finishes the staged attribute with `comparator`
    pub fn compare(mut self, comparator: Comparator, operand: Operand) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.finish(comparator, operand) {
            Ok(comparison) => self.clauses.push(Clause::Comparison(comparison)),
            Err(err) => self.error = Some(err),
        }
        self
    }

    fn finish(&mut self, comparator: Comparator, operand: Operand) -> ConditionResult<Comparison> {
        let pending = self.pending.take();
        let effective = if pending.negated {
            comparator
                .negated()
                .ok_or_else(|| ConditionError::unsupported_negation(comparator))?
        } else {
            comparator
        };
        let path = pending
            .attribute_path
            .ok_or_else(|| ConditionError::missing_attribute(comparator))?;

        let comparison = Comparison::new(path, effective, operand);
        comparison.validate()?;
        Ok(comparison)
    }

    pub fn eq(self, value: impl Into<Value>) -> Self {
        self.compare(Comparator::Eq, Operand::Single(value.into()))
    }

    pub fn ne(self, value: impl Into<Value>) -> Self {
        self.compare(Comparator::Ne, Operand::Single(value.into()))
    }

    pub fn lt(self, value: impl Into<Value>) -> Self {
        self.compare(Comparator::Lt, Operand::Single(value.into()))
    }

    pub fn le(self, value: impl Into<Value>) -> Self {
        self.compare(Comparator::Le, Operand::Single(value.into()))
    }

    pub fn gt(self, value: impl Into<Value>) -> Self {
        self.compare(Comparator::Gt, Operand::Single(value.into()))
    }

    pub fn ge(self, value: impl Into<Value>) -> Self {
        self.compare(Comparator::Ge, Operand::Single(value.into()))
    }

    pub fn begins_with(self, prefix: impl Into<Value>) -> Self {
        self.compare(Comparator::BeginsWith, Operand::Single(prefix.into()))
    }

    pub fn contains(self, value: impl Into<Value>) -> Self {
        self.compare(Comparator::Contains, Operand::Single(value.into()))
    }

    pub fn not_contains(self, value: impl Into<Value>) -> Self {
        self.compare(Comparator::NotContains, Operand::Single(value.into()))
    }

    pub fn exists(self) -> Self {
        self.compare(Comparator::Exists, Operand::None)
    }

    pub fn not_exists(self) -> Self {
        self.compare(Comparator::NotExists, Operand::None)
    }

    /// Membership in a list of values
    pub fn is_in<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.compare(Comparator::In, Operand::Multiple(values))
    }

    /// Inclusive range
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.compare(
            Comparator::Between,
            Operand::Multiple(vec![low.into(), high.into()]),
        )
    }

    /// Finished clauses
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Raw expression override, if any
    pub fn raw_override(&self) -> Option<&RawExpression> {
        self.raw_override.as_ref()
    }

    /// First recorded builder error
    pub fn error(&self) -> Option<&ConditionError> {
        self.error.as_ref()
    }

    /// True when there is nothing to compile
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.raw_override.is_none()
    }
}

impl TryFrom<Value> for Condition {
    type Error = ConditionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Condition::from_map(&map),
            Value::Null => Ok(Condition::new()),
            other => Err(ConditionError::invalid_operand(
                "",
                format!("expected an object, found {}", other),
            )),
        }
    }
}

/// Shapes a map-form operand for the comparator's arity
fn operand_for(comparator: Comparator, value: &Value) -> Operand {
    match comparator.arity() {
        Arity::None => match value {
            // `{"exists": true}` style flags carry no operand
            Value::Bool(_) | Value::Null => Operand::None,
            other => Operand::Single(other.clone()),
        },
        Arity::Single => Operand::Single(value.clone()),
        Arity::Multiple | Arity::Variadic => match value {
            Value::Array(items) => Operand::Multiple(items.clone()),
            other => Operand::Single(other.clone()),
        },
    }
}
