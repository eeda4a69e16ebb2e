//! Clause model
//!
//! A condition is an ordered list of clauses. Siblings are joined with AND
//! unless an explicit `Or` separator sits between them.

use serde_json::Value;

use super::comparator::{Arity, Comparator};
use super::errors::{ConditionError, ConditionResult};

/// Operand of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No value (`Exists`, `NotExists`)
    None,
    /// One value
    Single(Value),
    /// Several values (`Between`, `In`)
    Multiple(Vec<Value>),
}

impl Operand {
    /// Values carried by the operand, in order
    pub fn values(&self) -> &[Value] {
        match self {
            Operand::None => &[],
            Operand::Single(v) => std::slice::from_ref(v),
            Operand::Multiple(vs) => vs,
        }
    }
}

/// A single attribute comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Attribute path; `.` separates nested document segments
    pub attribute_path: String,
    /// Effective comparator (negation already applied)
    pub comparator: Comparator,
    /// Operand value(s)
    pub operand: Operand,
}

impl Comparison {
    /// Create a comparison
    pub fn new(attribute_path: impl Into<String>, comparator: Comparator, operand: Operand) -> Self {
        Self {
            attribute_path: attribute_path.into(),
            comparator,
            operand,
        }
    }

    /// Path segments for nested access
    pub fn segments(&self) -> Vec<&str> {
        self.attribute_path.split('.').collect()
    }

    /// Checks that the operand shape matches the comparator arity
    pub fn validate(&self) -> ConditionResult<()> {
        let path = &self.attribute_path;
        match (self.comparator.arity(), &self.operand) {
            (Arity::None, Operand::None) => Ok(()),
            (Arity::Single, Operand::Single(_)) => Ok(()),
            (Arity::Multiple, Operand::Multiple(vs)) if vs.len() == 2 => Ok(()),
            (Arity::Multiple, _) => Err(ConditionError::invalid_operand(
                path,
                "between requires exactly two values",
            )),
            (Arity::Variadic, Operand::Multiple(vs)) if !vs.is_empty() => Ok(()),
            (Arity::Variadic, _) => Err(ConditionError::invalid_operand(
                path,
                "in requires at least one value",
            )),
            (Arity::None, _) => Err(ConditionError::invalid_operand(
                path,
                format!("{} takes no value", self.comparator),
            )),
            (Arity::Single, _) => Err(ConditionError::invalid_operand(
                path,
                format!("{} takes exactly one value", self.comparator),
            )),
        }
    }
}

/// One element of a clause list
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Attribute comparison
    Comparison(Comparison),
    /// Parenthesised sub-list
    Group(Vec<Clause>),
    /// Joins the previous and next sibling with OR
    Or,
}

impl Clause {
    /// Returns the comparison if this clause is one
    pub fn as_comparison(&self) -> Option<&Comparison> {
        match self {
            Clause::Comparison(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_or(&self) -> bool {
        matches!(self, Clause::Or)
    }
}

/// Checks OR placement and group emptiness for one sibling list
pub fn validate_siblings(clauses: &[Clause]) -> ConditionResult<()> {
    for (position, clause) in clauses.iter().enumerate() {
        match clause {
            Clause::Or => {
                let first = position == 0;
                let last = position + 1 == clauses.len();
                let doubled = position > 0 && clauses[position - 1].is_or();
                if first || last || doubled {
                    return Err(ConditionError::dangling_connective(position));
                }
            }
            Clause::Group(sub) if sub.is_empty() => {
                return Err(ConditionError::empty_group(position));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Whether the sibling at `position` touches an explicit OR
pub fn is_or_adjacent(clauses: &[Clause], position: usize) -> bool {
    let before = position > 0 && clauses[position - 1].is_or();
    let after = clauses.get(position + 1).is_some_and(Clause::is_or);
    before || after
}

/// Attribute selected by the chaining API, waiting for its comparator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAttribute {
    pub attribute_path: Option<String>,
    pub negated: bool,
}

impl PendingAttribute {
    /// Select a new attribute, dropping any unfinished selection
    pub fn select(&mut self, path: impl Into<String>) {
        self.attribute_path = Some(path.into());
        self.negated = false;
    }

    /// Toggle negation
    pub fn negate(&mut self) {
        self.negated = !self.negated;
    }

    /// Take the selection and reset the slot
    pub fn take(&mut self) -> PendingAttribute {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        self.attribute_path.is_none() && !self.negated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cmp(path: &str) -> Clause {
        Clause::Comparison(Comparison::new(path, Comparator::Eq, Operand::Single(json!(1))))
    }

    #[test]
    fn test_nested_segments() {
        let c = Comparison::new("address.city", Comparator::Eq, Operand::Single(json!("x")));
        assert_eq!(c.segments(), vec!["address", "city"]);
    }

    #[test]
    fn test_operand_arity_checks() {
        let between = Comparison::new("age", Comparator::Between, Operand::Multiple(vec![json!(1)]));
        assert!(between.validate().is_err());

        let empty_in = Comparison::new("age", Comparator::In, Operand::Multiple(vec![]));
        assert!(empty_in.validate().is_err());

        let exists = Comparison::new("age", Comparator::Exists, Operand::None);
        assert!(exists.validate().is_ok());
    }

    #[test]
    fn test_dangling_or_rejected() {
        assert!(validate_siblings(&[Clause::Or, cmp("a")]).is_err());
        assert!(validate_siblings(&[cmp("a"), Clause::Or]).is_err());
        assert!(validate_siblings(&[cmp("a"), Clause::Or, Clause::Or, cmp("b")]).is_err());
        assert!(validate_siblings(&[cmp("a"), Clause::Or, cmp("b")]).is_ok());
    }

    #[test]
    fn test_or_adjacency() {
        let clauses = vec![cmp("a"), cmp("b"), Clause::Or, cmp("c")];
        assert!(!is_or_adjacent(&clauses, 0));
        assert!(is_or_adjacent(&clauses, 1));
        assert!(is_or_adjacent(&clauses, 3));
    }

    #[test]
    fn test_pending_reset() {
        let mut pending = PendingAttribute::default();
        pending.select("name");
        pending.negate();
        pending.select("age");
        assert!(!pending.negated);

        let taken = pending.take();
        assert_eq!(taken.attribute_path.as_deref(), Some("age"));
        assert!(pending.is_empty());
    }
}
