//! Comparator chart
//!
//! Maps each attribute to the comparator of its first *eligible* clause.
//! Eligible means top level, not inside a group and not touching an explicit
//! OR. Only those clauses can move into an AND-only key condition.

use std::collections::BTreeMap;

use crate::condition::{is_or_adjacent, Clause, Comparator, Condition};

/// Attribute path → comparator of its first eligible top-level clause
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparatorChart {
    entries: BTreeMap<String, Comparator>,
}

impl ComparatorChart {
    /// Creates an empty chart
    pub fn new() -> Self {
        Self::default()
    }

    /// Charts a condition's top-level clauses. A raw override charts nothing.
    pub fn from_condition(condition: &Condition) -> Self {
        if condition.raw_override().is_some() {
            return Self::new();
        }
        Self::from_clauses(condition.clauses())
    }

    /// Charts one sibling list
    pub fn from_clauses(clauses: &[Clause]) -> Self {
        let mut chart = Self::new();
        for (position, clause) in clauses.iter().enumerate() {
            let Some(comparison) = clause.as_comparison() else {
                continue;
            };
            if is_or_adjacent(clauses, position) {
                continue;
            }
            chart
                .entries
                .entry(comparison.attribute_path.clone())
                .or_insert(comparison.comparator);
        }
        chart
    }

    /// Adds an entry unless the attribute is already charted
    pub fn insert(&mut self, attribute: impl Into<String>, comparator: Comparator) {
        self.entries.entry(attribute.into()).or_insert(comparator);
    }

    pub fn get(&self, attribute: &str) -> Option<Comparator> {
        self.entries.get(attribute).copied()
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.entries.contains_key(attribute)
    }

    /// True when the attribute has an equality constraint
    pub fn has_equality(&self, attribute: &str) -> bool {
        self.get(attribute) == Some(Comparator::Eq)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
