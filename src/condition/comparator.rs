//! Comparators and the negation table

use std::fmt;
use std::str::FromStr;

use super::errors::ConditionError;

/// Comparison operators understood by the expression compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    BeginsWith,
    Contains,
    NotContains,
    Exists,
    NotExists,
    In,
    Between,
}

/// Number of operand values a comparator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No operand (`Exists`, `NotExists`)
    None,
    /// Exactly one value
    Single,
    /// Exactly two values (`Between`)
    Multiple,
    /// One or more values (`In`)
    Variadic,
}

/// Negated counterpart of each comparator. `None` means negation is rejected.
const NEGATION_TABLE: [(Comparator, Option<Comparator>); 13] = [
    (Comparator::Eq, Some(Comparator::Ne)),
    (Comparator::Ne, Some(Comparator::Eq)),
    (Comparator::Lt, Some(Comparator::Ge)),
    (Comparator::Le, Some(Comparator::Gt)),
    (Comparator::Gt, Some(Comparator::Le)),
    (Comparator::Ge, Some(Comparator::Lt)),
    (Comparator::BeginsWith, None),
    (Comparator::Contains, Some(Comparator::NotContains)),
    (Comparator::NotContains, Some(Comparator::Contains)),
    (Comparator::Exists, Some(Comparator::NotExists)),
    (Comparator::NotExists, Some(Comparator::Exists)),
    (Comparator::In, None),
    (Comparator::Between, None),
];

impl Comparator {
    /// Every comparator, in declaration order
    pub const ALL: [Comparator; 13] = [
        Comparator::Eq,
        Comparator::Ne,
        Comparator::Lt,
        Comparator::Le,
        Comparator::Gt,
        Comparator::Ge,
        Comparator::BeginsWith,
        Comparator::Contains,
        Comparator::NotContains,
        Comparator::Exists,
        Comparator::NotExists,
        Comparator::In,
        Comparator::Between,
    ];

    /// Operand arity
    pub fn arity(self) -> Arity {
        match self {
            Comparator::Exists | Comparator::NotExists => Arity::None,
            Comparator::Between => Arity::Multiple,
            Comparator::In => Arity::Variadic,
            _ => Arity::Single,
        }
    }

    /// Negated counterpart, if negation is supported
    pub fn negated(self) -> Option<Comparator> {
        NEGATION_TABLE
            .iter()
            .find(|(c, _)| *c == self)
            .and_then(|(_, negated)| *negated)
    }

    /// Canonical name used in map-form conditions and error messages
    pub fn name(self) -> &'static str {
        match self {
            Comparator::Eq => "eq",
            Comparator::Ne => "ne",
            Comparator::Lt => "lt",
            Comparator::Le => "le",
            Comparator::Gt => "gt",
            Comparator::Ge => "ge",
            Comparator::BeginsWith => "beginsWith",
            Comparator::Contains => "contains",
            Comparator::NotContains => "notContains",
            Comparator::Exists => "exists",
            Comparator::NotExists => "notExists",
            Comparator::In => "in",
            Comparator::Between => "between",
        }
    }

    /// Infix symbol for binary comparisons
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Comparator::Eq => Some("="),
            Comparator::Ne => Some("<>"),
            Comparator::Lt => Some("<"),
            Comparator::Le => Some("<="),
            Comparator::Gt => Some(">"),
            Comparator::Ge => Some(">="),
            _ => None,
        }
    }

    /// Whether the comparator may appear in a key condition
    pub fn is_key_condition_compatible(self) -> bool {
        matches!(
            self,
            Comparator::Eq
                | Comparator::Lt
                | Comparator::Le
                | Comparator::Gt
                | Comparator::Ge
                | Comparator::BeginsWith
                | Comparator::Between
        )
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Comparator {
    type Err = ConditionError;

    /// Accepts camelCase or snake_case names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        Comparator::ALL
            .iter()
            .copied()
            .find(|c| c.name().to_ascii_lowercase() == folded)
            .ok_or_else(|| ConditionError::invalid_comparator(s))
    }
}
