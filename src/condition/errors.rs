//! Condition error types
//!
//! Error codes:
//! - AERO_CONDITION_UNSUPPORTED_NEGATION (REJECT)
//! - AERO_CONDITION_INVALID_COMPARATOR (REJECT)
//! - AERO_CONDITION_INVALID_OPERAND (REJECT)
//! - AERO_CONDITION_MISSING_ATTRIBUTE (REJECT)
//! - AERO_CONDITION_DANGLING_CONNECTIVE (REJECT)
//! - AERO_CONDITION_EMPTY_GROUP (REJECT)
//! - AERO_CONDITION_MARSHAL_FAILED (REJECT)
//! - AERO_CONDITION_MALFORMED_RAW (REJECT)
//! - AERO_CONDITION_PLACEHOLDER_OVERFLOW (REJECT)
//!
//! All condition errors are raised before any request is sent and are never
//! retried: they describe a malformed request, not a transient fault.

use std::fmt;

use super::comparator::Comparator;
use crate::value::MarshalError;

/// Severity levels for condition errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Condition error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionErrorCode {
    /// Comparator has no negated counterpart
    AeroConditionUnsupportedNegation,
    /// Unknown comparator name
    AeroConditionInvalidComparator,
    /// Operand shape does not fit the comparator arity
    AeroConditionInvalidOperand,
    /// Comparator called with no attribute selected
    AeroConditionMissingAttribute,
    /// OR separator at the start, end, or doubled
    AeroConditionDanglingConnective,
    /// Group with no clauses
    AeroConditionEmptyGroup,
    /// Value marshalling failed
    AeroConditionMarshalFailed,
    /// Raw expression object has the wrong shape
    AeroConditionMalformedRaw,
    /// Placeholder counter ran past `u32::MAX`
    AeroConditionPlaceholderOverflow,
}

impl ConditionErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ConditionErrorCode::AeroConditionUnsupportedNegation => {
                "AERO_CONDITION_UNSUPPORTED_NEGATION"
            }
            ConditionErrorCode::AeroConditionInvalidComparator => {
                "AERO_CONDITION_INVALID_COMPARATOR"
            }
            ConditionErrorCode::AeroConditionInvalidOperand => "AERO_CONDITION_INVALID_OPERAND",
            ConditionErrorCode::AeroConditionMissingAttribute => {
                "AERO_CONDITION_MISSING_ATTRIBUTE"
            }
            ConditionErrorCode::AeroConditionDanglingConnective => {
                "AERO_CONDITION_DANGLING_CONNECTIVE"
            }
            ConditionErrorCode::AeroConditionEmptyGroup => "AERO_CONDITION_EMPTY_GROUP",
            ConditionErrorCode::AeroConditionMarshalFailed => "AERO_CONDITION_MARSHAL_FAILED",
            ConditionErrorCode::AeroConditionMalformedRaw => "AERO_CONDITION_MALFORMED_RAW",
            ConditionErrorCode::AeroConditionPlaceholderOverflow => {
                "AERO_CONDITION_PLACEHOLDER_OVERFLOW"
            }
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for ConditionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Condition error with context
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionError {
    code: ConditionErrorCode,
    message: String,
    /// Attribute path if applicable
    attribute: Option<String>,
    source: Option<MarshalError>,
}

impl ConditionError {
    fn new(code: ConditionErrorCode, message: String, attribute: Option<String>) -> Self {
        Self {
            code,
            message,
            attribute,
            source: None,
        }
    }

    /// Negating a comparator that has no negated form
    pub fn unsupported_negation(comparator: Comparator) -> Self {
        Self::new(
            ConditionErrorCode::AeroConditionUnsupportedNegation,
            format!("Comparator '{}' cannot be negated", comparator.name()),
            None,
        )
    }

    /// Unknown comparator name
    pub fn invalid_comparator(name: impl Into<String>) -> Self {
        Self::new(
            ConditionErrorCode::AeroConditionInvalidComparator,
            format!("Unknown comparator '{}'", name.into()),
            None,
        )
    }

    /// Operand does not fit the comparator
    pub fn invalid_operand(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        let attribute = attribute.into();
        Self::new(
            ConditionErrorCode::AeroConditionInvalidOperand,
            format!("Invalid operand for '{}': {}", attribute, reason.into()),
            Some(attribute),
        )
    }

    /// Comparator called before any attribute was selected
    pub fn missing_attribute(comparator: Comparator) -> Self {
        Self::new(
            ConditionErrorCode::AeroConditionMissingAttribute,
            format!("Comparator '{}' has no attribute selected", comparator.name()),
            None,
        )
    }

    /// OR separator with nothing on one side
    pub fn dangling_connective(position: usize) -> Self {
        Self::new(
            ConditionErrorCode::AeroConditionDanglingConnective,
            format!("OR at position {} has no clause on one side", position),
            None,
        )
    }

    /// Group with no clauses
    pub fn empty_group(position: usize) -> Self {
        Self::new(
            ConditionErrorCode::AeroConditionEmptyGroup,
            format!("Group at position {} is empty", position),
            None,
        )
    }

    /// Value marshalling failed
    pub fn marshal_failed(source: MarshalError) -> Self {
        let attribute = source.attribute().to_string();
        Self {
            code: ConditionErrorCode::AeroConditionMarshalFailed,
            message: source.to_string(),
            attribute: Some(attribute),
            source: Some(source),
        }
    }

    /// Raw expression object is unusable
    pub fn malformed_raw(reason: impl Into<String>) -> Self {
        Self::new(ConditionErrorCode::AeroConditionMalformedRaw, reason.into(), None)
    }

    /// No placeholder index left after `last`
    pub fn placeholder_overflow(last: u32) -> Self {
        Self::new(
            ConditionErrorCode::AeroConditionPlaceholderOverflow,
            format!("Placeholder index space exhausted at {}", last),
            None,
        )
    }

    /// Returns the error code
    pub fn code(&self) -> ConditionErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the attribute path if applicable
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ConditionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for condition building and compilation
pub type ConditionResult<T> = Result<T, ConditionError>;
