//! Planner error types
//!
//! Error codes:
//! - AERO_NO_USABLE_INDEX (REJECT)
//! - AERO_INVALID_CATALOG (REJECT)
//!
//! `AERO_NO_USABLE_INDEX` is terminal: the request is never sent.

use std::fmt;

/// Severity levels for planner errors
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

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// No index has an equality constraint on its hash attribute
    AeroNoUsableIndex,
    /// Index catalog is inconsistent
    AeroInvalidCatalog,
}

impl PlannerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::AeroNoUsableIndex => "AERO_NO_USABLE_INDEX",
            PlannerErrorCode::AeroInvalidCatalog => "AERO_INVALID_CATALOG",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Table name if applicable
    table: Option<String>,
}

impl PlannerError {
    /// Create a no usable index error
    pub fn no_usable_index(table: impl Into<String>) -> Self {
        let t = table.into();
        Self {
            code: PlannerErrorCode::AeroNoUsableIndex,
            message: format!(
                "No index of table '{}' has an equality constraint on its hash attribute",
                t
            ),
            table: Some(t),
        }
    }

    /// Create an invalid catalog error
    pub fn invalid_catalog(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::AeroInvalidCatalog,
            message: reason.into(),
            table: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
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

    /// Returns the table name if applicable
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }
}

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
