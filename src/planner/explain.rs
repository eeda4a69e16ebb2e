//! Explain plan output
//!
//! Deterministic, human-readable description of how a request will run.

use std::fmt;

use serde::Serialize;

use super::errors::PlannerError;
use super::selector::Selection;

/// Explain plan output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainPlan {
    /// Whether the request can be sent
    pub accepted: bool,
    /// `Query` or `Scan`
    pub operation: String,
    /// Target table
    pub table: String,
    /// Secondary index, when one was chosen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Whether the table's own key serves the query
    pub uses_table_index: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
    /// Rejection error code (if rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<String>,
    /// Rejection reason (if rejected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ExplainPlan {
    /// Plan for a query served by `selection`
    pub fn query(
        table: impl Into<String>,
        selection: &Selection,
        key_condition: impl Into<String>,
        filter: Option<String>,
    ) -> Self {
        Self {
            accepted: true,
            operation: "Query".to_string(),
            table: table.into(),
            index: selection.index_name().map(str::to_string),
            uses_table_index: selection.uses_table_index,
            key_condition: Some(key_condition.into()),
            filter,
            projection: None,
            rejection_code: None,
            rejection_reason: None,
        }
    }

    /// Plan for a full-table scan
    pub fn scan(table: impl Into<String>, filter: Option<String>) -> Self {
        Self {
            accepted: true,
            operation: "Scan".to_string(),
            table: table.into(),
            index: None,
            uses_table_index: true,
            key_condition: None,
            filter,
            projection: None,
            rejection_code: None,
            rejection_reason: None,
        }
    }

    /// Rejected plan with an error code and reason
    pub fn rejected(
        operation: impl Into<String>,
        table: impl Into<String>,
        code: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            accepted: false,
            operation: operation.into(),
            table: table.into(),
            index: None,
            uses_table_index: false,
            key_condition: None,
            filter: None,
            projection: None,
            rejection_code: Some(code.into()),
            rejection_reason: Some(reason.into()),
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(table: impl Into<String>, err: &PlannerError) -> Self {
        Self::rejected("Query", table, err.code().code(), err.message())
    }

    pub fn with_projection(mut self, projection: Option<String>) -> Self {
        self.projection = projection;
        self
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;
        writeln!(f, "Operation: {}", self.operation)?;
        writeln!(f, "Table: {}", self.table)?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if self.operation == "Query" {
                match &self.index {
                    Some(index) => writeln!(f, "Index: {}", index)?,
                    None => writeln!(f, "Index: <table>")?,
                }
            }
            if let Some(key) = &self.key_condition {
                writeln!(f, "Key Condition: {}", key)?;
            }
            if let Some(filter) = &self.filter {
                writeln!(f, "Filter: {}", filter)?;
            }
            if let Some(projection) = &self.projection {
                writeln!(f, "Projection: {}", projection)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
