//! Index catalog
//!
//! A table has one primary index (its own key) and any number of named
//! secondary indexes. Candidate order is primary first, then secondaries in
//! declaration order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::errors::{PlannerError, PlannerResult};

/// One index a query may run against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name; `None` for the table's own key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether this is the table's own key
    #[serde(default)]
    pub is_primary: bool,
    /// Hash (partition) attribute
    pub hash_attribute: String,
    /// Range (sort) attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_attribute: Option<String>,
}

impl IndexDescriptor {
    /// The table's own key
    pub fn primary(hash_attribute: impl Into<String>, range_attribute: Option<String>) -> Self {
        Self {
            name: None,
            is_primary: true,
            hash_attribute: hash_attribute.into(),
            range_attribute,
        }
    }

    /// A named secondary index
    pub fn secondary(
        name: impl Into<String>,
        hash_attribute: impl Into<String>,
        range_attribute: Option<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            is_primary: false,
            hash_attribute: hash_attribute.into(),
            range_attribute,
        }
    }

    /// Name for logs and explain output
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<table>")
    }
}

/// Table key schema plus its secondary indexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name
    pub name: String,
    /// Primary hash attribute
    pub hash_key: String,
    /// Primary range attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,
    /// Secondary indexes in declaration order
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
}

impl TableDescriptor {
    /// Creates a table with no secondary indexes
    pub fn new(name: impl Into<String>, hash_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash_key: hash_key.into(),
            range_key: None,
            indexes: Vec::new(),
        }
    }

    /// Sets the primary range attribute
    pub fn with_range_key(mut self, range_key: impl Into<String>) -> Self {
        self.range_key = Some(range_key.into());
        self
    }

    /// Adds a secondary index
    pub fn with_index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }

    /// The table's own key as an index
    pub fn primary_index(&self) -> IndexDescriptor {
        IndexDescriptor::primary(self.hash_key.clone(), self.range_key.clone())
    }

    /// Primary first, then secondaries in catalog order
    pub fn candidates(&self) -> Vec<IndexDescriptor> {
        std::iter::once(self.primary_index())
            .chain(self.indexes.iter().cloned())
            .collect()
    }

    /// Checks the catalog is usable for index selection
    pub fn validate(&self) -> PlannerResult<()> {
        if self.name.trim().is_empty() {
            return Err(PlannerError::invalid_catalog("Table name must not be empty"));
        }
        if self.hash_key.trim().is_empty() {
            return Err(PlannerError::invalid_catalog(format!(
                "Table '{}' has an empty hash key",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for index in &self.indexes {
            let name = match index.name.as_deref() {
                Some(name) if !name.trim().is_empty() => name,
                _ => {
                    return Err(PlannerError::invalid_catalog(format!(
                        "Table '{}' has a secondary index without a name",
                        self.name
                    )))
                }
            };
            if index.is_primary {
                return Err(PlannerError::invalid_catalog(format!(
                    "Secondary index '{}' is marked primary",
                    name
                )));
            }
            if index.hash_attribute.trim().is_empty() {
                return Err(PlannerError::invalid_catalog(format!(
                    "Index '{}' has an empty hash attribute",
                    name
                )));
            }
            if !seen.insert(name) {
                return Err(PlannerError::invalid_catalog(format!(
                    "Duplicate index name '{}'",
                    name
                )));
            }
        }

        Ok(())
    }
}
