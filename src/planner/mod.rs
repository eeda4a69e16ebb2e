//! Index planner subsystem for aeroquery
//!
//! Decides which index a query runs against and splits the compiled filter
//! into a key condition and a residual filter.
//!
//! # Pipeline
//!
//! 1. [`ComparatorChart`]: attribute → comparator of its eligible top-level clause
//! 2. [`IndexSelector`]: picks the table's own key or a secondary index
//! 3. [`split_key_condition`]: lifts the hash/range comparisons into the
//!    reserved `#qha`/`:qhv`/`#qra`/`:qrv` placeholders
//!
//! Scans never run the planner.
//!
//! # Determinism
//!
//! Same catalog + same condition → same selection and same key condition.

mod catalog;
mod chart;
mod errors;
mod explain;
mod extract;
mod selector;

pub use catalog::{IndexDescriptor, TableDescriptor};
pub use chart::ComparatorChart;
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::ExplainPlan;
pub use extract::{split_key_condition, KeyCondition, KeySplit};
pub use selector::{IndexSelector, Selection};
