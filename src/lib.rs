//! aeroquery - condition compiler and index selector for key-value store requests
//!
//! Builds filter/key conditions through a chainable API, lowers them into
//! expression/name/value maps with deterministic placeholder numbering, and
//! picks the index a query should run against.

pub mod cli;
pub mod compiler;
pub mod condition;
pub mod observability;
pub mod planner;
pub mod retrieval;
pub mod value;
