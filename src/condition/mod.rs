//! Condition subsystem for aeroquery
//!
//! Holds the clause model, the comparator negation table and the chainable
//! builder that produces an immutable clause list for the compiler.
//!
//! # Chaining
//!
//! ```ignore
//! let condition = Condition::new()
//!     .select("name").eq("Charlie")
//!     .select("age").not().lt(18)
//!     .group(|g| g.select("role").eq("admin").or().select("role").eq("owner"));
//! ```

mod builder;
mod clause;
mod comparator;
mod errors;

pub use builder::{Condition, RawExpression};
pub use clause::{is_or_adjacent, validate_siblings, Clause, Comparison, Operand, PendingAttribute};
pub use comparator::{Arity, Comparator};
pub use errors::{ConditionError, ConditionErrorCode, ConditionResult, Severity};
