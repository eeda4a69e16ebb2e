//! Expression compiler subsystem for aeroquery
//!
//! Lowers a [`Condition`](crate::condition::Condition) into the store's
//! expression triple: expression text (or tokens), a name placeholder map and
//! a value placeholder map.
//!
//! # Placeholder scheme
//!
//! - Comparison `i` owns `#a{i}` and `:v{i}`
//! - Nested paths split into `#a{i}_0.#a{i}_1...`
//! - `In`/`Between` values are `:v{i}_1.._n`; the bare `:v{i}` is never emitted
//! - Numbering is depth-first, left to right, from the context's offset
//!
//! # Determinism
//!
//! Same condition + same offset → byte-identical output. Maps are ordered.

mod compiler;
mod context;
mod raw;
mod tokens;

pub use compiler::compile;
pub use context::{CompileContext, ExpressionKeyword, PlaceholderCounter};
pub use tokens::{
    render_comparison, render_tokens, ComparisonToken, CompiledExpression, Connective,
    ExpressionRepr, ExpressionToken, NAME_PREFIX, VALUE_PREFIX,
};
