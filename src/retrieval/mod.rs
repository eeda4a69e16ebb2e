//! Retrieval subsystem for aeroquery
//!
//! Thin orchestration around the compiler and planner:
//!
//! - [`RetrievalRequest`]: query/scan plus pass-through options
//! - [`RequestInput`]: the wire request (`TableName`, `IndexName`, ...)
//! - [`StoreClient`]: the network seam
//! - [`Retriever`]: compile once, then fetch one page or follow every page
//!
//! Compile-time errors always surface before the first store call.

mod errors;
mod executor;
mod input;
mod options;
mod request;

pub use errors::{RetrievalError, RetrievalResult, StoreError};
pub use executor::{Retriever, StoreClient, StoreFuture};
pub use input::{Page, RequestInput, ResponseSet};
pub use options::{AllPages, RetrievalOptions};
pub use request::{Operation, RetrievalRequest};
