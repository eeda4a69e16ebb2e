//! # Retrieval Errors

use thiserror::Error;

use crate::condition::ConditionError;
use crate::planner::PlannerError;

/// Result type for retrieval operations
pub type RetrievalResult<T> = Result<T, RetrievalError>;

/// Failure reported by a store client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Request throttled: {0}")]
    Throttled(String),

    #[error("Request rejected by store: {0}")]
    Rejected(String),
}

/// Retrieval errors
#[derive(Debug, Error)]
pub enum RetrievalError {
    // Compile time (nothing was sent)
    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("Invalid retrieval option: {0}")]
    InvalidOption(String),

    // Network
    #[error("Store call failed after {pages} page(s): {source}")]
    Store {
        pages: u32,
        #[source]
        source: StoreError,
    },
}

impl RetrievalError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RetrievalError::Condition(err) => err.code().code(),
            RetrievalError::Planner(err) => err.code().code(),
            RetrievalError::InvalidOption(_) => "AERO_INVALID_OPTION",
            RetrievalError::Store { .. } => "AERO_STORE_FAILED",
        }
    }

    /// True when the request was rejected before any store call
    pub fn is_compile_time(&self) -> bool {
        !matches!(self, RetrievalError::Store { .. })
    }
}
