//! Retrieval options
//!
//! Passed through to the wire request untouched, apart from `all_pages`
//! which drives the pagination loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{RetrievalError, RetrievalResult};
use crate::value::Item;

/// Follow `LastEvaluatedKey` until exhausted or `max_pages` is reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllPages {
    /// Pause between page requests
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
}

impl AllPages {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Per-request options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalOptions {
    /// Maximum items evaluated per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub consistent_read: bool,
    /// Return only counts (`Select = COUNT`)
    pub count: bool,
    /// Exclusive start key of the first page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<Item>,
    /// Attributes to project
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_pages: Option<AllPages>,
}

impl RetrievalOptions {
    pub fn validate(&self) -> RetrievalResult<()> {
        if self.limit == Some(0) {
            return Err(RetrievalError::InvalidOption(
                "limit must be greater than 0".into(),
            ));
        }
        if let Some(AllPages {
            max_pages: Some(0), ..
        }) = self.all_pages
        {
            return Err(RetrievalError::InvalidOption(
                "max_pages must be greater than 0".into(),
            ));
        }
        if self.attributes.iter().any(|a| a.trim().is_empty()) {
            return Err(RetrievalError::InvalidOption(
                "projected attribute names must not be empty".into(),
            ));
        }
        if self.count && !self.attributes.is_empty() {
            return Err(RetrievalError::InvalidOption(
                "count cannot be combined with a projection".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_empty_object() {
        let options: RetrievalOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, RetrievalOptions::default());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_all_pages_from_json() {
        let options: RetrievalOptions =
            serde_json::from_value(json!({"all_pages": {"delay_ms": 250, "max_pages": 3}}))
                .unwrap();
        let all = options.all_pages.unwrap();
        assert_eq!(all.delay(), Duration::from_millis(250));
        assert_eq!(all.max_pages, Some(3));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let options = RetrievalOptions {
            limit: Some(0),
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert_eq!(err.code(), "AERO_INVALID_OPTION");
    }

    #[test]
    fn test_count_with_projection_rejected() {
        let options = RetrievalOptions {
            count: true,
            attributes: vec!["name".into()],
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }
}
