//! Observable events for aeroquery
//!
//! Events are explicit and typed. Every request passes through
//! compile → select → fetch, and each step has a success and a rejection event.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Catalog configuration loaded
    ConfigLoaded,

    // Compilation
    /// Request compiled into wire input
    RequestBuilt,
    /// Request rejected before any network call
    RequestRejected,

    // Index selection
    /// Index chosen for a query
    IndexSelected,
    /// No index can serve the query's constraints
    NoUsableIndex,

    // Retrieval
    /// One page fetched from the store
    PageFetched,
    /// Store call failed
    StoreFailed,
    /// Retrieval finished (one page or all pages)
    RetrievalComplete,

    // Explain
    /// Explain produced
    ExplainComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RequestBuilt => "REQUEST_BUILT",
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::IndexSelected => "INDEX_SELECTED",
            Event::NoUsableIndex => "NO_USABLE_INDEX",
            Event::PageFetched => "PAGE_FETCHED",
            Event::StoreFailed => "STORE_FAILED",
            Event::RetrievalComplete => "RETRIEVAL_COMPLETE",
            Event::ExplainComplete => "EXPLAIN_COMPLETE",
        }
    }

    /// Returns true if this event reports a failed request
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::RequestRejected | Event::NoUsableIndex | Event::StoreFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::RequestBuilt,
            Event::RequestRejected,
            Event::IndexSelected,
            Event::NoUsableIndex,
            Event::PageFetched,
            Event::StoreFailed,
            Event::RetrievalComplete,
            Event::ExplainComplete,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::NoUsableIndex.is_failure());
        assert!(Event::StoreFailed.is_failure());
        assert!(!Event::IndexSelected.is_failure());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::IndexSelected), "INDEX_SELECTED");
    }
}
