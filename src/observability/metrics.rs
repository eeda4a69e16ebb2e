//! Metrics registry for aeroquery
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, Relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Request counters
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Requests compiled into wire input
    requests_built: AtomicU64,
    /// Requests rejected at compile or select time
    requests_rejected: AtomicU64,
    /// Queries served by the table's own key
    table_index_selections: AtomicU64,
    /// Queries served by a secondary index
    secondary_index_selections: AtomicU64,
    /// Queries no index could serve
    no_usable_index: AtomicU64,
    /// Pages fetched from the store
    pages_fetched: AtomicU64,
    /// Items returned across all pages
    items_returned: AtomicU64,
    /// Store call failures
    store_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_requests_built(&self) {
        self.requests_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_requests_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an index selection
    pub fn record_selection(&self, uses_table_index: bool) {
        if uses_table_index {
            self.table_index_selections.fetch_add(1, Ordering::Relaxed);
        } else {
            self.secondary_index_selections
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_no_usable_index(&self) {
        self.no_usable_index.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one fetched page and the items it carried
    pub fn record_page(&self, items: u64) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.items_returned.fetch_add(items, Ordering::Relaxed);
    }

    pub fn increment_store_failures(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_built: self.requests_built.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            table_index_selections: self.table_index_selections.load(Ordering::Relaxed),
            secondary_index_selections: self.secondary_index_selections.load(Ordering::Relaxed),
            no_usable_index: self.no_usable_index.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            items_returned: self.items_returned.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }

    /// Snapshot as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_built: u64,
    pub requests_rejected: u64,
    pub table_index_selections: u64,
    pub secondary_index_selections: u64,
    pub no_usable_index: u64,
    pub pages_fetched: u64,
    pub items_returned: u64,
    pub store_failures: u64,
}
