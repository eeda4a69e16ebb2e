//! Index selection
//!
//! Selection order (strict):
//! 1. Candidates are the table's own key, then every secondary index
//! 2. Keep candidates whose hash attribute has an `Eq` constraint
//! 3. Prefer a candidate whose range attribute is also constrained, then the
//!    table's own key, then the first survivor in catalog order
//! 4. Otherwise the table's own key if its hash attribute has `Eq`, else
//!    `AERO_NO_USABLE_INDEX`
//!
//! The order is a correctness rule: a range-aware index keeps a comparator
//! out of the filter expression.

use super::catalog::{IndexDescriptor, TableDescriptor};
use super::chart::ComparatorChart;
use super::errors::{PlannerError, PlannerResult};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

/// Outcome of index selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The chosen secondary index; `None` when the table's own key is used
    pub index: Option<IndexDescriptor>,
    /// Whether the table's own key was chosen
    pub uses_table_index: bool,
}

impl Selection {
    fn table_index() -> Self {
        Self {
            index: None,
            uses_table_index: true,
        }
    }

    fn secondary(index: IndexDescriptor) -> Self {
        Self {
            index: Some(index),
            uses_table_index: false,
        }
    }

    /// Wire `IndexName`; only present for a secondary index
    pub fn index_name(&self) -> Option<&str> {
        self.index.as_ref().and_then(|index| index.name.as_deref())
    }

    /// The descriptor whose key attributes feed the key condition
    pub fn resolve(&self, table: &TableDescriptor) -> IndexDescriptor {
        match &self.index {
            Some(index) => index.clone(),
            None => table.primary_index(),
        }
    }
}

/// Picks the index a query runs against
pub struct IndexSelector<'a> {
    table: &'a TableDescriptor,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> IndexSelector<'a> {
    pub fn new(table: &'a TableDescriptor) -> Self {
        Self {
            table,
            metrics: None,
        }
    }

    /// Records selections and rejections in `metrics`
    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Selects an index for the charted constraints.
    ///
    /// Fails with `AERO_NO_USABLE_INDEX` when no candidate has an equality
    /// constraint on its hash attribute. The error is terminal.
    pub fn select(&self, chart: &ComparatorChart) -> PlannerResult<Selection> {
        match self.choose(chart) {
            Some(selection) => {
                log_event_with_fields(
                    Event::IndexSelected,
                    &[
                        ("table", self.table.name.as_str()),
                        ("index", selection.index_name().unwrap_or("<table>")),
                    ],
                );
                if let Some(metrics) = self.metrics {
                    metrics.record_selection(selection.uses_table_index);
                }
                Ok(selection)
            }
            None => {
                log_event_with_fields(Event::NoUsableIndex, &[("table", self.table.name.as_str())]);
                if let Some(metrics) = self.metrics {
                    metrics.increment_no_usable_index();
                }
                Err(PlannerError::no_usable_index(&self.table.name))
            }
        }
    }

    fn choose(&self, chart: &ComparatorChart) -> Option<Selection> {
        let survivors: Vec<IndexDescriptor> = self
            .table
            .candidates()
            .into_iter()
            .filter(|candidate| chart.has_equality(&candidate.hash_attribute))
            .collect();

        let range_aware = survivors.iter().find(|candidate| {
            candidate
                .range_attribute
                .as_deref()
                .map(|range| chart.contains(range))
                .unwrap_or(false)
        });

        let chosen = range_aware
            .or_else(|| survivors.iter().find(|candidate| candidate.is_primary))
            .or_else(|| survivors.first());

        match chosen {
            Some(index) if index.is_primary => Some(Selection::table_index()),
            Some(index) => Some(Selection::secondary(index.clone())),
            None if chart.has_equality(&self.table.hash_key) => Some(Selection::table_index()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Comparator;

    fn users() -> TableDescriptor {
        TableDescriptor::new("users", "id")
            .with_index(IndexDescriptor::secondary("nameGlobalIndex", "name", None))
            .with_index(IndexDescriptor::secondary(
                "nameAgeIndex",
                "name",
                Some("age".to_string()),
            ))
    }

    fn chart(entries: &[(&str, Comparator)]) -> ComparatorChart {
        let mut chart = ComparatorChart::new();
        for (attribute, comparator) in entries {
            chart.insert(*attribute, *comparator);
        }
        chart
    }

    #[test]
    fn test_primary_hash_equality() {
        let table = users();
        let selection = IndexSelector::new(&table)
            .select(&chart(&[("id", Comparator::Eq)]))
            .unwrap();

        assert!(selection.uses_table_index);
        assert_eq!(selection.index_name(), None);
        assert_eq!(selection.resolve(&table).hash_attribute, "id");
    }

    #[test]
    fn test_secondary_hash_equality() {
        let table = users();
        let selection = IndexSelector::new(&table)
            .select(&chart(&[("name", Comparator::Eq)]))
            .unwrap();

        assert!(!selection.uses_table_index);
        assert_eq!(selection.index_name(), Some("nameGlobalIndex"));
    }

    #[test]
    fn test_range_aware_candidate_preferred() {
        let table = users();
        let selection = IndexSelector::new(&table)
            .select(&chart(&[("name", Comparator::Eq), ("age", Comparator::Gt)]))
            .unwrap();

        assert_eq!(selection.index_name(), Some("nameAgeIndex"));
    }

    #[test]
    fn test_range_aware_beats_primary() {
        let table = users();
        let selection = IndexSelector::new(&table)
            .select(&chart(&[
                ("id", Comparator::Eq),
                ("name", Comparator::Eq),
                ("age", Comparator::Between),
            ]))
            .unwrap();

        assert_eq!(selection.index_name(), Some("nameAgeIndex"));
    }

    #[test]
    fn test_primary_beats_plain_secondary() {
        let table = users();
        let selection = IndexSelector::new(&table)
            .select(&chart(&[("id", Comparator::Eq), ("name", Comparator::Eq)]))
            .unwrap();

        assert!(selection.uses_table_index);
    }

    #[test]
    fn test_non_equality_hash_disqualifies() {
        let table = users();
        let metrics = MetricsRegistry::new();
        let err = IndexSelector::new(&table)
            .with_metrics(&metrics)
            .select(&chart(&[("id", Comparator::Gt), ("name", Comparator::BeginsWith)]))
            .unwrap_err();

        assert_eq!(err.code().code(), "AERO_NO_USABLE_INDEX");
        assert_eq!(metrics.snapshot().no_usable_index, 1);
    }

    #[test]
    fn test_empty_chart_rejected() {
        let table = users();
        assert!(IndexSelector::new(&table)
            .select(&ComparatorChart::new())
            .is_err());
    }

    #[test]
    fn test_selection_metrics() {
        let table = users();
        let metrics = MetricsRegistry::new();
        let selector = IndexSelector::new(&table).with_metrics(&metrics);

        selector.select(&chart(&[("id", Comparator::Eq)])).unwrap();
        selector.select(&chart(&[("name", Comparator::Eq)])).unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.table_index_selections, 1);
        assert_eq!(snapshot.secondary_index_selections, 1);
    }
}
