//! Metrics collection and monitoring for Memory Index
//!
//! Prometheus counters for index operations, kept in a crate-local registry
//! so embedding hosts can merge them into their own exposition.

use crate::core::error::Result;
use once_cell::sync::{Lazy, OnceCell};
use prometheus::{proto::MetricFamily, IntCounter, IntGauge, Registry};

/// Crate metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static INSTANCE: OnceCell<IndexMetrics> = OnceCell::new();

/// Counters shared by every index engine in the process
pub struct IndexMetrics {
    /// Total number of (value, entity) pairs added
    pub entries_added: IntCounter,
    /// Total number of (value, entity) pairs removed
    pub entries_removed: IntCounter,
    /// Total number of online updates applied
    pub updates_processed: IntCounter,
    /// Total number of populations closed unsuccessfully
    pub population_failures: IntCounter,
    /// Number of indexes currently registered with a provider
    pub live_indexes: IntGauge,
}

impl IndexMetrics {
    /// Create and register a new metrics set
    fn new(registry: &Registry) -> Result<Self> {
        let metrics = Self {
            entries_added: IntCounter::new(
                "mi_entries_added_total",
                "Total number of index entries added",
            )?,
            entries_removed: IntCounter::new(
                "mi_entries_removed_total",
                "Total number of index entries removed",
            )?,
            updates_processed: IntCounter::new(
                "mi_updates_processed_total",
                "Total number of online index updates applied",
            )?,
            population_failures: IntCounter::new(
                "mi_population_failures_total",
                "Total number of failed index populations",
            )?,
            live_indexes: IntGauge::new("mi_live_indexes", "Number of registered indexes")?,
        };

        registry.register(Box::new(metrics.entries_added.clone()))?;
        registry.register(Box::new(metrics.entries_removed.clone()))?;
        registry.register(Box::new(metrics.updates_processed.clone()))?;
        registry.register(Box::new(metrics.population_failures.clone()))?;
        registry.register(Box::new(metrics.live_indexes.clone()))?;

        Ok(metrics)
    }

    /// Get the process-wide metrics, registering them on first use
    pub fn try_global() -> Result<&'static IndexMetrics> {
        INSTANCE.get_or_try_init(|| Self::new(&REGISTRY))
    }
}

/// Gather every metric family in the crate registry
pub fn gather() -> Vec<MetricFamily> {
    REGISTRY.gather()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_metrics_register_once() {
        let first = IndexMetrics::try_global().unwrap();
        let second = IndexMetrics::try_global().unwrap();
        assert!(std::ptr::eq(first, second));

        let names: Vec<String> = gather().iter().map(|f| f.get_name().to_string()).collect();
        assert!(names.iter().any(|n| n == "mi_entries_added_total"));
        assert!(names.iter().any(|n| n == "mi_live_indexes"));
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let registry = Registry::new();
        assert!(IndexMetrics::new(&registry).is_ok());
        assert!(IndexMetrics::new(&registry).is_err());
    }
}
