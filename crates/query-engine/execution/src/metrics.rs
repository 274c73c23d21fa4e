//! Metrics setup and update for the data source.

use prometheus::core::{AtomicU64, GenericCounter};

#[derive(Debug, Clone)]
pub struct Metrics {
    pub query_total: GenericCounter<AtomicU64>,
    pub explain_total: GenericCounter<AtomicU64>,
    pub statement_total: GenericCounter<AtomicU64>,
    pub filtered_count_skipped_total: GenericCounter<AtomicU64>,
    pub error_total: GenericCounter<AtomicU64>,
}

impl Metrics {
    /// Setup counters used to produce Prometheus metrics
    pub fn initialize(metrics_registry: &mut prometheus::Registry) -> Result<Self, prometheus::Error> {
        let query_total = add_int_counter_metric(
            metrics_registry,
            "datatables_query_total",
            "Total successful queries.",
        )?;

        let explain_total = add_int_counter_metric(
            metrics_registry,
            "datatables_explain_total",
            "Total successful explains.",
        )?;

        let statement_total = add_int_counter_metric(
            metrics_registry,
            "datatables_statement_total",
            "Total statements sent to the database.",
        )?;

        let filtered_count_skipped_total = add_int_counter_metric(
            metrics_registry,
            "datatables_filtered_count_skipped_total",
            "Total queries answered without a filtered count statement, because they had no filters.",
        )?;

        let error_total = add_int_counter_metric(
            metrics_registry,
            "datatables_error_total",
            "Total queries and explains that failed.",
        )?;

        Ok(Self {
            query_total,
            explain_total,
            statement_total,
            filtered_count_skipped_total,
            error_total,
        })
    }

    pub fn record_successful_query(&self, statements: u64, skipped_filtered_count: bool) {
        self.query_total.inc();
        self.statement_total.inc_by(statements);
        if skipped_filtered_count {
            self.filtered_count_skipped_total.inc();
        }
    }

    pub fn record_successful_explain(&self) {
        self.explain_total.inc();
    }

    pub fn error_metrics(&self) {
        self.error_total.inc();
    }
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericCounter<AtomicU64>, prometheus::Error> {
    let int_counter =
        prometheus::IntCounter::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_registered() {
        let mut registry = prometheus::Registry::new();
        let metrics = Metrics::initialize(&mut registry).unwrap();
        metrics.record_successful_query(2, true);

        let mut names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "datatables_error_total",
                "datatables_explain_total",
                "datatables_filtered_count_skipped_total",
                "datatables_query_total",
                "datatables_statement_total",
            ]
        );
        assert_eq!(metrics.statement_total.get(), 2);
    }

    #[test]
    fn registering_twice_fails() {
        let mut registry = prometheus::Registry::new();
        Metrics::initialize(&mut registry).unwrap();
        assert!(Metrics::initialize(&mut registry).is_err());
    }
}
