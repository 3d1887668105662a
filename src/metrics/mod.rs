/*!
 * # Metrics Module
 *
 * In-memory metrics collection for the campaign operations API.
 *
 * ## Metrics Formats
 *
 * - Prometheus text format at `/metrics`
 * - JSON format at `/metrics/json`
 */

use dashmap::DashMap;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Duration;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
    #[error("Metric not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Gauge {
    value: Arc<AtomicU64>,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f64) {
        self.value.store(value as u64, Ordering::Relaxed);
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        self.value.load(Ordering::Relaxed) as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct Histogram {
    sum: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, value: f64) {
        self.sum.fetch_add(value as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum(&self) -> f64 {
        self.sum.load(Ordering::Relaxed) as f64
    }
}

#[derive(Debug)]
pub struct MetricsRegistry {
    counters: Arc<DashMap<String, Counter>>,
    gauges: Arc<DashMap<String, Gauge>>,
    histograms: Arc<DashMap<String, Histogram>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(DashMap::new()),
            gauges: Arc::new(DashMap::new()),
            histograms: Arc::new(DashMap::new()),
        }
    }

    pub fn get_or_create_counter(&self, name: &str) -> Counter {
        self.counters
            .entry(name.to_string())
            .or_insert_with(Counter::new)
            .clone()
    }

    pub fn get_or_create_gauge(&self, name: &str) -> Gauge {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(Gauge::new)
            .clone()
    }

    pub fn get_or_create_histogram(&self, name: &str) -> Histogram {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .clone()
    }

    pub async fn export_metrics(&self) -> Result<String, MetricsError> {
        let mut output = String::new();

        // Export counters
        for entry in self.counters.iter() {
            let (name, counter) = entry.pair();
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!("{} {}\n", name, counter.get()));
        }

        // Export gauges
        for entry in self.gauges.iter() {
            let (name, gauge) = entry.pair();
            output.push_str(&format!("# TYPE {} gauge\n", name));
            output.push_str(&format!("{} {}\n", name, gauge.get()));
        }

        // Export histograms
        for entry in self.histograms.iter() {
            let (name, histogram) = entry.pair();
            output.push_str(&format!("# TYPE {} histogram\n", name));
            output.push_str(&format!("{}_count {}\n", name, histogram.get_count()));
            output.push_str(&format!("{}_sum {}\n", name, histogram.get_sum()));
        }

        Ok(output)
    }

    pub async fn export_metrics_json(&self) -> Result<serde_json::Value, MetricsError> {
        let mut counters = serde_json::Map::new();
        for entry in self.counters.iter() {
            let (name, counter) = entry.pair();
            counters.insert(name.to_string(), json!(counter.get()));
        }

        let mut gauges = serde_json::Map::new();
        for entry in self.gauges.iter() {
            let (name, gauge) = entry.pair();
            gauges.insert(name.to_string(), json!(gauge.get()));
        }

        let mut histograms = serde_json::Map::new();
        for entry in self.histograms.iter() {
            let (name, histogram) = entry.pair();
            histograms.insert(
                name.to_string(),
                json!({
                    "count": histogram.get_count(),
                    "sum": histogram.get_sum(),
                }),
            );
        }

        Ok(json!({
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        }))
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Global metrics registry
lazy_static::lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
    pub static ref APP_METRICS: AppMetrics = AppMetrics::new();
    pub static ref OPS_METRICS: OpsMetrics = OpsMetrics::new();
}

// Metrics collection functions
pub fn increment_counter(name: &str) {
    METRICS.get_or_create_counter(name).inc();
}

pub fn increment_counter_by(name: &str, value: u64) {
    METRICS.get_or_create_counter(name).inc_by(value);
}

pub fn set_gauge(name: &str, value: f64) {
    METRICS.get_or_create_gauge(name).set(value);
}

pub fn observe_histogram(name: &str, value: f64) {
    METRICS.get_or_create_histogram(name).observe(value);
}

// Application-level metrics
pub struct AppMetrics {
    pub requests_total: Counter,
    pub requests_duration: Histogram,
    pub cache_hits: Counter,
    pub cache_misses: Counter,
    pub errors_total: Counter,
    pub db_connection_failures: Counter,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: METRICS.get_or_create_counter("http_requests_total"),
            requests_duration: METRICS.get_or_create_histogram("http_request_duration_seconds"),
            cache_hits: METRICS.get_or_create_counter("dashboard_cache_hits_total"),
            cache_misses: METRICS.get_or_create_counter("dashboard_cache_misses_total"),
            errors_total: METRICS.get_or_create_counter("errors_total"),
            db_connection_failures: METRICS.get_or_create_counter("db_connection_failures_total"),
        }
    }

    pub fn record_request(&self, duration: Duration) {
        self.requests_total.inc();
        self.requests_duration.observe(duration.as_secs_f64());
    }

    pub fn record_error(&self) {
        self.errors_total.inc();
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.inc();
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.inc();
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// Campaign-operations metrics
pub struct OpsMetrics {
    pub campaigns_created: Counter,
    pub campaigns_completed: Counter,
    pub campaigns_cancelled: Counter,
    pub delivery_units_recorded: Counter,
    pub pace_evaluations: Counter,
    pub alerts_evaluated: Counter,
    pub critical_alerts: Gauge,
    pub invoices_created: Counter,
    pub invoices_paid: Counter,
    pub webhook_deliveries: Counter,
    pub webhook_failures: Counter,
}

impl OpsMetrics {
    pub fn new() -> Self {
        Self {
            campaigns_created: METRICS.get_or_create_counter("campaigns_created_total"),
            campaigns_completed: METRICS.get_or_create_counter("campaigns_completed_total"),
            campaigns_cancelled: METRICS.get_or_create_counter("campaigns_cancelled_total"),
            delivery_units_recorded: METRICS.get_or_create_counter("delivery_units_recorded_total"),
            pace_evaluations: METRICS.get_or_create_counter("pace_evaluations_total"),
            alerts_evaluated: METRICS.get_or_create_counter("alerts_evaluated_total"),
            critical_alerts: METRICS.get_or_create_gauge("critical_alerts_current"),
            invoices_created: METRICS.get_or_create_counter("invoices_created_total"),
            invoices_paid: METRICS.get_or_create_counter("invoices_paid_total"),
            webhook_deliveries: METRICS.get_or_create_counter("webhook_deliveries_total"),
            webhook_failures: METRICS.get_or_create_counter("webhook_failures_total"),
        }
    }

    pub fn record_campaign_created(&self) {
        self.campaigns_created.inc();
    }

    pub fn record_campaign_completed(&self) {
        self.campaigns_completed.inc();
    }

    pub fn record_campaign_cancelled(&self) {
        self.campaigns_cancelled.inc();
    }

    pub fn record_delivery(&self, units: u64) {
        self.delivery_units_recorded.inc_by(units);
    }

    pub fn record_pace_evaluation(&self) {
        self.pace_evaluations.inc();
    }

    pub fn record_alert_evaluation(&self, critical_count: u64) {
        self.alerts_evaluated.inc();
        self.critical_alerts.set(critical_count as f64);
    }

    pub fn record_invoice_created(&self) {
        self.invoices_created.inc();
    }

    pub fn record_invoice_paid(&self) {
        self.invoices_paid.inc();
    }

    pub fn record_webhook_delivery(&self) {
        self.webhook_deliveries.inc();
    }

    pub fn record_webhook_failure(&self) {
        self.webhook_failures.inc();
    }
}

impl Default for OpsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// HTTP endpoint handler for metrics
pub async fn metrics_handler() -> Result<String, MetricsError> {
    METRICS.export_metrics().await
}

pub async fn metrics_json_handler() -> Result<serde_json::Value, MetricsError> {
    METRICS.export_metrics_json().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_accumulates() {
        let counter = Counter::new();
        counter.inc();
        counter.inc_by(4);
        assert_eq!(counter.get(), 5);
    }

    #[test]
    fn gauge_sets_and_moves() {
        let gauge = Gauge::new();
        gauge.set(10.0);
        gauge.inc();
        gauge.dec();
        assert_eq!(gauge.get(), 10.0);
    }

    #[test]
    fn histogram_tracks_count_and_sum() {
        let histogram = Histogram::new();
        histogram.observe(2.0);
        histogram.observe(3.0);
        assert_eq!(histogram.get_count(), 2);
        assert_eq!(histogram.get_sum(), 5.0);
    }

    #[tokio::test]
    async fn export_includes_registered_metrics() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("delivery_units_recorded_total").inc_by(250);
        registry.get_or_create_gauge("critical_alerts_current").set(3.0);

        let text = registry.export_metrics().await.unwrap();
        assert!(text.contains("# TYPE delivery_units_recorded_total counter"));
        assert!(text.contains("delivery_units_recorded_total 250"));
        assert!(text.contains("critical_alerts_current 3"));

        let json = registry.export_metrics_json().await.unwrap();
        assert_eq!(json["counters"]["delivery_units_recorded_total"], 250);
    }

    #[test]
    fn registry_returns_same_counter_for_same_name() {
        let registry = MetricsRegistry::new();
        registry.get_or_create_counter("pace_evaluations_total").inc();
        registry.get_or_create_counter("pace_evaluations_total").inc();
        assert_eq!(
            registry.get_or_create_counter("pace_evaluations_total").get(),
            2
        );
    }
}
