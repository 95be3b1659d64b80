use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Global metrics instance.
pub static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Metrics collector for the ledger engine.
#[derive(Debug, Clone)]
pub struct Metrics {
    initialized: bool,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self { initialized: true }
    }

    pub fn record_transaction_created(&self, transaction_type: &str) {
        counter!("ledger_transactions_total", "type" => transaction_type.to_string()).increment(1);
    }

    pub fn record_transaction_completed(&self, transaction_type: &str) {
        counter!("ledger_transactions_completed_total", "type" => transaction_type.to_string())
            .increment(1);
    }

    pub fn record_transaction_failed(&self, transaction_type: &str, reason: &str) {
        counter!(
            "ledger_transactions_failed_total",
            "type" => transaction_type.to_string(),
            "reason" => reason.to_string()
        )
        .increment(1);
    }

    pub fn record_processor_latency(&self, duration_ms: f64) {
        histogram!("ledger_processor_duration_ms").record(duration_ms);
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_ms: f64) {
        counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "path" => path.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
        histogram!("http_request_duration_ms", "method" => method.to_string(), "path" => path.to_string())
            .record(duration_ms);
    }

    pub fn record_db_query(&self, query_type: &str, duration_ms: f64, success: bool) {
        counter!(
            "db_queries_total",
            "type" => query_type.to_string(),
            "success" => success.to_string()
        )
        .increment(1);
        histogram!("db_query_duration_ms", "type" => query_type.to_string()).record(duration_ms);
    }
}

/// Timer for measuring operation latency.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for LatencyTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Initializes the metrics system and returns the Prometheus handle.
pub fn init_metrics() -> PrometheusHandle {
    let handle = METRICS_HANDLE.get_or_init(|| {
        let builder = PrometheusBuilder::new();
        let handle = builder.install_recorder().expect("Failed to install Prometheus recorder");

        describe_metrics();
        handle
    });

    METRICS.get_or_init(Metrics::new);

    handle.clone()
}

fn describe_metrics() {
    describe_counter!("ledger_transactions_total", Unit::Count, "Total number of transactions received");
    describe_counter!(
        "ledger_transactions_completed_total",
        Unit::Count,
        "Total number of transactions committed"
    );
    describe_counter!(
        "ledger_transactions_failed_total",
        Unit::Count,
        "Total number of failed transactions"
    );
    describe_histogram!(
        "ledger_processor_duration_ms",
        Unit::Milliseconds,
        "Transaction processor latency in milliseconds"
    );
    describe_counter!("http_requests_total", Unit::Count, "Total HTTP requests");
    describe_histogram!("http_request_duration_ms", Unit::Milliseconds, "HTTP request latency in milliseconds");
    describe_counter!("db_queries_total", Unit::Count, "Total database queries");
    describe_histogram!("db_query_duration_ms", Unit::Milliseconds, "Database query latency in milliseconds");
}

/// Returns the global metrics instance.
pub fn get_metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}
