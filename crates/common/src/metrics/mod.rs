//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all DocRank metrics
pub const METRICS_PREFIX: &str = "docrank";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Target: 100 candidates reranked in under 10ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.0005, // 0.5ms
    0.001,  // 1ms
    0.0025, // 2.5ms
    0.005,  // 5ms
    0.010,  // 10ms - rerank target
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
];

/// Buckets for individual pipeline stages (sub-millisecond resolution)
pub const STAGE_BUCKETS: &[f64] = &[
    0.00001, // 10us
    0.00005, // 50us
    0.0001,  // 100us
    0.00025, // 250us
    0.0005,  // 500us
    0.001,   // 1ms
    0.0025,  // 2.5ms
    0.005,   // 5ms
    0.010,   // 10ms
];

/// Fully qualified metric name
pub fn metric_name(suffix: &str) -> String {
    format!("{}_{}", METRICS_PREFIX, suffix)
}

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        metric_name("requests_total"),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        metric_name("request_duration_seconds"),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Rerank pipeline metrics
    describe_histogram!(
        metric_name("rerank_stage_duration_seconds"),
        Unit::Seconds,
        "Latency of a single rerank pipeline stage in seconds"
    );

    describe_counter!(
        metric_name("rerank_candidates_received_total"),
        Unit::Count,
        "Candidates received for reranking"
    );

    describe_counter!(
        metric_name("rerank_results_returned_total"),
        Unit::Count,
        "Ranked results returned to callers"
    );

    describe_counter!(
        metric_name("rerank_quality_rejections_total"),
        Unit::Count,
        "Candidates dropped by the quality filter, by rule"
    );

    describe_counter!(
        metric_name("rerank_below_threshold_total"),
        Unit::Count,
        "Candidates dropped by the similarity floor"
    );

    describe_counter!(
        metric_name("rerank_duplicates_removed_total"),
        Unit::Count,
        "Near-duplicate candidates collapsed into a cluster representative"
    );

    describe_counter!(
        metric_name("rerank_errors_total"),
        Unit::Count,
        "Rerank requests that failed, by error code"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            metric_name("requests_total"),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            metric_name("request_duration_seconds"),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record how long one pipeline stage took
pub fn record_stage(stage: &'static str, duration_secs: f64) {
    histogram!(
        metric_name("rerank_stage_duration_seconds"),
        "stage" => stage
    )
    .record(duration_secs);
}

/// Record candidate flow through a completed rerank
pub fn record_rerank(received: usize, below_threshold: usize, duplicates: usize, returned: usize) {
    counter!(metric_name("rerank_candidates_received_total")).increment(received as u64);
    counter!(metric_name("rerank_below_threshold_total")).increment(below_threshold as u64);
    counter!(metric_name("rerank_duplicates_removed_total")).increment(duplicates as u64);
    counter!(metric_name("rerank_results_returned_total")).increment(returned as u64);
}

/// Record candidates dropped by one quality rule
pub fn record_quality_rejections(rule: &'static str, count: usize) {
    if count == 0 {
        return;
    }
    counter!(
        metric_name("rerank_quality_rejections_total"),
        "rule" => rule
    )
    .increment(count as u64);
}

/// Record a failed rerank request
pub fn record_rerank_error(code: &'static str) {
    counter!(
        metric_name("rerank_errors_total"),
        "code" => code
    )
    .increment(1);
}
