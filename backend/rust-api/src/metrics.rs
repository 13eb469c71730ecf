use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

use crate::error::RepositoryError;

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Repository Metrics
    pub static ref REPOSITORY_CALLS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "repository_calls_total",
        "Total number of repository adapter calls",
        &["operation", "status"]
    )
    .unwrap();

    pub static ref REPOSITORY_CALL_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "repository_call_duration_seconds",
        "Repository adapter call duration in seconds",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    // Context cache
    pub static ref CONTEXT_CACHE_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "context_cache_lookups_total",
        "User context cache lookups by result",
        &["result"]
    )
    .unwrap();

    // Business Metrics
    pub static ref SESSIONS_ASSEMBLED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sessions_assembled_total",
        "Total number of quiz sessions assembled",
        &["mode", "status"]
    )
    .unwrap();

    pub static ref SESSIONS_UNDERFILLED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sessions_underfilled_total",
        "Sessions shorter than the requested question count",
        &["mode"]
    )
    .unwrap();

    pub static ref ANSWERS_EVALUATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_evaluated_total",
        "Total number of answers evaluated",
        &["correct"]
    )
    .unwrap();

    pub static ref SPECIAL_REWARDS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "special_rewards_total",
        "Special rewards granted by kind",
        &["kind"]
    )
    .unwrap();

    pub static ref ANSWER_PERSISTENCE_FAILURES_TOTAL: IntCounter = register_int_counter!(
        "answer_persistence_failures_total",
        "Answer records that could not be stored after all retries"
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: track a repository call with metrics
pub async fn track_repository_call<F, T>(operation: &str, future: F) -> Result<T, RepositoryError>
where
    F: std::future::Future<Output = Result<T, RepositoryError>>,
{
    let start = std::time::Instant::now();
    let result = future.await;
    let duration = start.elapsed().as_secs_f64();

    let status = if result.is_ok() { "success" } else { "error" };

    REPOSITORY_CALLS_TOTAL
        .with_label_values(&[operation, status])
        .inc();

    REPOSITORY_CALL_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration);

    result
}

/// Record context cache hit
pub fn record_cache_hit() {
    CONTEXT_CACHE_LOOKUPS_TOTAL.with_label_values(&["hit"]).inc();
}

/// Record context cache miss
pub fn record_cache_miss() {
    CONTEXT_CACHE_LOOKUPS_TOTAL.with_label_values(&["miss"]).inc();
}
