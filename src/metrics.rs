use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Instant;

use crate::error::ErrorKind;

lazy_static! {
    // Batch request metrics
    pub static ref REQUEST_COUNTER: IntCounter = register_int_counter!(
        "datasource_requests_total",
        "Total number of batch query requests received"
    ).unwrap();

    pub static ref REQUEST_FAILURES: IntCounterVec = register_int_counter_vec!(
        "datasource_request_failures_total",
        "Total number of failed batch query requests",
        &["kind"]
    ).unwrap();

    pub static ref REQUEST_DURATION: Histogram = register_histogram!(
        "datasource_request_duration_seconds",
        "Batch query duration in seconds",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]
    ).unwrap();

    // Per-panel query metrics
    pub static ref QUERY_COUNTER: IntCounter = register_int_counter!(
        "datasource_queries_total",
        "Total number of panel queries converted"
    ).unwrap();

    // Remote metrics
    pub static ref REMOTE_DURATION: Histogram = register_histogram!(
        "datasource_remote_duration_seconds",
        "KairosDB round trip time in seconds",
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]
    ).unwrap();
}

/// Forces registration so every series shows up on the first scrape.
pub fn init_metrics() {
    lazy_static::initialize(&REQUEST_COUNTER);
    lazy_static::initialize(&REQUEST_FAILURES);
    lazy_static::initialize(&REQUEST_DURATION);
    lazy_static::initialize(&QUERY_COUNTER);
    lazy_static::initialize(&REMOTE_DURATION);
}

pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    pub fn new() -> Self {
        REQUEST_COUNTER.inc();
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for RequestTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        REQUEST_DURATION.observe(duration);
    }
}

pub fn record_failure(kind: ErrorKind) {
    let label = match kind {
        ErrorKind::InvalidArgument => "invalid_argument",
        ErrorKind::Remote => "remote",
        ErrorKind::Timeout => "timeout",
        ErrorKind::Canceled => "canceled",
        ErrorKind::Internal => "internal",
    };
    REQUEST_FAILURES.with_label_values(&[label]).inc();
}

pub fn record_queries(count: usize) {
    QUERY_COUNTER.inc_by(count as u64);
}

pub fn record_remote_duration(duration: f64) {
    REMOTE_DURATION.observe(duration);
}

/// Renders the default registry in Prometheus text exposition format.
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
