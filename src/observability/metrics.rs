//! Metrics collection.
//!
//! # Metrics
//! - `http_client_requests_total` (counter): executions by method and outcome
//! - `http_client_request_duration_seconds` (histogram): wall time per execution
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding application
//!   installs whichever exporter it wants, without one these are no-ops
//! - Outcome label is the status code, or the error kind for failures

use std::time::Instant;

use crate::error::RequestError;

/// Record one finished execution.
pub fn record_request(method: &str, outcome: &str, start: Instant) {
    metrics::counter!(
        "http_client_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "http_client_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Outcome label for a result.
pub fn outcome<T>(result: &Result<T, RequestError>, status: impl Fn(&T) -> u16) -> String {
    match result {
        Ok(value) => status(value).to_string(),
        Err(e) => e.kind().as_str().to_string(),
    }
}
