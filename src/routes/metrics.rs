//! Prometheus metrics endpoint
//!
//! Exposes Windsurf API call metrics in Prometheus format.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize metrics (call once at startup)
pub fn init_metrics() -> anyhow::Result<()> {
    PROMETHEUS_HANDLE.get_or_try_init(|| PrometheusBuilder::new().install_recorder())?;
    register_metrics();
    Ok(())
}

fn register_metrics() {
    metrics::describe_counter!(
        "throttle_api_requests_total",
        "Total Windsurf API calls by operation and outcome"
    );
    metrics::describe_histogram!(
        "throttle_api_request_duration_seconds",
        "Windsurf API call duration in seconds"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record one Windsurf API call
pub fn record_api_call(operation: &'static str, outcome: &'static str, duration_secs: f64) {
    metrics::counter!(
        "throttle_api_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("throttle_api_request_duration_seconds", "operation" => operation)
        .record(duration_secs);
}
