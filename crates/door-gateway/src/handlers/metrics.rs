//! Prometheus metrics endpoint handler.
//!
//! Served on the separate metrics listener, never under the service prefix.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
///
/// Returns Prometheus text format:
/// ```text
/// # TYPE door_requests_total counter
/// door_requests_total{service_name="dooraccess",version="v1",data_type="test",method="Check"} 3
/// ```
#[tracing::instrument(skip_all, name = "door.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
