//! Metrics definitions for the door gateway.
//!
//! All metrics follow Prometheus naming conventions:
//! - `door_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for latency histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: one value per contract operation (at most 4 per layer)
//! - `service_name`, `version`, `data_type`: fixed at startup

use crate::config::Config;
use crate::middleware::{Instrumentation, MetricNames};
use metrics::Label;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Inbound service layer.
pub const SERVICE_METRICS: MetricNames = MetricNames {
    requests: "door_requests_total",
    errors: "door_errors_total",
    latency: "door_request_latency_seconds",
};

/// Users proxy layer.
pub const USERS_PROXY_METRICS: MetricNames = MetricNames {
    requests: "door_users_proxy_requests_total",
    errors: "door_users_proxy_errors_total",
    latency: "door_users_proxy_latency_seconds",
};

/// Events proxy layer.
pub const EVENTS_PROXY_METRICS: MetricNames = MetricNames {
    requests: "door_events_proxy_requests_total",
    errors: "door_events_proxy_errors_total",
    latency: "door_events_proxy_latency_seconds",
};

/// Label tagged with the operation name.
pub const METHOD_LABEL: &str = "method";

/// Initialize the Prometheus recorder and return the handle used to
/// render `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Inbound calls include every downstream round trip and retry.
        .set_buckets_for_metric(
            Matcher::Full(SERVICE_METRICS.latency.to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set service latency buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Suffix("_proxy_latency_seconds".to_string()),
            &[
                0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500,
            ],
        )
        .map_err(|e| format!("Failed to set proxy latency buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Labels attached to every metric recorded by this process.
pub fn const_labels(config: &Config) -> Vec<Label> {
    vec![
        Label::new("service_name", config.service_name.clone()),
        Label::new("version", config.version.clone()),
        Label::new("data_type", config.data_type.clone()),
    ]
}

/// Instrumentation for one decorator layer, tagged by method name.
pub fn instrumentation(names: MetricNames, config: &Config) -> Instrumentation {
    Instrumentation::new(names, &[METHOD_LABEL.to_string()], const_labels(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_metric_names_follow_conventions() {
        for names in [SERVICE_METRICS, USERS_PROXY_METRICS, EVENTS_PROXY_METRICS] {
            assert!(names.requests.starts_with("door_"));
            assert!(names.requests.ends_with("_total"));
            assert!(names.errors.ends_with("_total"));
            assert!(names.latency.ends_with("_seconds"));
        }
    }

    #[test]
    fn test_const_labels_from_config() {
        let vars = HashMap::from([
            ("SERVICE_NAME".to_string(), "frontdoor".to_string()),
            ("SERVICE_VERSION".to_string(), "v2".to_string()),
        ]);
        let config = Config::from_vars(&vars).unwrap();

        let labels: Vec<(String, String)> = const_labels(&config)
            .iter()
            .map(|l| (l.key().to_string(), l.value().to_string()))
            .collect();

        assert_eq!(
            labels,
            vec![
                ("service_name".to_string(), "frontdoor".to_string()),
                ("version".to_string(), "v2".to_string()),
                ("data_type".to_string(), "test".to_string()),
            ]
        );
    }

    #[test]
    fn test_instrumentation_keeps_layer_names() {
        let config = Config::from_vars(&HashMap::new()).unwrap();
        assert_eq!(
            instrumentation(USERS_PROXY_METRICS, &config).names(),
            USERS_PROXY_METRICS
        );
    }
}
