//! Metrics collection and Prometheus export.

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder.
///
/// Call once at startup, before any metrics are recorded. Later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_prediction(health_status: &'static str) {
    counter!("predictions_total", "health_status" => health_status).increment(1);
}

pub fn record_prediction_error(kind: &'static str) {
    counter!("prediction_errors_total", "kind" => kind).increment(1);
}

pub fn record_model_load(outcome: &'static str) {
    counter!("model_loads_total", "outcome" => outcome).increment(1);
}
