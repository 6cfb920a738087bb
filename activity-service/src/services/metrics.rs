use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder. Calling it twice is an error.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| {
            AppError::InternalError(anyhow::anyhow!(
                "Failed to install Prometheus recorder: {}",
                e
            ))
        })?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| {
            AppError::InternalError(anyhow::anyhow!("Metrics handle already initialized"))
        })?;

    describe();
    Ok(())
}

fn describe() {
    metrics::describe_counter!(
        "auth_gate_rejections_total",
        "Requests rejected by the auth gate, by reason"
    );
    metrics::describe_counter!("login_attempts_total", "Login attempts by outcome");
    metrics::describe_counter!("activities_created_total", "Activities created");
    metrics::describe_histogram!(
        "db_query_duration_seconds",
        metrics::Unit::Seconds,
        "PostgreSQL query latency by query"
    );
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}
