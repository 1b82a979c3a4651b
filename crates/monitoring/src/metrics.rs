//! Prometheus metrics for the GreenFi API and mirror
//!
//! Metrics live in the default registry and are exposed by a small axum server
//! separate from the public API listener.

use anyhow::{Result, anyhow};
use axum::http::{StatusCode, header};
use axum::{Router, response::Response, routing::get};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, register_histogram_vec,
    register_int_counter, register_int_counter_vec,
};
use std::net::SocketAddr;
use std::sync::{Mutex, OnceLock};
use tracing::info;

static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
static HTTP_REQUEST_DURATION: OnceLock<HistogramVec> = OnceLock::new();
static MIRROR_WRITES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
static MILESTONES_REACHED_TOTAL: OnceLock<IntCounter> = OnceLock::new();

static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Register all metrics. Calling it again is a no-op.
pub fn init_monitoring() -> Result<()> {
    let _lock = INIT_LOCK
        .lock()
        .map_err(|_| anyhow!("Metrics initialization lock poisoned"))?;
    if HTTP_REQUESTS_TOTAL.get().is_some() {
        return Ok(());
    }

    HTTP_REQUESTS_TOTAL
        .set(register_int_counter_vec!(
            "greenfi_http_requests_total",
            "Total number of API requests",
            &["method", "route", "status"]
        )?)
        .map_err(|_| anyhow!("Failed to register HTTP_REQUESTS_TOTAL"))?;

    HTTP_REQUEST_DURATION
        .set(register_histogram_vec!(
            HistogramOpts::new(
                "greenfi_http_request_duration_seconds",
                "Duration of API requests"
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0]),
            &["method", "route"]
        )?)
        .map_err(|_| anyhow!("Failed to register HTTP_REQUEST_DURATION"))?;

    MIRROR_WRITES_TOTAL
        .set(register_int_counter_vec!(
            "greenfi_mirror_writes_total",
            "Accepted mirror writes by record kind",
            &["kind"]
        )?)
        .map_err(|_| anyhow!("Failed to register MIRROR_WRITES_TOTAL"))?;

    MILESTONES_REACHED_TOTAL
        .set(register_int_counter!(
            "greenfi_milestones_reached_total",
            "Projects whose milestone latch was set"
        )?)
        .map_err(|_| anyhow!("Failed to register MILESTONES_REACHED_TOTAL"))?;

    info!("📊 Monitoring system initialized");
    Ok(())
}

/// Record one served API request
pub fn record_http_request(method: &str, route: &str, status: u16, duration_seconds: f64) {
    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        let status = status.to_string();
        counter
            .with_label_values(&[method, route, status.as_str()])
            .inc();
    }
    if let Some(histogram) = HTTP_REQUEST_DURATION.get() {
        histogram
            .with_label_values(&[method, route])
            .observe(duration_seconds);
    }
}

/// Record an accepted write; `kind` is `project`, `stake` or `withdrawal`
pub fn record_mirror_write(kind: &str) {
    if let Some(counter) = MIRROR_WRITES_TOTAL.get() {
        counter.with_label_values(&[kind]).inc();
    }
}

pub fn record_milestone_reached() {
    if let Some(counter) = MILESTONES_REACHED_TOTAL.get() {
        counter.inc();
    }
}

/// Router exposing `/metrics`
pub fn create_metrics_server() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve metrics until the task is dropped
pub async fn start_metrics_server(addr: SocketAddr) -> Result<()> {
    let app = create_metrics_server();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("📊 Started metrics server on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Result<Response<String>, StatusCode> {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();

    let metrics = encoder
        .encode_to_string(&metric_families)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(metrics)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
