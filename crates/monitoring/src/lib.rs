//! # GreenFi Monitoring
//!
//! Logging initialisation and Prometheus metrics shared by the GreenFi binaries.
//!
//! ## Available Metrics
//!
//! - `greenfi_http_requests_total{method,route,status}` - API requests served
//! - `greenfi_http_request_duration_seconds{method,route}` - API request latency
//! - `greenfi_mirror_writes_total{kind}` - Accepted mirror writes (`project`, `stake`, `withdrawal`)
//! - `greenfi_milestones_reached_total` - Milestone latches set by the evaluator
//!
//! Recording functions are no-ops until [`init_monitoring`] has run, so library code
//! can call them unconditionally.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use monitoring::{init_logging, init_monitoring};
//!
//! fn main() -> anyhow::Result<()> {
//!     // keep the guard alive for the whole process
//!     let _guard = init_logging()?;
//!     init_monitoring()?;
//!     Ok(())
//! }
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{LogDestination, init_logging};
pub use metrics::{
    create_metrics_server, init_monitoring, record_http_request, record_milestone_reached,
    record_mirror_write, start_metrics_server,
};
