//! # atmsim Telemetry
//!
//! Log subscriber setup and Prometheus counters for the configuration manager.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::MetricsRecorder;
