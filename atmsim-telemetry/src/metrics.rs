//! ## atmsim-telemetry::metrics
//! **Prometheus counters for manager requests**
//!
//! Every counter is labelled by operation name (`set_interfaces`,
//! `register`, ...) except the callback counter.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub requests: IntCounterVec,
    pub rejections: IntCounterVec,
    pub entry_failures: IntCounterVec,
    pub callbacks_dispatched: IntCounter,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            Opts::new("atmsim_requests_total", "Requests received by operation"),
            &["operation"],
        )?;
        let rejections = IntCounterVec::new(
            Opts::new(
                "atmsim_request_rejections_total",
                "Requests rejected with a synchronous error",
            ),
            &["operation"],
        )?;
        let entry_failures = IntCounterVec::new(
            Opts::new(
                "atmsim_entry_failures_total",
                "Batch entries that completed with an error",
            ),
            &["operation"],
        )?;
        let callbacks_dispatched = IntCounter::new(
            "atmsim_callbacks_dispatched_total",
            "Response batches handed to the callback dispatcher",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(rejections.clone()))?;
        registry.register(Box::new(entry_failures.clone()))?;
        registry.register(Box::new(callbacks_dispatched.clone()))?;

        Ok(Self {
            registry,
            requests,
            rejections,
            entry_failures,
            callbacks_dispatched,
        })
    }

    pub fn record_request(&self, operation: &str) {
        self.requests.with_label_values(&[operation]).inc();
    }

    pub fn record_rejection(&self, operation: &str) {
        self.rejections.with_label_values(&[operation]).inc();
    }

    pub fn record_entry_failures(&self, operation: &str, count: usize) {
        if count > 0 {
            self.entry_failures
                .with_label_values(&[operation])
                .inc_by(count as u64);
        }
    }

    pub fn record_dispatch(&self) {
        self.callbacks_dispatched.inc();
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
