//! ## atmsim-engine::manager
//! **Request entry points of the ATM configuration manager**
//!
//! Every batch request goes through the same steps:
//! 1. the handle must name a registered callback (`BadCallbackHandle`)
//! 2. the batch must not be empty (`Unknown`)
//! 3. the resource table applies each entry and fills the response batch
//! 4. the error-reporting policy decides whether the batch is delivered
//!
//! An invalid policy is only noticed in step 4, after the table has been
//! mutated. The request then fails with `Unknown` and nothing is rolled back.
//! Per-entry failures never reach the synchronous return value.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use atmsim_core::prelude::*;
use atmsim_telemetry::MetricsRecorder;

/// Common header of every batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub handle: Handle,
    pub correlator: Correlator,
    /// Raw error-reporting policy; decoded after the table operation.
    pub reporting: u32,
    pub fe_handle: FeHandle,
    pub block_id: BlockId,
}

impl Request {
    pub fn new(handle: Handle, correlator: Correlator, reporting: ErrorReporting) -> Self {
        Self {
            handle,
            correlator,
            reporting: reporting.into(),
            fe_handle: 0,
            block_id: 0,
        }
    }

    pub fn with_raw_reporting(mut self, reporting: u32) -> Self {
        self.reporting = reporting;
        self
    }

    pub fn on_block(mut self, fe_handle: FeHandle, block_id: BlockId) -> Self {
        self.fe_handle = fe_handle;
        self.block_id = block_id;
        self
    }
}

pub struct AtmConfigManager {
    registry: Arc<CallbackRegistry>,
    table: Arc<ResourceTable>,
    dispatcher: Arc<CallbackDispatcher>,
    metrics: Option<MetricsRecorder>,
}

impl AtmConfigManager {
    pub fn new(
        registry: Arc<CallbackRegistry>,
        table: Arc<ResourceTable>,
        dispatcher: Arc<CallbackDispatcher>,
    ) -> Self {
        Self {
            registry,
            table,
            dispatcher,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    pub fn table(&self) -> &Arc<ResourceTable> {
        &self.table
    }

    pub fn dispatcher(&self) -> &Arc<CallbackDispatcher> {
        &self.dispatcher
    }

    pub fn metrics(&self) -> Option<&MetricsRecorder> {
        self.metrics.as_ref()
    }

    /// Registers a completion callback. A pair that is already registered
    /// yields [`Registration::Existing`] with the handle it already has.
    #[instrument(level = "debug", skip(self, function))]
    pub fn register(
        &self,
        context: UserContext,
        function: Option<Callback>,
    ) -> Result<Registration, NpfError> {
        const OP: &str = "register";
        let Some(function) = function else {
            warn!(?context, "Register called without a callback function");
            return self.reject(OP, NpfError::BadCallbackFunction);
        };
        match self.registry.register(context, function) {
            Ok(registration) => {
                self.record(|m| m.record_request(OP));
                Ok(registration)
            }
            Err(e) => self.reject(OP, e),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn deregister(&self, handle: Handle) -> Result<(), NpfError> {
        const OP: &str = "deregister";
        match self.registry.deregister(handle) {
            Ok(()) => {
                self.record(|m| m.record_request(OP));
                Ok(())
            }
            Err(e) => self.reject(OP, e),
        }
    }

    #[instrument(
        level = "debug",
        skip(self, request, entries),
        fields(handle = %request.handle, correlator = request.correlator, entries = entries.len())
    )]
    pub fn set_interfaces(&self, request: &Request, entries: &[IfConfig]) -> Result<(), NpfError> {
        const OP: &str = "set_interfaces";
        self.admit(OP, request, entries.len())?;

        let mut batch = ResponseBatch::with_capacity(RequestKind::IfSet, entries.len());
        self.table.set_interfaces(entries, &mut batch);
        self.complete(OP, request, batch)
    }

    /// Cascading deletion is not implemented: `delete_contained` set to true
    /// fails the whole request with `FeatureNotSupported`.
    #[instrument(
        level = "debug",
        skip(self, request, ids),
        fields(handle = %request.handle, correlator = request.correlator, entries = ids.len())
    )]
    pub fn delete_interfaces(
        &self,
        request: &Request,
        delete_contained: bool,
        ids: &[IfId],
    ) -> Result<(), NpfError> {
        const OP: &str = "delete_interfaces";
        self.admit(OP, request, ids.len())?;
        if delete_contained {
            warn!("Cascading interface deletion requested");
            return self.reject(OP, NpfError::FeatureNotSupported);
        }

        let mut batch = ResponseBatch::with_capacity(RequestKind::IfDelete, ids.len());
        self.table.delete_interfaces(ids, &mut batch);
        self.complete(OP, request, batch)
    }

    #[instrument(
        level = "debug",
        skip(self, request, entries),
        fields(handle = %request.handle, correlator = request.correlator, entries = entries.len())
    )]
    pub fn set_vcs(&self, request: &Request, entries: &[VcConfig]) -> Result<(), NpfError> {
        const OP: &str = "set_vcs";
        self.admit(OP, request, entries.len())?;

        let mut batch = ResponseBatch::with_capacity(RequestKind::VcSet, entries.len());
        self.table.set_vcs(entries, &mut batch);
        self.complete(OP, request, batch)
    }

    #[instrument(
        level = "debug",
        skip(self, request, entries),
        fields(handle = %request.handle, correlator = request.correlator, entries = entries.len())
    )]
    pub fn set_cross_connects(
        &self,
        request: &Request,
        entries: &[XcConfig],
    ) -> Result<(), NpfError> {
        const OP: &str = "set_cross_connects";
        self.admit(OP, request, entries.len())?;

        let mut batch = ResponseBatch::with_capacity(RequestKind::VcLinkXcSet, entries.len());
        self.table.set_cross_connects(entries, &mut batch);
        self.complete(OP, request, batch)
    }

    /// Every later callback goes through the deferred scheduler.
    pub fn set_deferred_mode(&self) {
        self.dispatcher.set_deferred_mode();
    }

    fn admit(&self, operation: &'static str, request: &Request, count: usize) -> Result<(), NpfError> {
        if self.registry.lookup(request.handle).is_none() {
            warn!(operation, handle = %request.handle, "Request with unregistered callback handle");
            return self.reject(operation, NpfError::BadCallbackHandle);
        }
        if count == 0 {
            warn!(operation, "Request without entries");
            return self.reject(operation, NpfError::Unknown);
        }
        debug!(
            operation,
            fe_handle = request.fe_handle,
            block_id = request.block_id,
            "Request admitted"
        );
        Ok(())
    }

    fn complete(
        &self,
        operation: &'static str,
        request: &Request,
        batch: ResponseBatch,
    ) -> Result<(), NpfError> {
        let failures = batch.failures().count();
        self.record(|m| {
            m.record_request(operation);
            m.record_entry_failures(operation, failures);
        });

        let policy = match ErrorReporting::try_from(request.reporting) {
            Ok(policy) => policy,
            Err(e) => {
                warn!(
                    operation,
                    reporting = request.reporting,
                    "Invalid error reporting policy, changes kept without callback"
                );
                return self.reject(operation, e);
            }
        };

        if policy.should_dispatch(batch.all_ok()) {
            self.record(|m| m.record_dispatch());
            self.dispatcher
                .deliver(request.handle, request.correlator, batch);
        } else {
            debug!(operation, ?policy, failures, "Response batch suppressed");
        }
        if failures > 0 {
            info!(operation, failures, "Request completed with entry failures");
        }
        Ok(())
    }

    fn reject<T>(&self, operation: &'static str, error: NpfError) -> Result<T, NpfError> {
        self.record(|m| m.record_rejection(operation));
        Err(error)
    }

    #[inline]
    fn record(&self, f: impl FnOnce(&MetricsRecorder)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}
