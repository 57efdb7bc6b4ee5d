use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::scheduler::{DeferredScheduler, Priority};
use crate::registry::{CallbackEntry, CallbackRegistry};
use crate::types::{Correlator, Handle, ResponseBatch};

/// Priority given to deferred callbacks unless configured otherwise.
pub const DEFAULT_PRIORITY: Priority = 1;

/// Process-wide delivery mode. The only transition is
/// `Immediate` -> `Deferred`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    #[default]
    Immediate,
    Deferred,
}

/// One pending callback: a copy of the registered entry plus the data of a
/// single request. Owns the batch and drops it once the callback returns.
struct Invocation {
    entry: CallbackEntry,
    correlator: Correlator,
    batch: ResponseBatch,
}

impl Invocation {
    fn fire(self) {
        debug!(correlator = self.correlator, kind = ?self.batch.kind(), "Firing callback");
        self.entry
            .function
            .call(self.entry.context, self.correlator, &self.batch);
    }
}

pub struct CallbackDispatcher {
    registry: Arc<CallbackRegistry>,
    scheduler: Arc<dyn DeferredScheduler>,
    deferred: AtomicBool,
    priority: Priority,
}

impl CallbackDispatcher {
    pub fn new(registry: Arc<CallbackRegistry>, scheduler: Arc<dyn DeferredScheduler>) -> Self {
        Self {
            registry,
            scheduler,
            deferred: AtomicBool::new(false),
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_mode(self, mode: DeliveryMode) -> Self {
        self.deferred
            .store(mode == DeliveryMode::Deferred, Ordering::Release);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn mode(&self) -> DeliveryMode {
        if self.deferred.load(Ordering::Acquire) {
            DeliveryMode::Deferred
        } else {
            DeliveryMode::Immediate
        }
    }

    /// Switches to deferred delivery for every later dispatch. There is no
    /// way back to immediate delivery.
    pub fn set_deferred_mode(&self) {
        if !self.deferred.swap(true, Ordering::AcqRel) {
            info!("Callback delivery switched to deferred mode");
        }
    }

    /// Delivers `batch` to the callback registered under `handle`. A handle
    /// with no registration is silently ignored.
    pub fn deliver(&self, handle: Handle, correlator: Correlator, batch: ResponseBatch) {
        let Some(entry) = self.registry.lookup(handle) else {
            debug!(%handle, correlator, "No callback registered, dropping response batch");
            return;
        };
        let invocation = Invocation {
            entry,
            correlator,
            batch,
        };

        match self.mode() {
            DeliveryMode::Immediate => invocation.fire(),
            DeliveryMode::Deferred => {
                if let Err(e) = self
                    .scheduler
                    .schedule(Box::new(move || invocation.fire()), self.priority)
                {
                    warn!(%handle, correlator, error = %e, "Failed to schedule callback");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{ManualScheduler, WorkerScheduler};
    use crate::error::NpfError;
    use crate::registry::Callback;
    use crate::types::{ObjectId, RequestKind, UserContext};
    use parking_lot::Mutex;
    use std::thread::{self, ThreadId};
    use tracing_test::traced_test;

    type Seen = Arc<Mutex<Vec<(UserContext, Correlator, ResponseBatch, ThreadId)>>>;

    fn recorder() -> (Callback, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback = Callback::new(move |ctx, corr, batch| {
            sink.lock()
                .push((ctx, corr, batch.clone(), thread::current().id()));
        });
        (callback, seen)
    }

    fn batch() -> ResponseBatch {
        let mut batch = ResponseBatch::with_capacity(RequestKind::IfSet, 1);
        batch.push(ObjectId::Interface(4), Err(NpfError::ResourceExists));
        batch
    }

    fn setup() -> (Arc<CallbackRegistry>, Arc<ManualScheduler>) {
        (
            Arc::new(CallbackRegistry::default()),
            Arc::new(ManualScheduler::new()),
        )
    }

    #[test]
    fn immediate_delivery_runs_on_caller_thread() {
        let (registry, scheduler) = setup();
        let (callback, seen) = recorder();
        let handle = registry
            .register(UserContext(77), callback)
            .unwrap()
            .handle();
        let dispatcher = CallbackDispatcher::new(registry, scheduler.clone());

        dispatcher.deliver(handle, 5, batch());

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, UserContext(77));
        assert_eq!(seen[0].1, 5);
        assert_eq!(seen[0].2, batch());
        assert_eq!(seen[0].3, thread::current().id());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn deferred_delivery_waits_for_scheduler() {
        let (registry, scheduler) = setup();
        let (callback, seen) = recorder();
        let handle = registry.register(UserContext(1), callback).unwrap().handle();
        let dispatcher = CallbackDispatcher::new(registry, scheduler.clone());

        assert_eq!(dispatcher.mode(), DeliveryMode::Immediate);
        dispatcher.set_deferred_mode();
        dispatcher.set_deferred_mode();
        assert_eq!(dispatcher.mode(), DeliveryMode::Deferred);

        dispatcher.deliver(handle, 1, batch());
        dispatcher.deliver(handle, 2, batch());
        assert!(seen.lock().is_empty());

        assert_eq!(scheduler.run_pending(), 2);
        let correlators: Vec<_> = seen.lock().iter().map(|s| s.1).collect();
        assert_eq!(correlators, vec![1, 2]);
    }

    #[test]
    fn unknown_handle_is_a_no_op() {
        let (registry, scheduler) = setup();
        let dispatcher =
            CallbackDispatcher::new(registry, scheduler.clone()).with_mode(DeliveryMode::Deferred);
        dispatcher.deliver(Handle(3), 1, batch());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn in_flight_invocation_survives_deregistration() {
        let (registry, scheduler) = setup();
        let (callback, seen) = recorder();
        let handle = registry.register(UserContext(1), callback).unwrap().handle();
        let dispatcher = CallbackDispatcher::new(registry.clone(), scheduler.clone())
            .with_mode(DeliveryMode::Deferred);

        dispatcher.deliver(handle, 9, batch());
        registry.deregister(handle).unwrap();
        scheduler.run_pending();

        assert_eq!(seen.lock().len(), 1);
    }

    #[traced_test]
    #[test]
    fn scheduling_failure_is_logged() {
        let registry = Arc::new(CallbackRegistry::default());
        let scheduler = Arc::new(WorkerScheduler::new(1, 1).unwrap());
        let (callback, seen) = recorder();
        let handle = registry.register(UserContext(1), callback).unwrap().handle();
        let dispatcher = CallbackDispatcher::new(registry, scheduler.clone())
            .with_mode(DeliveryMode::Deferred);

        scheduler.shutdown();
        dispatcher.deliver(handle, 1, batch());

        assert!(seen.lock().is_empty());
        assert!(logs_contain("Failed to schedule callback"));
    }
}
