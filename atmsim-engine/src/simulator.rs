//! Wires the registry, resource table, scheduler and dispatcher together
//! from an [`AtmSimConfig`].

use std::sync::Arc;

use tracing::info;

use atmsim_config::{AtmSimConfig, DispatchMode};
use atmsim_core::prelude::*;
use atmsim_telemetry::MetricsRecorder;

use crate::error::EngineError;
use crate::manager::AtmConfigManager;

enum SchedulerHandle {
    Workers(Arc<WorkerScheduler>),
    Manual(Arc<ManualScheduler>),
}

pub struct Simulator {
    config: AtmSimConfig,
    manager: Arc<AtmConfigManager>,
    scheduler: SchedulerHandle,
}

impl Simulator {
    /// Deferred callbacks run on a pool of `scheduler.workers` threads.
    pub fn new(config: AtmSimConfig) -> Result<Self, EngineError> {
        config.check()?;
        let workers =
            WorkerScheduler::new(config.scheduler.workers, config.scheduler.priority_levels)?;
        Self::build(config, SchedulerHandle::Workers(Arc::new(workers)))
    }

    /// Deferred callbacks wait until [`Simulator::flush`] runs them on the
    /// calling thread.
    pub fn with_manual_scheduler(config: AtmSimConfig) -> Result<Self, EngineError> {
        config.check()?;
        Self::build(
            config,
            SchedulerHandle::Manual(Arc::new(ManualScheduler::new())),
        )
    }

    fn build(config: AtmSimConfig, scheduler: SchedulerHandle) -> Result<Self, EngineError> {
        let registry = Arc::new(CallbackRegistry::new(config.registry.max_callbacks));
        let table = Arc::new(ResourceTable::new());

        let deferred: Arc<dyn DeferredScheduler> = match &scheduler {
            SchedulerHandle::Workers(s) => s.clone(),
            SchedulerHandle::Manual(s) => s.clone(),
        };
        let mode = match config.dispatch.mode {
            DispatchMode::Immediate => DeliveryMode::Immediate,
            DispatchMode::Deferred => DeliveryMode::Deferred,
        };
        let dispatcher = CallbackDispatcher::new(registry.clone(), deferred)
            .with_mode(mode)
            .with_priority(config.dispatch.priority);

        let mut manager = AtmConfigManager::new(registry, table, Arc::new(dispatcher));
        if config.telemetry.metrics_enabled {
            manager = manager.with_metrics(MetricsRecorder::new()?);
        }

        info!(
            max_callbacks = config.registry.max_callbacks,
            ?mode,
            "Configuration manager ready"
        );
        Ok(Self {
            config,
            manager: Arc::new(manager),
            scheduler,
        })
    }

    pub fn config(&self) -> &AtmSimConfig {
        &self.config
    }

    pub fn manager(&self) -> &Arc<AtmConfigManager> {
        &self.manager
    }

    /// Returns once every deferred callback queued so far has run, with the
    /// number of callbacks that ran. A manual scheduler runs them here on the
    /// calling thread. A worker pool is waited on until its queues drain, and
    /// the count covers everything it ran since the previous flush.
    pub fn flush(&self) -> usize {
        match &self.scheduler {
            SchedulerHandle::Manual(s) => s.run_pending(),
            SchedulerHandle::Workers(s) => s.wait_idle(),
        }
    }

    /// Stops the worker pool after it has drained its queues.
    pub fn shutdown(&self) {
        if let SchedulerHandle::Workers(s) = &self.scheduler {
            s.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::Request;
    use parking_lot::Mutex;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn config_drives_wiring() {
        let mut config = AtmSimConfig::default();
        config.registry.max_callbacks = 2;
        config.dispatch.mode = DispatchMode::Deferred;
        config.telemetry.metrics_enabled = false;

        let sim = Simulator::with_manual_scheduler(config).unwrap();
        let manager = sim.manager();
        assert_eq!(manager.registry().capacity(), 2);
        assert_eq!(manager.dispatcher().mode(), DeliveryMode::Deferred);
        assert!(manager.metrics().is_none());
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = AtmSimConfig::default();
        config.dispatch.priority = 200;
        assert!(matches!(
            Simulator::with_manual_scheduler(config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn flush_runs_deferred_callbacks() {
        let mut config = AtmSimConfig::default();
        config.dispatch.mode = DispatchMode::Deferred;
        let sim = Simulator::with_manual_scheduler(config).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handle = sim
            .manager()
            .register(
                UserContext(1),
                Some(Callback::new(move |_, corr, _| sink.lock().push(corr))),
            )
            .unwrap()
            .handle();
        sim.manager()
            .set_interfaces(
                &Request::new(handle, 11, ErrorReporting::ReportAll),
                &[IfConfig::new(1, IfType::Uni)],
            )
            .unwrap();

        assert!(seen.lock().is_empty());
        assert_eq!(sim.flush(), 1);
        assert_eq!(*seen.lock(), vec![11]);
    }

    #[test]
    fn worker_pool_delivers_off_thread() {
        let mut config = AtmSimConfig::default();
        config.dispatch.mode = DispatchMode::Deferred;
        config.scheduler.workers = 2;
        let sim = Simulator::new(config).unwrap();

        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let handle = sim
            .manager()
            .register(
                UserContext(1),
                Some(Callback::new(move |_, corr, _| {
                    let _ = tx.lock().send((corr, std::thread::current().id()));
                })),
            )
            .unwrap()
            .handle();
        sim.manager()
            .set_interfaces(
                &Request::new(handle, 3, ErrorReporting::ReportAll),
                &[IfConfig::new(1, IfType::Uni)],
            )
            .unwrap();

        let (corr, thread) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(corr, 3);
        assert_ne!(thread, std::thread::current().id());
        assert_eq!(sim.flush(), 1);
        assert_eq!(sim.flush(), 0);
        sim.shutdown();
    }

    #[test]
    fn flush_waits_for_worker_pool() {
        let mut config = AtmSimConfig::default();
        config.dispatch.mode = DispatchMode::Deferred;
        config.scheduler.workers = 2;
        let sim = Simulator::new(config).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handle = sim
            .manager()
            .register(
                UserContext(1),
                Some(Callback::new(move |_, corr, _| {
                    std::thread::sleep(Duration::from_millis(10));
                    sink.lock().push(corr);
                })),
            )
            .unwrap()
            .handle();
        for corr in 1..=4 {
            sim.manager()
                .set_interfaces(
                    &Request::new(handle, corr, ErrorReporting::ReportAll),
                    &[IfConfig::new(corr as u32, IfType::Uni)],
                )
                .unwrap();
        }

        assert_eq!(sim.flush(), 4);
        let mut seen = seen.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }
}
