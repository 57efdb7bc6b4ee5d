//! Thread-pool implementation of [`DeferredScheduler`].
//!
//! One unbounded `crossbeam` channel per priority level feeds a fixed set of
//! named worker threads. A worker always takes from the most urgent non-empty
//! level, and only parks (on a `Select` over every level) when all are empty.
//! Queued and running jobs are counted so callers can wait for the pool to
//! go idle.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Receiver, Select, Sender, TryRecvError};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info};

use super::scheduler::{DeferredScheduler, Job, Priority, ScheduleError};

pub struct WorkerScheduler {
    levels: usize,
    senders: Mutex<Option<Vec<Sender<Job>>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    progress: Arc<Progress>,
}

#[derive(Default)]
struct Progress {
    counts: Mutex<JobCounts>,
    idle: Condvar,
}

#[derive(Default)]
struct JobCounts {
    in_flight: usize,
    completed: usize,
}

impl Progress {
    fn started(&self) {
        self.counts.lock().in_flight += 1;
    }

    fn finished(&self) {
        let mut counts = self.counts.lock();
        counts.in_flight -= 1;
        counts.completed += 1;
        if counts.in_flight == 0 {
            self.idle.notify_all();
        }
    }

    fn abandoned(&self) {
        let mut counts = self.counts.lock();
        counts.in_flight -= 1;
        if counts.in_flight == 0 {
            self.idle.notify_all();
        }
    }
}

impl WorkerScheduler {
    pub fn new(workers: usize, levels: usize) -> io::Result<Self> {
        let levels = levels.max(1);
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..levels).map(|_| unbounded()).unzip();
        let progress = Arc::new(Progress::default());

        let handles = (0..workers.max(1))
            .map(|id| {
                let receivers = receivers.clone();
                let progress = progress.clone();
                thread::Builder::new()
                    .name(format!("atmsim-sched-{id}"))
                    .spawn(move || worker_loop(&receivers, &progress))
            })
            .collect::<io::Result<Vec<_>>>()?;

        info!(workers = handles.len(), levels, "Deferred scheduler started");
        Ok(Self {
            levels,
            senders: Mutex::new(Some(senders)),
            workers: Mutex::new(handles),
            progress,
        })
    }

    /// Blocks until every queued job, including jobs scheduled by running
    /// jobs, has finished. Returns how many jobs completed since the previous
    /// call. Must not be called from a job.
    pub fn wait_idle(&self) -> usize {
        let mut counts = self.progress.counts.lock();
        while counts.in_flight > 0 {
            self.progress.idle.wait(&mut counts);
        }
        std::mem::take(&mut counts.completed)
    }

    /// Stops accepting jobs, lets workers drain what is already queued and
    /// joins them. Idempotent.
    pub fn shutdown(&self) {
        let Some(senders) = self.senders.lock().take() else {
            return;
        };
        drop(senders);

        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if worker.join().is_err() {
                error!("Scheduler worker terminated abnormally");
            }
        }
        info!("Deferred scheduler stopped");
    }
}

impl DeferredScheduler for WorkerScheduler {
    fn schedule(&self, job: Job, priority: Priority) -> Result<(), ScheduleError> {
        let level = usize::from(priority).min(self.levels - 1);
        let senders = self.senders.lock();
        let senders = senders.as_ref().ok_or(ScheduleError::ShutDown)?;
        self.progress.started();
        if senders[level].send(job).is_err() {
            self.progress.abandoned();
            return Err(ScheduleError::ShutDown);
        }
        debug!(level, "Job scheduled");
        Ok(())
    }
}

impl Drop for WorkerScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(queues: &[Receiver<Job>], progress: &Progress) {
    loop {
        let mut closed = 0;
        let mut next = None;
        for queue in queues {
            match queue.try_recv() {
                Ok(job) => {
                    next = Some(job);
                    break;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => closed += 1,
            }
        }

        match next {
            Some(job) => {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!("Deferred job panicked");
                }
                progress.finished();
            }
            None if closed == queues.len() => return,
            None => {
                let mut select = Select::new();
                for queue in queues {
                    select.recv(queue);
                }
                select.ready();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    #[test]
    fn runs_jobs_on_worker_threads() {
        let scheduler = WorkerScheduler::new(2, 4).unwrap();
        let (tx, rx) = mpsc::channel();
        for i in 0..16 {
            let tx = tx.clone();
            scheduler
                .schedule(
                    Box::new(move || {
                        let name = thread::current().name().map(str::to_owned);
                        tx.send((i, name)).unwrap();
                    }),
                    (i % 4) as u8,
                )
                .unwrap();
        }

        let mut seen: Vec<_> = (0..16)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort_by_key(|(i, _)| *i);
        assert_eq!(seen.len(), 16);
        assert!(seen
            .iter()
            .all(|(_, name)| name.as_deref().is_some_and(|n| n.starts_with("atmsim-sched-"))));
    }

    #[test]
    fn urgent_level_drains_first() {
        let scheduler = WorkerScheduler::new(1, 3).unwrap();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let order = Arc::new(Mutex::new(Vec::new()));

        // Park the only worker until every job below is queued.
        scheduler
            .schedule(
                Box::new(move || {
                    let _ = gate_rx.recv();
                }),
                0,
            )
            .unwrap();
        for (priority, tag) in [(2u8, "low"), (9, "clamped"), (0, "urgent"), (1, "mid")] {
            let order = order.clone();
            scheduler
                .schedule(Box::new(move || order.lock().push(tag)), priority)
                .unwrap();
        }
        gate_tx.send(()).unwrap();
        scheduler.shutdown();

        assert_eq!(*order.lock(), vec!["urgent", "mid", "low", "clamped"]);
    }

    #[test]
    fn shutdown_drains_then_rejects() {
        let scheduler = WorkerScheduler::new(2, 1).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..32 {
            let ran = ran.clone();
            scheduler
                .schedule(
                    Box::new(move || {
                        ran.fetch_add(1, Ordering::SeqCst);
                    }),
                    0,
                )
                .unwrap();
        }
        scheduler.shutdown();

        assert_eq!(ran.load(Ordering::SeqCst), 32);
        assert_eq!(
            scheduler.schedule(Box::new(|| {}), 0),
            Err(ScheduleError::ShutDown)
        );
    }

    #[test]
    fn panicking_job_does_not_kill_the_worker() {
        let scheduler = WorkerScheduler::new(1, 1).unwrap();
        let (tx, rx) = mpsc::channel();
        scheduler
            .schedule(Box::new(|| panic!("job failure")), 0)
            .unwrap();
        scheduler
            .schedule(Box::new(move || tx.send(()).unwrap()), 0)
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn wait_idle_blocks_until_queues_drain() {
        let scheduler = Arc::new(WorkerScheduler::new(2, 2).unwrap());
        let ran = Arc::new(AtomicUsize::new(0));
        for i in 0..8 {
            let ran = ran.clone();
            let inner = scheduler.clone();
            scheduler
                .schedule(
                    Box::new(move || {
                        thread::sleep(Duration::from_millis(5));
                        let ran_again = ran.clone();
                        // Follow-up work queued from inside a job is waited on too.
                        inner
                            .schedule(
                                Box::new(move || {
                                    ran_again.fetch_add(1, Ordering::SeqCst);
                                }),
                                1,
                            )
                            .unwrap();
                        ran.fetch_add(1, Ordering::SeqCst);
                    }),
                    (i % 2) as u8,
                )
                .unwrap();
        }

        assert_eq!(scheduler.wait_idle(), 16);
        assert_eq!(ran.load(Ordering::SeqCst), 16);
        assert_eq!(scheduler.wait_idle(), 0);
    }

    #[test]
    fn wait_idle_counts_panicked_jobs() {
        let scheduler = WorkerScheduler::new(1, 1).unwrap();
        scheduler
            .schedule(Box::new(|| panic!("job failure")), 0)
            .unwrap();
        scheduler.schedule(Box::new(|| {}), 0).unwrap();
        assert_eq!(scheduler.wait_idle(), 2);
    }
}
