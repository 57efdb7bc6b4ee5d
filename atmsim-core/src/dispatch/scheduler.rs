//! "Fire later" capability used by the dispatcher in deferred mode.

use std::collections::VecDeque;

use parking_lot::Mutex;
use thiserror::Error;

/// Unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Scheduling priority; 0 is the most urgent level.
pub type Priority = u8;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("scheduler has been shut down")]
    ShutDown,
}

pub trait DeferredScheduler: Send + Sync {
    /// Queues `job` to run later on a scheduler-chosen thread.
    fn schedule(&self, job: Job, priority: Priority) -> Result<(), ScheduleError>;
}

/// Holds jobs until [`ManualScheduler::run_pending`] is called, which runs
/// them on the calling thread in priority order (FIFO within a level).
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<(Priority, Job)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Runs every queued job, including jobs queued by the jobs themselves.
    /// Returns the number of jobs run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // the lock is dropped before the job runs
            let next = {
                let mut queue = self.queue.lock();
                let best = queue
                    .iter()
                    .enumerate()
                    .min_by_key(|(idx, (priority, _))| (*priority, *idx))
                    .map(|(idx, _)| idx);
                best.and_then(|idx| queue.remove(idx))
            };
            match next {
                Some((_, job)) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl DeferredScheduler for ManualScheduler {
    fn schedule(&self, job: Job, priority: Priority) -> Result<(), ScheduleError> {
        self.queue.lock().push_back((priority, job));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn jobs_wait_until_run_pending() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for (priority, tag) in [(3, "low"), (0, "urgent"), (3, "low-2"), (1, "mid")] {
            let log = log.clone();
            scheduler
                .schedule(Box::new(move || log.lock().push(tag)), priority)
                .unwrap();
        }
        assert_eq!(scheduler.pending(), 4);
        assert!(log.lock().is_empty());

        assert_eq!(scheduler.run_pending(), 4);
        assert_eq!(*log.lock(), vec!["urgent", "mid", "low", "low-2"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn jobs_may_schedule_follow_up_work() {
        let scheduler = Arc::new(ManualScheduler::new());
        let inner = scheduler.clone();
        let hits = Arc::new(Mutex::new(0));
        let hits_inner = hits.clone();

        scheduler
            .schedule(
                Box::new(move || {
                    let hits = hits_inner.clone();
                    inner
                        .schedule(Box::new(move || *hits.lock() += 1), 0)
                        .unwrap();
                }),
                0,
            )
            .unwrap();

        assert_eq!(scheduler.run_pending(), 2);
        assert_eq!(*hits.lock(), 1);
    }
}
