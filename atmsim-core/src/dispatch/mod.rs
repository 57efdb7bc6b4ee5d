//! ## atmsim-core::dispatch
//! **Completion callback delivery**
//!
//! The [`CallbackDispatcher`] resolves a handle through the registry and runs
//! the callback either on the calling thread or through a
//! [`DeferredScheduler`].

mod dispatcher;
mod scheduler;
mod worker;

pub use dispatcher::{CallbackDispatcher, DeliveryMode, DEFAULT_PRIORITY};
pub use scheduler::{DeferredScheduler, Job, ManualScheduler, Priority, ScheduleError};
pub use worker::WorkerScheduler;
