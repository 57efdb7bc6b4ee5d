//! ## atmsim-core::registry
//! **Handle table of registered completion callbacks**
//!
//! Maps an opaque [`Handle`] to the (context, function) pair a client
//! registered. Identical pairs are deduplicated and the number of live
//! entries is bounded.
//!
//! Handles come from a monotonic counter starting at 1 and are never handed
//! out twice, so a stale handle held by a slow client can never alias a newer
//! registration. Deregistering only frees capacity.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::NpfError;
use crate::types::{Correlator, Handle, ResponseBatch, UserContext};

/// Default bound on simultaneously registered callbacks.
pub const MAX_CALLBACKS: usize = 10;

type CallbackFn = dyn Fn(UserContext, Correlator, &ResponseBatch) + Send + Sync;

/// Client completion function. Cloning shares the function, and two
/// `Callback`s are the same function only if one is a clone of the other.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(UserContext, Correlator, &ResponseBatch) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn same_function(&self, other: &Callback) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    #[inline]
    pub fn call(&self, context: UserContext, correlator: Correlator, batch: &ResponseBatch) {
        (self.0)(context, correlator, batch)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

#[derive(Debug, Clone)]
pub struct CallbackEntry {
    pub context: UserContext,
    pub function: Callback,
}

impl CallbackEntry {
    fn matches(&self, context: UserContext, function: &Callback) -> bool {
        self.context == context && self.function.same_function(function)
    }
}

/// Result of a successful registration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A new entry was stored under this handle.
    New(Handle),
    /// The pair was already registered under this handle; nothing changed.
    Existing(Handle),
}

impl Registration {
    pub fn handle(self) -> Handle {
        match self {
            Registration::New(h) | Registration::Existing(h) => h,
        }
    }

    /// Wire status of the call: `ResourceExists` for a duplicate pair.
    pub fn status(self) -> Result<(), NpfError> {
        match self {
            Registration::New(_) => Ok(()),
            Registration::Existing(_) => Err(NpfError::ResourceExists),
        }
    }
}

struct Slots {
    next_handle: u32,
    entries: BTreeMap<Handle, CallbackEntry>,
}

pub struct CallbackRegistry {
    max_callbacks: usize,
    inner: Mutex<Slots>,
}

impl CallbackRegistry {
    pub fn new(max_callbacks: usize) -> Self {
        Self {
            max_callbacks,
            inner: Mutex::new(Slots {
                next_handle: 1,
                entries: BTreeMap::new(),
            }),
        }
    }

    pub fn register(
        &self,
        context: UserContext,
        function: Callback,
    ) -> Result<Registration, NpfError> {
        let mut slots = self.inner.lock();

        if let Some((handle, _)) = slots
            .entries
            .iter()
            .find(|(_, entry)| entry.matches(context, &function))
        {
            warn!(%handle, "Callback already registered");
            return Ok(Registration::Existing(*handle));
        }

        if slots.entries.len() >= self.max_callbacks {
            warn!(max = self.max_callbacks, "Maximum number of callbacks reached");
            return Err(NpfError::TooManyCallbacks);
        }

        let handle = Handle(slots.next_handle);
        slots.next_handle = slots
            .next_handle
            .checked_add(1)
            .ok_or(NpfError::TooManyCallbacks)?;
        slots
            .entries
            .insert(handle, CallbackEntry { context, function });

        info!(%handle, context = context.0, "Callback registered");
        Ok(Registration::New(handle))
    }

    pub fn deregister(&self, handle: Handle) -> Result<(), NpfError> {
        let mut slots = self.inner.lock();

        if handle.0 == 0 || handle.0 >= slots.next_handle {
            warn!(%handle, "Callback handle out of range");
            return Err(NpfError::BadCallbackHandle);
        }

        match slots.entries.remove(&handle) {
            Some(_) => {
                info!(%handle, "Callback deregistered");
                Ok(())
            }
            None => {
                warn!(%handle, "Callback does not exist");
                Err(NpfError::BadCallbackHandle)
            }
        }
    }

    /// Copy of the entry registered under `handle`, if any.
    pub fn lookup(&self, handle: Handle) -> Option<CallbackEntry> {
        let entry = self.inner.lock().entries.get(&handle).cloned();
        if entry.is_none() {
            debug!(%handle, "Callback lookup missed");
        }
        entry
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.max_callbacks
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new(MAX_CALLBACKS)
    }
}
