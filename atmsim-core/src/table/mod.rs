//! ## atmsim-core::table
//! **Interfaces, VCs and cross-connects with referential integrity**
//!
//! ### Locking
//! One exclusive lock covers all three collections. Every batch operation
//! takes it once per entry and holds it across that entry's whole
//! validate-then-mutate sequence, so two requests racing for the same VC can
//! never both observe it unattached. Concurrent batches interleave at entry
//! granularity.
//!
//! ### Batches
//! Each entry is validated and applied independently and produces exactly one
//! response, in input order. A failed entry never stops the rest of the batch.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use serde::Serialize;

use crate::types::{CrossConnect, IfId, Interface, LinkId, Vc, VcAddress, XcId};

mod cross_connects;
mod interfaces;
mod vcs;

#[derive(Default)]
struct Tables {
    interfaces: BTreeMap<IfId, Interface>,
    vcs: BTreeMap<LinkId, Vc>,
    vc_addresses: HashMap<VcAddress, LinkId>,
    cross_connects: BTreeMap<XcId, CrossConnect>,
}

/// Number of records held in each collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub interfaces: usize,
    pub vcs: usize,
    pub cross_connects: usize,
}

#[derive(Default)]
pub struct ResourceTable {
    inner: Mutex<Tables>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interface(&self, id: IfId) -> Option<Interface> {
        self.inner.lock().interfaces.get(&id).copied()
    }

    pub fn vc(&self, link_id: LinkId) -> Option<Vc> {
        self.inner.lock().vcs.get(&link_id).copied()
    }

    pub fn cross_connect(&self, xc_id: XcId) -> Option<CrossConnect> {
        self.inner.lock().cross_connects.get(&xc_id).copied()
    }

    /// Snapshot of all interfaces ordered by id.
    pub fn interfaces(&self) -> Vec<Interface> {
        self.inner.lock().interfaces.values().copied().collect()
    }

    /// Snapshot of all VCs ordered by link id.
    pub fn vcs(&self) -> Vec<Vc> {
        self.inner.lock().vcs.values().copied().collect()
    }

    /// Snapshot of all cross-connects ordered by id.
    pub fn cross_connects(&self) -> Vec<CrossConnect> {
        self.inner.lock().cross_connects.values().copied().collect()
    }

    pub fn counts(&self) -> TableCounts {
        let tables = self.inner.lock();
        TableCounts {
            interfaces: tables.interfaces.len(),
            vcs: tables.vcs.len(),
            cross_connects: tables.cross_connects.len(),
        }
    }
}
