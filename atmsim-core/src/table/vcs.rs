use std::collections::btree_map::Entry;

use tracing::{debug, warn};

use super::{ResourceTable, Tables};
use crate::error::NpfError;
use crate::types::{ObjectId, ResponseBatch, Vc, VcConfig};

impl Tables {
    fn add_vc(&mut self, cfg: &VcConfig) -> Result<(), NpfError> {
        if !self.interfaces.contains_key(&cfg.if_id) {
            warn!(link_id = cfg.link_id, if_id = cfg.if_id, "Interface does not exist");
            return Err(NpfError::Unknown);
        }

        let address = cfg.address();
        if let Some(owner) = self.vc_addresses.get(&address) {
            warn!(
                link_id = cfg.link_id,
                owner = *owner,
                if_id = cfg.if_id,
                vpi = cfg.vpi,
                vci = cfg.vci,
                "Interface, VPI, VCI entry exists"
            );
            return Err(NpfError::InvalidVcAddress);
        }

        match self.vcs.entry(cfg.link_id) {
            Entry::Occupied(_) => {
                warn!(link_id = cfg.link_id, "Virtual link id exists");
                Err(NpfError::InvalidVcAddress)
            }
            Entry::Vacant(slot) => {
                slot.insert(Vc::from(*cfg));
                self.vc_addresses.insert(address, cfg.link_id);
                Ok(())
            }
        }
    }
}

impl ResourceTable {
    /// Creates one VC per entry on an existing interface.
    pub fn set_vcs(&self, entries: &[VcConfig], batch: &mut ResponseBatch) -> bool {
        debug!(entries = entries.len(), "Setting VCs");
        for cfg in entries {
            let status = self.inner.lock().add_vc(cfg);
            batch.push(ObjectId::VcLink(cfg.link_id), status);
        }
        batch.all_ok()
    }
}
