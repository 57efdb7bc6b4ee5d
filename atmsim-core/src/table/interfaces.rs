use std::collections::btree_map::Entry;

use tracing::{debug, warn};

use super::{ResourceTable, Tables};
use crate::error::NpfError;
use crate::types::{IfConfig, IfId, IfType, Interface, ObjectId, ResponseBatch};

impl Tables {
    fn add_interface(&mut self, cfg: &IfConfig) -> Result<(), NpfError> {
        let if_type = IfType::try_from(cfg.if_type).inspect_err(|_| {
            warn!(if_id = cfg.if_id, raw = cfg.if_type, "Invalid interface type");
        })?;

        match self.interfaces.entry(cfg.if_id) {
            Entry::Occupied(_) => {
                warn!(if_id = cfg.if_id, "Interface already exists");
                Err(NpfError::ResourceExists)
            }
            Entry::Vacant(slot) => {
                slot.insert(Interface {
                    id: cfg.if_id,
                    if_type,
                });
                Ok(())
            }
        }
    }

    fn remove_interface(&mut self, if_id: IfId) -> Result<(), NpfError> {
        if self.vcs.values().any(|vc| vc.if_id == if_id) {
            warn!(if_id, "Interface has contained VCs");
            return Err(NpfError::ContainedObjectsExist);
        }

        match self.interfaces.remove(&if_id) {
            Some(_) => Ok(()),
            None => {
                warn!(if_id, "Interface does not exist");
                Err(NpfError::ResourceNonexistent)
            }
        }
    }
}

impl ResourceTable {
    /// Creates one interface per entry. Returns `true` when every entry
    /// succeeded.
    pub fn set_interfaces(&self, entries: &[IfConfig], batch: &mut ResponseBatch) -> bool {
        debug!(entries = entries.len(), "Setting interfaces");
        for cfg in entries {
            let status = self.inner.lock().add_interface(cfg);
            batch.push(ObjectId::Interface(cfg.if_id), status);
        }
        batch.all_ok()
    }

    /// Deletes one interface per id. An interface still referenced by a VC is
    /// kept and reported as `ContainedObjectsExist`.
    pub fn delete_interfaces(&self, ids: &[IfId], batch: &mut ResponseBatch) -> bool {
        debug!(entries = ids.len(), "Deleting interfaces");
        for &if_id in ids {
            let status = self.inner.lock().remove_interface(if_id);
            batch.push(ObjectId::Interface(if_id), status);
        }
        batch.all_ok()
    }
}
