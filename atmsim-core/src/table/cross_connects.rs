use tracing::{debug, warn};

use super::{ResourceTable, Tables};
use crate::error::NpfError;
use crate::types::{
    CrossConnect, LinkId, ObjectId, ResponseBatch, XcAttachment, XcConfig, XcId, XcType,
};

impl Tables {
    /// Checks that `link` names an existing VC with no attachment yet.
    fn check_free_link(&self, link: LinkId, side: &'static str) -> Result<(), NpfError> {
        match self.vcs.get(&link) {
            None => {
                warn!(link, side, "Link does not exist");
                Err(NpfError::InvalidAttribute)
            }
            Some(vc) if vc.is_attached() => {
                warn!(link, side, "Link is already part of a cross-connect");
                Err(NpfError::InvalidAttribute)
            }
            Some(_) => Ok(()),
        }
    }

    /// Checks run in order and the first failure ends the entry. The returned
    /// object id names what the outcome is about.
    fn add_cross_connect(&mut self, cfg: &XcConfig) -> (ObjectId, Result<(), NpfError>) {
        let link_a = ObjectId::VcLink(cfg.link_a);

        let xc_type = match XcType::try_from(cfg.xc_type) {
            Ok(t) => t,
            Err(e) => {
                warn!(xc_id = cfg.xc_id, raw = cfg.xc_type, "Invalid cross-connect type");
                return (link_a, Err(e));
            }
        };

        if cfg.link_a == cfg.link_b {
            warn!(xc_id = cfg.xc_id, link = cfg.link_a, "Link A and link B are the same");
            return (link_a, Err(NpfError::InvalidAttribute));
        }

        if let Err(e) = self.check_free_link(cfg.link_a, "A") {
            return (link_a, Err(e));
        }
        if let Err(e) = self.check_free_link(cfg.link_b, "B") {
            return (ObjectId::VcLink(cfg.link_b), Err(e));
        }

        if self.cross_connects.contains_key(&cfg.xc_id) {
            warn!(xc_id = cfg.xc_id, "Cross-connect already exists");
            return (ObjectId::CrossConnect(cfg.xc_id), Err(NpfError::ResourceExists));
        }

        self.cross_connects.insert(
            cfg.xc_id,
            CrossConnect {
                xc_id: cfg.xc_id,
                link_a: cfg.link_a,
                link_b: cfg.link_b,
                xc_type,
            },
        );
        self.attach(cfg.link_a, cfg.link_b, cfg.xc_id, xc_type);
        self.attach(cfg.link_b, cfg.link_a, cfg.xc_id, xc_type);

        (link_a, Ok(()))
    }

    fn attach(&mut self, link: LinkId, peer: LinkId, xc_id: XcId, xc_type: XcType) {
        if let Some(vc) = self.vcs.get_mut(&link) {
            vc.cross_connect = Some(XcAttachment {
                xc_id,
                xc_type,
                peer,
            });
        }
    }
}

impl ResourceTable {
    /// Cross-connects pairs of existing, unattached VCs. On success both VCs
    /// record the other as their peer.
    pub fn set_cross_connects(&self, entries: &[XcConfig], batch: &mut ResponseBatch) -> bool {
        debug!(entries = entries.len(), "Setting cross-connects");
        for cfg in entries {
            let (object, status) = self.inner.lock().add_cross_connect(cfg);
            batch.push(object, status);
        }
        batch.all_ok()
    }
}
