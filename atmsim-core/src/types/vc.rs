use serde::{Deserialize, Serialize};

use super::{IfId, LinkId, XcAttachment};

/// VC entry of a set-VC request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcConfig {
    pub link_id: LinkId,
    pub if_id: IfId,
    pub vpi: u16,
    pub vci: u16,
}

impl VcConfig {
    pub fn new(link_id: LinkId, if_id: IfId, vpi: u16, vci: u16) -> Self {
        Self {
            link_id,
            if_id,
            vpi,
            vci,
        }
    }

    pub fn address(&self) -> VcAddress {
        VcAddress {
            if_id: self.if_id,
            vpi: self.vpi,
            vci: self.vci,
        }
    }
}

/// (interface, VPI, VCI) triple; unique across all VCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VcAddress {
    pub if_id: IfId,
    pub vpi: u16,
    pub vci: u16,
}

/// VC as stored in the resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vc {
    pub link_id: LinkId,
    pub if_id: IfId,
    pub vpi: u16,
    pub vci: u16,
    pub cross_connect: Option<XcAttachment>,
}

impl Vc {
    pub fn address(&self) -> VcAddress {
        VcAddress {
            if_id: self.if_id,
            vpi: self.vpi,
            vci: self.vci,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.cross_connect.is_some()
    }
}

impl From<VcConfig> for Vc {
    fn from(cfg: VcConfig) -> Self {
        Self {
            link_id: cfg.link_id,
            if_id: cfg.if_id,
            vpi: cfg.vpi,
            vci: cfg.vci,
            cross_connect: None,
        }
    }
}
