use serde::{Deserialize, Serialize};

use super::{LinkId, XcId};
use crate::error::NpfError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum XcType {
    ExtToExt = 1,
    ExtToInt = 2,
    ExtToBack = 3,
    BackToInt = 4,
}

impl TryFrom<u32> for XcType {
    type Error = NpfError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(XcType::ExtToExt),
            2 => Ok(XcType::ExtToInt),
            3 => Ok(XcType::ExtToBack),
            4 => Ok(XcType::BackToInt),
            _ => Err(NpfError::InvalidAttribute),
        }
    }
}

/// Cross-connect entry of a set-cross-connect request. `xc_type` is the raw
/// wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XcConfig {
    pub xc_id: XcId,
    pub link_a: LinkId,
    pub link_b: LinkId,
    pub xc_type: u32,
}

impl XcConfig {
    pub fn new(xc_id: XcId, link_a: LinkId, link_b: LinkId, xc_type: XcType) -> Self {
        Self {
            xc_id,
            link_a,
            link_b,
            xc_type: xc_type as u32,
        }
    }
}

/// Attachment recorded on a VC once it is part of a cross-connect.
/// `peer` is the link id of the VC on the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XcAttachment {
    pub xc_id: XcId,
    pub xc_type: XcType,
    pub peer: LinkId,
}

/// Cross-connect as stored in the resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossConnect {
    pub xc_id: XcId,
    pub link_a: LinkId,
    pub link_b: LinkId,
    pub xc_type: XcType,
}
